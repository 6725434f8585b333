//! # Domain Layer - Event Decoder
//!
//! - `codec`: hex argument decoding, message sanitization, channel parsing
//! - `outcome`: `Decoded`, `SkipReason`, `DecodeError`

pub mod codec;
pub mod outcome;

pub use codec::*;
pub use outcome::*;
