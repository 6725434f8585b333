//! # SF-01 Event Decoder
//!
//! Converts `makePost` contract receipts into `PostCandidate`s for the post
//! graph, or skips them with a reason.
//!
//! **Subsystem ID:** 1
//!
//! ## Decoding Rules
//!
//! | Rule | Outcome |
//! |------|---------|
//! | Receipt from another contract, method or a failed call | skip |
//! | Channel other than main or `discuss:<digits>` | skip |
//! | Message empty after sanitization | skip |
//! | Reply target equal to the post itself | skip |
//! | Post id already in the graph | skip |
//! | Reply target known with a timestamp not earlier than the reply | skip |
//! | Timestamp before v3 | reply target is hex-wrapped decimal text |
//! | Timestamp before v5 | ids get the legacy prefix |
//!
//! Transport faults surface as `DecodeError`; the calling driver decides
//! whether to retry the batch.
//!
//! ## Module Structure
//!
//! ```text
//! sf-01-event-decoder/
//! ├── domain/          # argument codec, Decoded, SkipReason, DecodeError
//! ├── ports/           # PostDecoder (inbound)
//! └── application/     # EventDecoder over a NodeRpc
//! ```

#![warn(clippy::all)]

pub mod application;
pub mod domain;
pub mod ports;

pub use application::EventDecoder;
pub use domain::{DecodeError, Decoded, SkipReason};
pub use ports::PostDecoder;
