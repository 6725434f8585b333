//! # Domain Layer - Scan Controller
//!
//! - `errors`: `ControllerError`, `StepError`
//! - `progress`: `ForwardCursor`, `BatchReport`, `StepOutcome`, `ScanStatus`

pub mod errors;
pub mod progress;

pub use errors::*;
pub use progress::*;
