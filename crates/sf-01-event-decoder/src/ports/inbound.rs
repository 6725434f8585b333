//! # Inbound Ports
//!
//! API trait defining what the decoder does for a scan driver.

use async_trait::async_trait;
use shared_types::{PendingTx, PostLookup};

use crate::domain::{DecodeError, Decoded};

/// Event Decoder API - inbound port.
#[async_trait]
pub trait PostDecoder: Send + Sync {
    /// Decode one transaction targeting `contract`, reading the current
    /// graph through `lookup`.
    async fn decode(
        &self,
        tx: &PendingTx,
        contract: &str,
        lookup: &dyn PostLookup,
    ) -> Result<Decoded, DecodeError>;
}
