//! # Chain Parameters
//!
//! Contract addresses, protocol boundaries and channel conventions of the
//! posting contract. Every subsystem reads these from one `ChainParams`.

use serde::{Deserialize, Serialize};

/// Current (v2) posting contract.
pub const CONTRACT_ADDRESS_V2: &str = "0xC5B35B4Dc4359Cc050D502564E789A374f634fA9";

/// Legacy (v1) posting contract.
pub const CONTRACT_ADDRESS_V1: &str = "0x8d318630eB62A032d2f8073d74f05cbF7c6C87Ae";

/// Lowest block that can hold a post.
pub const FIRST_BLOCK: u64 = 10_135_627;

/// Contract method that creates a post.
pub const MAKE_POST_METHOD: &str = "makePost";

/// Prefix of discussion channel ids.
pub const DISCUSSION_PREFIX: &str = "discuss:";

/// Before this timestamp reply targets are hex-wrapped decimal strings.
pub const V3_TIMESTAMP: u64 = 1_740_000_000;

/// Before this timestamp ids belong to the pre-migration numbering.
pub const V5_TIMESTAMP: u64 = 1_750_000_000;

/// Prefix decorating ids minted before the v5 migration.
pub const LEGACY_ID_PREFIX: &str = "preV5:";

/// Contract-level parameters of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParams {
    /// Current posting contract.
    pub contract_v2: String,
    /// Legacy posting contract.
    pub contract_v1: String,
    /// Method name of post transactions.
    pub make_post_method: String,
    /// Main channel id (reserved, empty).
    pub main_channel_id: String,
    /// Discussion channel prefix.
    pub discussion_prefix: String,
    /// First relevant block height; backward scanning stops here.
    pub first_block: u64,
    /// Reply-encoding breaking change.
    pub v3_timestamp: u64,
    /// Id-numbering breaking change (contract migration).
    pub v5_timestamp: u64,
    /// Prefix applied to pre-v5 ids.
    pub legacy_id_prefix: String,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            contract_v2: CONTRACT_ADDRESS_V2.to_string(),
            contract_v1: CONTRACT_ADDRESS_V1.to_string(),
            make_post_method: MAKE_POST_METHOD.to_string(),
            main_channel_id: String::new(),
            discussion_prefix: DISCUSSION_PREFIX.to_string(),
            first_block: FIRST_BLOCK,
            v3_timestamp: V3_TIMESTAMP,
            v5_timestamp: V5_TIMESTAMP,
            legacy_id_prefix: LEGACY_ID_PREFIX.to_string(),
        }
    }
}

impl ChainParams {
    /// Create params for testing (small heights and timestamps).
    pub fn for_testing() -> Self {
        Self {
            contract_v2: "0xC0FFEE0000000000000000000000000000000002".to_string(),
            contract_v1: "0xC0FFEE0000000000000000000000000000000001".to_string(),
            first_block: 10,
            v3_timestamp: 1_000,
            v5_timestamp: 2_000,
            ..Self::default()
        }
    }

    /// Channel id carrying the discussion of `post_id`.
    pub fn discussion_channel_of(&self, post_id: &str) -> String {
        format!("{}{}", self.discussion_prefix, post_id)
    }

    /// Whether `contract` is one of the posting contracts (case-insensitive).
    pub fn is_posting_contract(&self, contract: &str) -> bool {
        contract.eq_ignore_ascii_case(&self.contract_v2)
            || contract.eq_ignore_ascii_case(&self.contract_v1)
    }
}
