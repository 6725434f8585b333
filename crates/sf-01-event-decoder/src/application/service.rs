//! # Event Decoder Service
//!
//! Turns one post transaction into a `PostCandidate`, resolving every
//! contract-version quirk on the way:
//!
//! - reply targets are hex-wrapped decimal text before the v3 change and raw
//!   hex integers after it
//! - ids minted before the v5 migration carry the legacy prefix
//! - discussion comments get a channel placeholder whose orphan status is
//!   inherited from the discussed post
//!
//! Filtering happens before any graph lookup so that foreign transactions
//! never reach the reconciler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use feed_telemetry::DECODER_SKIPPED;
use shared_types::{
    ChainParams, DiscussionChannel, NodeRpc, PendingTx, Post, PostCandidate, PostLookup, Poster,
    TransportError,
};

use crate::domain::{
    hex_to_utf8, is_empty_arg, numeric_hex_to_decimal, parse_discussion_channel,
    sanitize_message, DecodeError, Decoded, SkipReason,
};
use crate::ports::PostDecoder;

/// Minimum number of `makePost` event arguments: poster, post id, channel,
/// message. The reply target is optional.
const MIN_EVENT_ARGS: usize = 4;

/// Event decoder backed by a node RPC.
pub struct EventDecoder<R: NodeRpc> {
    rpc: Arc<R>,
    params: ChainParams,
}

impl<R: NodeRpc> EventDecoder<R> {
    /// Create a decoder.
    pub fn new(rpc: Arc<R>, params: ChainParams) -> Self {
        Self { rpc, params }
    }

    /// Chain parameters in use.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    fn skip(&self, tx: &PendingTx, reason: SkipReason) -> Decoded {
        DECODER_SKIPPED.with_label_values(&[reason.as_str()]).inc();
        trace!(tx_hash = %tx.tx_hash, %reason, "[sf-01] Transaction skipped");
        Decoded::Skip(reason)
    }

    fn transport(tx: &PendingTx, source: TransportError) -> DecodeError {
        DecodeError::Transport {
            tx_hash: tx.tx_hash.clone(),
            source,
        }
    }

    /// Decode the reply argument to a plain id. `Ok(None)` for root posts.
    fn decode_reply(&self, raw: Option<&String>, timestamp: u64) -> Result<Option<String>, ()> {
        let Some(raw) = raw.filter(|r| !is_empty_arg(r)) else {
            return Ok(None);
        };
        let decoded = if timestamp < self.params.v3_timestamp {
            hex_to_utf8(raw).map(|text| text.trim().to_string())
        } else {
            numeric_hex_to_decimal(raw)
        };
        match decoded {
            Some(id) if id.is_empty() || id == "0" => Ok(None),
            Some(id) if id.chars().all(|c| c.is_ascii_digit()) => Ok(Some(id)),
            _ => Err(()),
        }
    }

    fn legacy(&self, id: &str, timestamp: u64) -> String {
        if timestamp < self.params.v5_timestamp {
            format!("{}{}", self.params.legacy_id_prefix, id)
        } else {
            id.to_string()
        }
    }
}

#[async_trait]
impl<R: NodeRpc + 'static> PostDecoder for EventDecoder<R> {
    async fn decode(
        &self,
        tx: &PendingTx,
        contract: &str,
        lookup: &dyn PostLookup,
    ) -> Result<Decoded, DecodeError> {
        let receipt = match self
            .rpc
            .fetch_tx_receipt(&tx.tx_hash)
            .await
            .map_err(|e| Self::transport(tx, e))?
        {
            Some(receipt) => receipt,
            None => return Ok(self.skip(tx, SkipReason::NoReceipt)),
        };

        if !receipt.contract.eq_ignore_ascii_case(contract) {
            return Ok(self.skip(tx, SkipReason::WrongContract));
        }
        if receipt.method != self.params.make_post_method {
            return Ok(self.skip(tx, SkipReason::WrongMethod));
        }
        if !receipt.success {
            return Ok(self.skip(tx, SkipReason::FailedExecution));
        }
        let Some(args) = receipt
            .events
            .first()
            .map(|event| &event.args)
            .filter(|args| args.len() >= MIN_EVENT_ARGS)
        else {
            return Ok(self.skip(tx, SkipReason::MalformedEvent));
        };

        let timestamp = match tx.timestamp {
            Some(ts) => ts,
            None => match self
                .rpc
                .fetch_tx_meta(&tx.tx_hash)
                .await
                .map_err(|e| Self::transport(tx, e))?
            {
                Some(meta) => meta.timestamp,
                None => return Ok(self.skip(tx, SkipReason::UnknownTransaction)),
            },
        };

        let poster = args[0].clone();
        let Some(raw_post_id) = numeric_hex_to_decimal(&args[1]) else {
            return Ok(self.skip(tx, SkipReason::MalformedEvent));
        };
        let Some(raw_channel) = hex_to_utf8(&args[2]) else {
            return Ok(self.skip(tx, SkipReason::MalformedEvent));
        };
        let discussion_root = if raw_channel == self.params.main_channel_id {
            None
        } else {
            match parse_discussion_channel(&raw_channel, &self.params.discussion_prefix) {
                Some(root) => Some(root.to_string()),
                None => return Ok(self.skip(tx, SkipReason::WrongChannel)),
            }
        };
        let Some(message) = hex_to_utf8(&args[3]).map(|m| sanitize_message(&m)) else {
            return Ok(self.skip(tx, SkipReason::MalformedEvent));
        };
        if message.is_empty() {
            return Ok(self.skip(tx, SkipReason::EmptyMessage));
        }
        let Ok(raw_reply) = self.decode_reply(args.get(MIN_EVENT_ARGS), timestamp) else {
            return Ok(self.skip(tx, SkipReason::MalformedEvent));
        };

        let post_id = self.legacy(&raw_post_id, timestamp);
        let reply_to_post_id = raw_reply
            .map(|id| self.legacy(&id, timestamp))
            .unwrap_or_default();
        let discussion_root = discussion_root.map(|root| self.legacy(&root, timestamp));
        let channel_id = discussion_root
            .as_deref()
            .map(|root| self.params.discussion_channel_of(root))
            .unwrap_or_else(|| self.params.main_channel_id.clone());

        if reply_to_post_id == post_id || discussion_root.as_deref() == Some(post_id.as_str()) {
            return Ok(self.skip(tx, SkipReason::SelfReply));
        }
        if lookup.contains_post(&post_id) {
            return Ok(self.skip(tx, SkipReason::AlreadyKnown));
        }
        if !reply_to_post_id.is_empty() {
            if let Some(parent_ts) = lookup.post_timestamp(&reply_to_post_id) {
                if parent_ts >= timestamp {
                    return Ok(self.skip(tx, SkipReason::StaleReply));
                }
            }
        }

        let discussion = discussion_root.map(|root| DiscussionChannel {
            orphaned: lookup.is_attached(&root) != Some(true),
            channel_id: channel_id.clone(),
            root_post_id: root,
        });

        let new_poster = if lookup.knows_poster(&poster) {
            None
        } else {
            let identity = self
                .rpc
                .fetch_identity(&poster)
                .await
                .map_err(|e| Self::transport(tx, e))?;
            Some(identity.unwrap_or_else(|| Poster::unknown(poster.clone())))
        };

        debug!(
            post_id = %post_id,
            tx_hash = %tx.tx_hash,
            reply_to = %reply_to_post_id,
            channel = %channel_id,
            "[sf-01] Decoded post"
        );

        Ok(Decoded::Candidate(Box::new(PostCandidate {
            post: Post {
                post_id,
                poster,
                message,
                timestamp,
                tx_hash: tx.tx_hash.clone(),
                block_height: tx.block_height,
                reply_to_post_id,
                channel_id,
                orphaned: false,
            },
            new_poster,
            discussion,
        })))
    }
}
