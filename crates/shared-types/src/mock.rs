//! # Mock Collaborators
//!
//! In-memory `NodeRpc` and `IndexerApi` used by unit and integration tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::entities::{Poster, TxHash};
use crate::errors::TransportError;
use crate::ports::{IndexerApi, NodeRpc};
use crate::wire::{
    BalanceUpdate, BlockInfo, IndexerPage, IndexerReceipt, SyncStatus, TxEvent, TxMeta, TxReceipt,
};

/// Hex-encode UTF-8 text the way contract event args carry it.
pub fn encode_hex_utf8(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}

/// Hex-encode an integer as a raw big-endian hex string.
pub fn encode_hex_u64(value: u64) -> String {
    format!("0x{value:x}")
}

/// Description of one `makePost` transaction to register on the mock node.
#[derive(Debug, Clone)]
pub struct PostTxSpec {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Height of the enclosing block.
    pub block_height: u64,
    /// Transaction timestamp.
    pub timestamp: u64,
    /// Contract the call targets.
    pub contract: String,
    /// Invoked method.
    pub method: String,
    /// Execution outcome.
    pub success: bool,
    /// Author address.
    pub poster: String,
    /// Raw post id argument.
    pub post_id_arg: String,
    /// Channel id (plain text, hex-encoded on registration).
    pub channel_id: String,
    /// Message (plain text, hex-encoded on registration).
    pub message: String,
    /// Raw reply argument, exactly as the contract emitted it.
    pub reply_arg: Option<String>,
}

impl PostTxSpec {
    /// A successful root post on the main channel.
    pub fn new(
        tx_hash: impl Into<String>,
        block_height: u64,
        timestamp: u64,
        contract: impl Into<String>,
        post_id: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            block_height,
            timestamp,
            contract: contract.into(),
            method: "makePost".to_string(),
            success: true,
            poster: "0x00000000000000000000000000000000000000aa".to_string(),
            post_id_arg: encode_hex_u64(post_id),
            channel_id: String::new(),
            message: message.into(),
            reply_arg: None,
        }
    }

    /// Reply target encoded the post-v3 way (raw hex integer).
    pub fn replying_to(mut self, post_id: u64) -> Self {
        self.reply_arg = Some(encode_hex_u64(post_id));
        self
    }

    /// Reply target encoded the pre-v3 way (hex-wrapped decimal string).
    pub fn replying_to_legacy(mut self, post_id: u64) -> Self {
        self.reply_arg = Some(encode_hex_utf8(&post_id.to_string()));
        self
    }

    /// Post on a channel other than the main one.
    pub fn on_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    /// Author address.
    pub fn by(mut self, poster: impl Into<String>) -> Self {
        self.poster = poster.into();
        self
    }

    /// Mark the call as failed.
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Override the invoked method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    fn receipt(&self) -> TxReceipt {
        let mut args = vec![
            self.poster.clone(),
            self.post_id_arg.clone(),
            encode_hex_utf8(&self.channel_id),
            encode_hex_utf8(&self.message),
        ];
        if let Some(reply) = &self.reply_arg {
            args.push(reply.clone());
        }
        TxReceipt {
            contract: self.contract.to_lowercase(),
            method: self.method.clone(),
            success: self.success,
            events: vec![TxEvent {
                event: "makePost".to_string(),
                args,
            }],
        }
    }
}

#[derive(Default)]
struct MockChain {
    blocks: BTreeMap<u64, BlockInfo>,
    receipts: HashMap<TxHash, TxReceipt>,
    metas: HashMap<TxHash, TxMeta>,
    identities: HashMap<String, Poster>,
    unavailable: bool,
    syncing: bool,
    identity_calls: usize,
}

/// In-memory chain node.
#[derive(Default)]
pub struct MockNodeRpc {
    chain: Mutex<MockChain>,
}

fn block_hash_of(height: u64) -> String {
    format!("0xb{height:08x}")
}

impl MockNodeRpc {
    /// Create an empty mock node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block that carries no transactions.
    pub fn add_empty_block(&self, height: u64, timestamp: u64) {
        self.chain.lock().blocks.insert(
            height,
            BlockInfo {
                height,
                timestamp,
                hash: block_hash_of(height),
                transactions: None,
            },
        );
    }

    /// Register a post transaction, creating its block when needed.
    pub fn add_post(&self, spec: &PostTxSpec) {
        let mut chain = self.chain.lock();
        let block = chain
            .blocks
            .entry(spec.block_height)
            .or_insert_with(|| BlockInfo {
                height: spec.block_height,
                timestamp: spec.timestamp,
                hash: block_hash_of(spec.block_height),
                transactions: None,
            });
        block
            .transactions
            .get_or_insert_with(Vec::new)
            .push(spec.tx_hash.clone());
        chain.receipts.insert(spec.tx_hash.clone(), spec.receipt());
        chain.metas.insert(
            spec.tx_hash.clone(),
            TxMeta {
                timestamp: spec.timestamp,
                block_hash: block_hash_of(spec.block_height),
            },
        );
    }

    /// Register an identity record.
    pub fn add_identity(&self, poster: Poster) {
        self.chain
            .lock()
            .identities
            .insert(poster.address.clone(), poster);
    }

    /// Make every call fail with `TransportError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.chain.lock().unavailable = unavailable;
    }

    /// Report the node as still syncing.
    pub fn set_syncing(&self, syncing: bool) {
        self.chain.lock().syncing = syncing;
    }

    /// Number of `dna_identity` calls served.
    pub fn identity_calls(&self) -> usize {
        self.chain.lock().identity_calls
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.chain.lock().unavailable {
            return Err(TransportError::Unavailable("mock node offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeRpc for MockNodeRpc {
    async fn fetch_block_at(&self, height: u64) -> Result<Option<BlockInfo>, TransportError> {
        self.check()?;
        Ok(self.chain.lock().blocks.get(&height).cloned())
    }

    async fn fetch_block_by_hash(&self, hash: &str) -> Result<Option<BlockInfo>, TransportError> {
        self.check()?;
        Ok(self
            .chain
            .lock()
            .blocks
            .values()
            .find(|block| block.hash == hash)
            .cloned())
    }

    async fn fetch_tx_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, TransportError> {
        self.check()?;
        Ok(self.chain.lock().receipts.get(tx_hash).cloned())
    }

    async fn fetch_tx_meta(&self, tx_hash: &str) -> Result<Option<TxMeta>, TransportError> {
        self.check()?;
        Ok(self.chain.lock().metas.get(tx_hash).cloned())
    }

    async fn fetch_identity(&self, address: &str) -> Result<Option<Poster>, TransportError> {
        self.check()?;
        let mut chain = self.chain.lock();
        chain.identity_calls += 1;
        Ok(chain.identities.get(address).cloned())
    }

    async fn sync_status(&self) -> Result<Option<SyncStatus>, TransportError> {
        self.check()?;
        let chain = self.chain.lock();
        let head = chain.blocks.keys().next_back().copied().unwrap_or(0);
        Ok(Some(SyncStatus {
            syncing: chain.syncing,
            current_block: head,
            highest_block: head,
        }))
    }

    async fn last_block(&self) -> Result<Option<BlockInfo>, TransportError> {
        self.check()?;
        Ok(self.chain.lock().blocks.values().next_back().cloned())
    }
}

#[derive(Default)]
struct MockIndex {
    pages: HashMap<String, Vec<Vec<BalanceUpdate>>>,
    requests: Vec<(String, Option<String>)>,
    unavailable: bool,
}

/// In-memory indexer serving pre-registered pages per contract.
///
/// The continuation token of page `n` of contract `c` is `"c:n+1"`; the last
/// page carries none.
#[derive(Default)]
pub struct MockIndexerApi {
    index: Mutex<MockIndex>,
}

impl MockIndexerApi {
    /// Create an empty mock indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A successful `makePost` balance update.
    pub fn post_update(hash: impl Into<String>, timestamp: impl Into<String>) -> BalanceUpdate {
        BalanceUpdate {
            hash: hash.into(),
            kind: "CallContract".to_string(),
            timestamp: timestamp.into(),
            address: String::new(),
            tx_receipt: Some(IndexerReceipt {
                method: "makePost".to_string(),
                success: true,
            }),
        }
    }

    /// Append a page for `contract`.
    pub fn push_page(&self, contract: &str, items: Vec<BalanceUpdate>) {
        self.index
            .lock()
            .pages
            .entry(contract.to_lowercase())
            .or_default()
            .push(items);
    }

    /// Make every call fail with `TransportError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.index.lock().unavailable = unavailable;
    }

    /// Every `(contract, token)` pair requested so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.index.lock().requests.clone()
    }
}

#[async_trait]
impl IndexerApi for MockIndexerApi {
    async fn fetch_page(
        &self,
        contract: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<IndexerPage, TransportError> {
        let mut index = self.index.lock();
        index
            .requests
            .push((contract.to_string(), continuation_token.map(str::to_string)));
        if index.unavailable {
            return Err(TransportError::Unavailable("mock indexer offline".to_string()));
        }

        let key = contract.to_lowercase();
        let page_no = match continuation_token {
            None => 0,
            Some(token) => token
                .rsplit(':')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| TransportError::Rpc(format!("bad token {token}")))?,
        };
        let pages = index.pages.get(&key).cloned().unwrap_or_default();
        let mut result = pages.get(page_no).cloned().unwrap_or_default();
        result.truncate(limit.max(1));
        for item in &mut result {
            if item.address.is_empty() {
                item.address = contract.to_string();
            }
        }
        let continuation_token = if page_no + 1 < pages.len() {
            Some(format!("{key}:{}", page_no + 1))
        } else {
            None
        };
        Ok(IndexerPage {
            result,
            continuation_token,
        })
    }
}
