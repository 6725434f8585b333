//! # Social Feed Runtime
//!
//! Library half of the `feed-runtime` binary.
//!
//! - `config/` - `FeedConfig` and its load order (defaults, TOML, env)
//! - `runtime/` - `FeedRuntime`, wiring clients, graph, bus and controller
//!
//! ```text
//! HttpNodeRpc ──┐                      ┌── ForwardDriver ──┐
//!               ├── ScanController ────┤                   ├── PostGraphStore
//! HttpIndexerApi┘         │            └── BackwardDriver ─┘
//!                         ↓
//!                  InMemoryEventBus ──→ event logger
//! ```

pub mod config;
pub mod runtime;

pub use config::{ConfigError, FeedConfig};
pub use runtime::{FeedRuntime, HttpFeedRuntime};
