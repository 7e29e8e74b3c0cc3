//! # freedata-bot - Auto-responder for the FreeDATA packet-radio gateway
//!
//! An unattended bot that polls a local FreeDATA API, spots an inbound
//! message containing a trigger phrase, and answers the originating station
//! with a canned reply. It answers each message at most once (even across
//! restarts), never answers its own echoed reply, and only transmits while the
//! radio link is actually up.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use freedata_bot::bot::Responder;
//! use freedata_bot::config::Config;
//! use freedata_bot::gateway::HttpGateway;
//! use freedata_bot::storage::{FileStore, ReplyState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     config.validate()?;
//!
//!     let (gateway, _info) = HttpGateway::connect(config.gateway.clone()).await?;
//!
//!     let store = FileStore::open(&config.storage.data_dir)?;
//!     let state = ReplyState::new(store, config.storage.state_key.clone());
//!     Responder::new(config.bot.clone(), gateway, state).run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - candidate selection, reply decision, dispatch and the poll loop
//! - [`gateway`] - FreeDATA wire types, the `Gateway` trait and the HTTP client
//! - [`storage`] - durable last-replied state with atomic replace
//! - [`config`] - configuration model, defaults and validation
//! - [`errors`] - typed error taxonomy
//! - [`metrics`] - process-local tick counters
//! - [`logutil`] - single-line log rendering of message bodies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Poll Loop     │ ← one tick per interval, cancellable
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Select/Evaluate │ ← today's latest received msg, dedup, trigger
//! └─────────────────┘
//!          │
//! ┌─────────────────┐      ┌─────────────────┐
//! │   Dispatcher    │ ───▶ │  Reply State    │ ← advanced only after a send
//! └─────────────────┘      └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ FreeDATA API    │ ← radio status, message list, send
//! └─────────────────┘
//! ```

pub mod bot;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logutil;
pub mod metrics;
pub mod storage;
