//! Client side of the chat backend's HTTP interface.
//!
//! Endpoints:
//! - `GET /sessions`, `GET /session/{id}` (multi-session mode)
//! - `POST /process-url` (multi-session mode, blocks until crawled)
//! - `POST /load-url` (legacy mode, crawl continues in the background)
//! - `POST /ask` (both modes, with or without a session identifier)

pub mod client;
pub mod error;
pub mod types;

pub use client::{Backend, BackendFuture, HttpBackend};
pub use error::{ApiError, ApiResult};
pub use types::{ConversationTurn, Session, SessionDetail, SessionId};
