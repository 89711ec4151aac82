//! Realtime translation sessions over WebSocket.
//!
//! Clients connect to `/ws`, stream 16 kHz WAV chunks as binary frames,
//! and receive a synthesized Russian audio frame plus a JSON text frame
//! per chunk. Protocol framing lives in [`protocol`], the per-connection
//! loop in [`handler`], and the HTTP surface in [`server`].

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::run_session;
pub use protocol::{ErrorReply, TranslationReply};
pub use server::{AppState, router, serve};
