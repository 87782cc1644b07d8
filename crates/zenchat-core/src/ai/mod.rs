pub mod chat;

pub use chat::{ChatClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, FALLBACK_REPLY};
