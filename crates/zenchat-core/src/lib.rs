pub mod ai;
pub mod config;
pub mod error;
pub mod segment;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatClient, DEFAULT_ENDPOINT, FALLBACK_REPLY};
pub use config::Config;
pub use error::ChatError;
pub use segment::{segment, segment_opt, Span, SpanKind};
pub use state::{ChatMessage, ChatRole, Conversation};
