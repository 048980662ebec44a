pub mod config;
pub mod markup;
pub mod matcher;
pub mod responder;
pub mod reveal;
pub mod state;

// Re-export main types for convenience
pub use config::{Config, ConfigError, DelayRange};
pub use matcher::{matches, MatchMode, Matcher};
pub use responder::{Answer, AnswerKind, Responder};
pub use reveal::{present, prefixes, ReplyEvent, Reveal};
pub use state::{ChatMessage, ChatRole, PendingReply, Session};
