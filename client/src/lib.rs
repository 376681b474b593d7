//! Coach client library - Nucleo delle dashboard: chat in streaming, moderazione e liste paginate
//!
//! I componenti ricevono i loro trasporti dall'esterno ([`ChatTransport`],
//! [`ModerationApi`], [`ListApi`]); [`CoachApi`] è l'implementazione HTTP.

pub mod api;
pub mod chat;
pub mod dto;
pub mod error;
pub mod list;
pub mod moderation;
pub mod refresh;
pub mod session;
pub mod sse;

// Re-export dei tipi principali per facilitare l'import
pub use api::CoachApi;
pub use chat::{ChatPanel, ChatPhase, ChatTransport, Conversation, MessageId, Role};
pub use error::{ClientError, Result};
pub use list::{ListApi, ListController, ListQuery, ListState, QueryChange};
pub use moderation::{ModerationApi, ModerationBoard, ModerationStatus};
pub use refresh::{AutoRefresh, RefreshHandle};
pub use session::{ClientOptions, Session};
pub use sse::{Frame, StreamDecoder};
