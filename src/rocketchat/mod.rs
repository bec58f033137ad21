mod api;
mod client;
mod dispatcher;
mod message;
mod query;
mod response;
mod session;


pub use api::{ApiCall, HttpMethod};
pub use client::RocketChatClient;
pub use dispatcher::{api_base_url, CallDispatcher};
pub use message::{Attachment, AttachmentField, ChatMessage, PostMessageRequest};
pub use query::QueryParams;
pub use response::{ApiResponse, AuthData, Room, ServerInfo, User};
pub use session::{password_digest, AuthToken, SessionManager, SessionState};
