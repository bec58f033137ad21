//! Forwards build pipeline stage-status events to a Rocket.Chat room.
//!
//! An event is checked against the pipeline-group whitelist for its outcome
//! ([`notify::compose`]), turned into a chat message, and posted through an
//! authenticated REST session ([`rocketchat::RocketChatClient`]).

pub mod config;
pub mod error;
pub mod event;
pub mod notifier;
pub mod notify;
pub mod rocketchat;

pub use notifier::{Delivery, Notifier};
