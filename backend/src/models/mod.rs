//! Domain models
//!
//! Company and chat records exchanged over HTTP and persisted as documents.
//! Field names are camelCase on the wire and in the store.

pub mod chat;
pub mod company;
pub mod lenient;

pub use chat::{Chat, ChatListItem, ContactInfo, Message, NewChat};
pub use company::{Company, CompanyCreate};
