//! Data access layer
//!
//! The [`ChatStore`] trait is the only thing request handlers see. Two
//! backends implement it: [`MongoStore`] for production and [`MemoryStore`]
//! for development and tests.

pub mod memory;
pub mod mongo;

use crate::models::{Chat, ChatListItem, Company, CompanyCreate, NewChat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Collection holding company documents
pub const COMPANY_COLLECTION: &str = "companies";

/// Collection holding chat documents
pub const CHAT_COLLECTION: &str = "chats";

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique key already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The database driver reported a failure
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A record could not be converted to a document
    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// The store did not return a document it should have
    #[error("Missing document: {0}")]
    MissingDocument(String),
}

/// Storage operations used by the HTTP handlers
///
/// Reads return `Option`/`Vec` so absence is never an error.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert a company, failing with [`StoreError::DuplicateKey`] if the
    /// `companyId` is taken
    async fn insert_company(&self, company: &CompanyCreate) -> Result<(), StoreError>;

    /// List companies in store order, at most `limit` of them
    async fn list_companies(&self, limit: i64) -> Result<Vec<Company>, StoreError>;

    /// Fetch the chat for (`company_id`, `contact_phone`)
    async fn find_chat(
        &self,
        company_id: &str,
        contact_phone: &str,
    ) -> Result<Option<Chat>, StoreError>;

    /// Append the candidate's messages to its chat, creating the chat if
    /// needed, and return the full stored chat
    ///
    /// `now` becomes `updatedAt`, and also `createdAt` when the chat is new.
    async fn upsert_chat(&self, chat: NewChat, now: DateTime<Utc>) -> Result<Chat, StoreError>;

    /// List chat summaries for a company, at most `limit` of them
    async fn list_chats(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatListItem>, StoreError>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the backend's resources
    async fn shutdown(&self);
}
