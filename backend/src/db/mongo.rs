//! MongoDB store
//!
//! Chats are keyed on (`companyId`, `contact.phone`). Appends go through a
//! single `findOneAndUpdate` with `upsert`, backed by a unique index, so
//! there is no separate existence check to race against.

use crate::config::DatabaseConfig;
use crate::db::{ChatStore, StoreError, CHAT_COLLECTION, COMPANY_COLLECTION};
use crate::models::chat::format_timestamp;
use crate::models::{Chat, ChatListItem, Company, CompanyCreate, NewChat};
use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Store backed by a MongoDB database
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    companies: Collection<Company>,
    chats: Collection<Chat>,
}

/// Projection target for chat summaries
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatSummaryDoc {
    #[serde(default)]
    chat_id: String,
    #[serde(default)]
    contact: SummaryContact,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryContact {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl From<ChatSummaryDoc> for ChatListItem {
    fn from(doc: ChatSummaryDoc) -> Self {
        Self {
            chat_id: doc.chat_id,
            contact_phone: doc.contact.phone,
            display_name: doc.contact.display_name,
            updated_at: doc.updated_at,
        }
    }
}

impl MongoStore {
    /// Connect, verify the server answers, and ensure indexes exist
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(config.timeout);
        options.connect_timeout = Some(config.timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(database = %config.database, "Connected to MongoDB");

        let store = Self {
            companies: database.collection(COMPANY_COLLECTION),
            chats: database.collection(CHAT_COLLECTION),
            database,
            client,
        };
        store.apply_indexes().await;

        Ok(store)
    }

    /// Create the unique indexes the upsert relies on
    ///
    /// Failure (e.g. pre-existing duplicates) is logged and tolerated.
    async fn apply_indexes(&self) {
        let company_index = IndexModel::builder()
            .keys(doc! { "companyId": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("companyId_unique".to_string())
                    .build(),
            )
            .build();
        if let Err(e) = self.companies.create_index(company_index).await {
            warn!(error = %e, "Failed to create unique index on companies.companyId");
        }

        let chat_index = IndexModel::builder()
            .keys(doc! { "companyId": 1, "contact.phone": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("companyId_contactPhone_unique".to_string())
                    .build(),
            )
            .build();
        if let Err(e) = self.chats.create_index(chat_index).await {
            warn!(error = %e, "Failed to create unique index on chats (companyId, contact.phone)");
        }
    }

    async fn find_one_and_append(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<Chat>, mongodb::error::Error> {
        self.chats
            .find_one_and_update(filter, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }
}

/// Filter selecting the chat for (`company_id`, `contact_phone`)
pub(crate) fn chat_filter(company_id: &str, contact_phone: &str) -> Document {
    doc! {
        "companyId": company_id,
        "contact.phone": contact_phone,
    }
}

/// Update document that appends the candidate's messages
///
/// Identity fields come from the filter on insert; the remaining chat fields
/// are only written when the upsert creates the document.
pub(crate) fn append_update(chat: &NewChat, now: &str) -> Result<Document, StoreError> {
    let messages = bson::to_bson(&chat.messages)?;
    Ok(doc! {
        "$push": { "messages": { "$each": messages } },
        "$set": { "updatedAt": now },
        "$setOnInsert": {
            "companyAlias": chat.company_alias.as_str(),
            "companyPhone": chat.company_phone.as_str(),
            "chatId": chat.chat_id(),
            "contact.displayName": chat.contact.display_name.as_deref(),
            "createdAt": now,
        },
    })
}

/// Whether a driver error is a unique index violation
///
/// `insert_one` reports it as a write error, `findOneAndUpdate` as a command
/// error.
fn is_duplicate_key(kind: &ErrorKind) -> bool {
    match kind {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[async_trait]
impl ChatStore for MongoStore {
    async fn insert_company(&self, company: &CompanyCreate) -> Result<(), StoreError> {
        let filter = doc! { "companyId": company.company_id.as_str() };
        if self.companies.find_one(filter).await?.is_some() {
            return Err(StoreError::DuplicateKey(format!(
                "companyId {}",
                company.company_id
            )));
        }

        match self
            .companies
            .clone_with_type::<CompanyCreate>()
            .insert_one(company)
            .await
        {
            Ok(_) => {
                debug!(company_id = %company.company_id, "Inserted company");
                Ok(())
            }
            Err(e) if is_duplicate_key(&e.kind) => Err(StoreError::DuplicateKey(format!(
                "companyId {}",
                company.company_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_companies(&self, limit: i64) -> Result<Vec<Company>, StoreError> {
        let cursor = self.companies.find(doc! {}).limit(limit).await?;
        let companies: Vec<Company> = cursor.try_collect().await?;
        Ok(companies)
    }

    async fn find_chat(
        &self,
        company_id: &str,
        contact_phone: &str,
    ) -> Result<Option<Chat>, StoreError> {
        Ok(self
            .chats
            .find_one(chat_filter(company_id, contact_phone))
            .await?)
    }

    async fn upsert_chat(&self, chat: NewChat, now: DateTime<Utc>) -> Result<Chat, StoreError> {
        let now = format_timestamp(now);
        let filter = chat_filter(&chat.company_id, &chat.contact.phone);
        let update = append_update(&chat, &now)?;

        let result = match self
            .find_one_and_append(filter.clone(), update.clone())
            .await
        {
            // Two upserts raced to insert; the loser now matches the winner's
            // document and appends to it.
            Err(e) if is_duplicate_key(&e.kind) => {
                debug!(
                    company_id = %chat.company_id,
                    contact_phone = %chat.contact.phone,
                    "Chat upsert lost insert race, retrying as append"
                );
                self.find_one_and_append(filter, update).await?
            }
            other => other?,
        };

        result.ok_or_else(|| {
            StoreError::MissingDocument(format!(
                "chat ({}, {}) after upsert",
                chat.company_id, chat.contact.phone
            ))
        })
    }

    async fn list_chats(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatListItem>, StoreError> {
        let cursor = self
            .chats
            .clone_with_type::<ChatSummaryDoc>()
            .find(doc! { "companyId": company_id })
            .projection(doc! { "_id": 0, "chatId": 1, "contact": 1, "updatedAt": 1 })
            .limit(limit)
            .await?;
        let docs: Vec<ChatSummaryDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(ChatListItem::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}
