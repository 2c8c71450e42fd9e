//! In-process store
//!
//! Keeps companies and chats in insertion order behind a single lock, so
//! every upsert is atomic with respect to other requests.

use crate::db::{ChatStore, StoreError};
use crate::models::chat::format_timestamp;
use crate::models::{Chat, ChatListItem, Company, CompanyCreate, NewChat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Collections {
    companies: Vec<Company>,
    chats: Vec<Chat>,
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn limit_to_usize(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_company(&self, company: &CompanyCreate) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .companies
            .iter()
            .any(|c| c.company_id == company.company_id)
        {
            return Err(StoreError::DuplicateKey(format!(
                "companyId {}",
                company.company_id
            )));
        }
        inner.companies.push(Company::from(company.clone()));
        debug!(company_id = %company.company_id, "Inserted company");
        Ok(())
    }

    async fn list_companies(&self, limit: i64) -> Result<Vec<Company>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .companies
            .iter()
            .take(limit_to_usize(limit))
            .cloned()
            .collect())
    }

    async fn find_chat(
        &self,
        company_id: &str,
        contact_phone: &str,
    ) -> Result<Option<Chat>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chats
            .iter()
            .find(|c| c.company_id == company_id && c.contact.phone == contact_phone)
            .cloned())
    }

    async fn upsert_chat(&self, chat: NewChat, now: DateTime<Utc>) -> Result<Chat, StoreError> {
        let now = format_timestamp(now);
        let mut inner = self.inner.write().await;

        let existing = inner
            .chats
            .iter_mut()
            .find(|c| c.company_id == chat.company_id && c.contact.phone == chat.contact.phone);

        if let Some(stored) = existing {
            stored.messages.extend(chat.messages);
            stored.updated_at = Some(now);
            debug!(
                company_id = %stored.company_id,
                chat_id = %stored.chat_id,
                messages = stored.messages.len(),
                "Appended to chat"
            );
            return Ok(stored.clone());
        }

        let created = chat.into_chat(&now);
        inner.chats.push(created.clone());
        debug!(
            company_id = %created.company_id,
            chat_id = %created.chat_id,
            "Created chat"
        );
        Ok(created)
    }

    async fn list_chats(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatListItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chats
            .iter()
            .filter(|c| c.company_id == company_id)
            .take(limit_to_usize(limit))
            .map(ChatListItem::from)
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn shutdown(&self) {
        debug!("Memory store released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, Message};
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn message(id: &str, body: &str) -> Message {
        Message {
            message_id: id.to_string(),
            role: "user".to_string(),
            body: body.to_string(),
            timestamp: 1,
            date: "2024-01-01".to_string(),
            status: None,
            kind: None,
            ack: None,
        }
    }

    fn new_chat(company: &str, phone: &str, bodies: &[&str]) -> NewChat {
        NewChat {
            company_id: company.to_string(),
            company_alias: "acme".to_string(),
            company_phone: "+1".to_string(),
            chat_id: None,
            contact: ContactInfo {
                display_name: Some(format!("contact {}", phone)),
                phone: phone.to_string(),
            },
            messages: bodies
                .iter()
                .enumerate()
                .map(|(i, b)| message(&format!("m{}", i), b))
                .collect(),
        }
    }

    fn company(id: &str) -> CompanyCreate {
        CompanyCreate {
            company_id: id.to_string(),
            name: format!("Company {}", id),
            alias: id.to_lowercase(),
            phone: "+1".to_string(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn bodies(chat: &Chat) -> Vec<&str> {
        chat.messages.iter().map(|m| m.body.as_str()).collect()
    }

    #[tokio::test]
    async fn test_duplicate_company_is_rejected() {
        let store = MemoryStore::new();
        store.insert_company(&company("C1")).await.unwrap();
        let result = store.insert_company(&company("C1")).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey(_))));

        let companies = store.list_companies(1000).await.unwrap();
        assert_eq!(
            companies.iter().filter(|c| c.company_id == "C1").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_companies_as_set() {
        let store = MemoryStore::new();
        for id in ["C1", "C2", "C3"] {
            store.insert_company(&company(id)).await.unwrap();
        }
        let ids: HashSet<String> = store
            .list_companies(1000)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.company_id)
            .collect();
        let expected: HashSet<String> = ["C1", "C2", "C3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_list_companies_respects_limit() {
        let store = MemoryStore::new();
        for id in ["C1", "C2", "C3"] {
            store.insert_company(&company(id)).await.unwrap();
        }
        assert_eq!(store.list_companies(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_creates_then_appends() {
        let store = MemoryStore::new();

        let created = store
            .upsert_chat(new_chat("C1", "+100", &["hello"]), t0())
            .await
            .unwrap();
        assert_eq!(bodies(&created), vec!["hello"]);
        assert_eq!(created.created_at, created.updated_at);

        let later = t0() + Duration::seconds(5);
        let updated = store
            .upsert_chat(new_chat("C1", "+100", &["world"]), later)
            .await
            .unwrap();
        assert_eq!(bodies(&updated), vec!["hello", "world"]);
        assert_eq!(updated.created_at, created.created_at);
        assert_ne!(updated.updated_at, created.updated_at);
        assert_eq!(updated.updated_at, Some(format_timestamp(later)));
    }

    #[tokio::test]
    async fn test_upsert_appends_many_in_order() {
        let store = MemoryStore::new();
        store
            .upsert_chat(new_chat("C1", "+100", &["a"]), t0())
            .await
            .unwrap();
        let chat = store
            .upsert_chat(new_chat("C1", "+100", &["b", "c", "d"]), t0())
            .await
            .unwrap();
        assert_eq!(bodies(&chat), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_chat_identity_is_company_and_phone() {
        let store = MemoryStore::new();
        store
            .upsert_chat(new_chat("C1", "+100", &["one"]), t0())
            .await
            .unwrap();
        store
            .upsert_chat(new_chat("C2", "+100", &["two"]), t0())
            .await
            .unwrap();

        let c1 = store.find_chat("C1", "+100").await.unwrap().unwrap();
        let c2 = store.find_chat("C2", "+100").await.unwrap().unwrap();
        assert_eq!(bodies(&c1), vec!["one"]);
        assert_eq!(bodies(&c2), vec!["two"]);
    }

    #[tokio::test]
    async fn test_find_missing_chat_is_none() {
        let store = MemoryStore::new();
        assert!(store.find_chat("C1", "+999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_chats_for_company() {
        let store = MemoryStore::new();
        store
            .upsert_chat(new_chat("C1", "+100", &["x"]), t0())
            .await
            .unwrap();
        store
            .upsert_chat(new_chat("C1", "+200", &["y", "z"]), t0())
            .await
            .unwrap();
        store
            .upsert_chat(new_chat("C2", "+300", &["w"]), t0())
            .await
            .unwrap();

        let summaries = store.list_chats("C1", 1000).await.unwrap();
        assert_eq!(summaries.len(), 2);
        let phones: HashSet<&str> = summaries.iter().map(|s| s.contact_phone.as_str()).collect();
        assert!(phones.contains("+100"));
        assert!(phones.contains("+200"));
        assert!(summaries.iter().all(|s| s.updated_at.is_some()));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_chat() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let body = format!("msg {}", i);
                store
                    .upsert_chat(new_chat("C1", "+100", &[body.as_str()]), Utc::now())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list_chats("C1", 1000).await.unwrap().len(), 1);
        let chat = store.find_chat("C1", "+100").await.unwrap().unwrap();
        assert_eq!(chat.messages.len(), 16);
    }
}
