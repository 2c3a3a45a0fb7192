use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::super::domain::{DocumentMeta, OwnerId, RubricDocument, RubricId, ShareToken};
use super::repository::{RubricPatch, RubricRepository, RepositoryError};

pub const SHARE_TOKEN_LENGTH: usize = 10;

/// Process-local document store used by the API binary, the demo and tests.
#[derive(Default)]
pub struct InMemoryRubricRepository {
    records: Mutex<BTreeMap<RubricId, RubricDocument>>,
}

impl InMemoryRubricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> Result<MutexGuard<'_, BTreeMap<RubricId, RubricDocument>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("rubric store lock poisoned".to_string()))
    }
}

fn mint_share_token() -> ShareToken {
    let raw = Uuid::new_v4().simple().to_string();
    ShareToken(raw[..SHARE_TOKEN_LENGTH].to_string())
}

impl RubricRepository for InMemoryRubricRepository {
    fn create(&self, document: RubricDocument, owner: &OwnerId) -> Result<RubricId, RepositoryError> {
        let id = RubricId(Uuid::new_v4().to_string());
        let now = Utc::now();
        let stored = RubricDocument {
            meta: DocumentMeta {
                id: Some(id.clone()),
                user_id: Some(owner.clone()),
                created_at: Some(now),
                updated_at: Some(now),
                is_public: false,
                share_id: None,
            },
            ..document
        };
        self.records()?.insert(id.clone(), stored);
        Ok(id)
    }

    fn update(&self, id: &RubricId, patch: RubricPatch) -> Result<(), RepositoryError> {
        let mut records = self.records()?;
        let current = records.get(id).ok_or(RepositoryError::NotFound)?;
        let mut updated = patch.apply_to(current);
        updated.meta.updated_at = Some(Utc::now());
        records.insert(id.clone(), updated);
        Ok(())
    }

    fn get(&self, id: &RubricId) -> Result<Option<RubricDocument>, RepositoryError> {
        Ok(self.records()?.get(id).cloned())
    }

    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<RubricDocument>, RepositoryError> {
        let mut documents: Vec<RubricDocument> = self
            .records()?
            .values()
            .filter(|document| document.meta.user_id.as_ref() == Some(owner))
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.meta.updated_at.cmp(&a.meta.updated_at));
        Ok(documents)
    }

    fn delete(&self, id: &RubricId) -> Result<(), RepositoryError> {
        self.records()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn enable_sharing(&self, id: &RubricId) -> Result<ShareToken, RepositoryError> {
        let mut records = self.records()?;
        let document = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if document.meta.is_public {
            if let Some(token) = &document.meta.share_id {
                return Ok(token.clone());
            }
        }

        let token = document
            .meta
            .share_id
            .clone()
            .unwrap_or_else(mint_share_token);
        document.meta.is_public = true;
        document.meta.share_id = Some(token.clone());
        document.meta.updated_at = Some(Utc::now());
        Ok(token)
    }

    fn disable_sharing(&self, id: &RubricId) -> Result<(), RepositoryError> {
        let mut records = self.records()?;
        let document = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        document.meta.is_public = false;
        document.meta.updated_at = Some(Utc::now());
        Ok(())
    }

    fn get_by_share_token(&self, token: &ShareToken) -> Result<Option<RubricDocument>, RepositoryError> {
        Ok(self
            .records()?
            .values()
            .find(|document| document.meta.is_public && document.meta.share_id.as_ref() == Some(token))
            .cloned())
    }
}
