use std::sync::Arc;

use tracing::{info, warn};

use super::super::domain::{OwnerId, RubricDocument, RubricId, ShareToken};
use super::filters::LibraryFilters;
use super::repository::{RepositoryError, RubricPatch, RubricRepository};

pub const COPY_SUFFIX: &str = " (Copy)";

/// Save, load and sharing flows over a [`RubricRepository`].
pub struct RubricLibraryService<R> {
    repository: Arc<R>,
}

impl<R> RubricLibraryService<R>
where
    R: RubricRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates the rubric when it has no id yet, otherwise writes every content
    /// field over the stored copy. Returns the stored document with merged
    /// identifiers and timestamps.
    pub fn save(
        &self,
        owner: &OwnerId,
        document: &RubricDocument,
    ) -> Result<RubricDocument, LibraryError> {
        let id = match document.id() {
            None => {
                let id = self.repository.create(document.clone(), owner)?;
                info!(rubric_id = %id, owner = %owner.0, "rubric created");
                id
            }
            Some(id) => {
                self.owned(owner, id)?;
                self.repository
                    .update(id, RubricPatch::from_document(document))?;
                info!(rubric_id = %id, owner = %owner.0, "rubric updated");
                id.clone()
            }
        };
        self.fetch(&id)
    }

    /// Loads a rubric for editing. Only the owner may open it.
    pub fn open_for_edit(
        &self,
        owner: &OwnerId,
        id: &RubricId,
    ) -> Result<RubricDocument, LibraryError> {
        self.owned(owner, id)
    }

    /// Applies a partial update on behalf of the owner.
    pub fn patch(
        &self,
        owner: &OwnerId,
        id: &RubricId,
        patch: RubricPatch,
    ) -> Result<RubricDocument, LibraryError> {
        self.owned(owner, id)?;
        if !patch.is_empty() {
            self.repository.update(id, patch)?;
        }
        self.fetch(id)
    }

    pub fn list(
        &self,
        owner: &OwnerId,
        filters: &LibraryFilters,
    ) -> Result<Vec<RubricDocument>, LibraryError> {
        let documents = self.repository.list_by_owner(owner)?;
        Ok(filters.apply(documents))
    }

    pub fn delete(&self, owner: &OwnerId, id: &RubricId) -> Result<(), LibraryError> {
        self.owned(owner, id)?;
        self.repository.delete(id)?;
        info!(rubric_id = %id, owner = %owner.0, "rubric deleted");
        Ok(())
    }

    /// Copies a rubric the caller owns, or one that is public, into the
    /// caller's library. The copy starts private.
    pub fn duplicate(
        &self,
        owner: &OwnerId,
        id: &RubricId,
    ) -> Result<RubricDocument, LibraryError> {
        let original = self.fetch(id)?;
        let owned = original.meta.user_id.as_ref() == Some(owner);
        if !owned && !original.meta.is_public {
            warn!(rubric_id = %id, owner = %owner.0, "duplicate refused");
            return Err(LibraryError::PermissionDenied(id.clone()));
        }

        let copy = RubricDocument {
            topic: format!("{}{COPY_SUFFIX}", original.topic),
            meta: Default::default(),
            ..original
        };
        let copy_id = self.repository.create(copy, owner)?;
        info!(rubric_id = %id, copy_id = %copy_id, "rubric duplicated");
        self.fetch(&copy_id)
    }

    /// Enables or disables public access. Returns the share token when enabled.
    pub fn set_sharing(
        &self,
        owner: &OwnerId,
        id: &RubricId,
        enabled: bool,
    ) -> Result<Option<ShareToken>, LibraryError> {
        self.owned(owner, id)?;
        if enabled {
            let token = self.repository.enable_sharing(id)?;
            info!(rubric_id = %id, "sharing enabled");
            Ok(Some(token))
        } else {
            self.repository.disable_sharing(id)?;
            info!(rubric_id = %id, "sharing disabled");
            Ok(None)
        }
    }

    /// Resolves a public share token. Private or unknown tokens are not found.
    pub fn shared(&self, token: &ShareToken) -> Result<RubricDocument, LibraryError> {
        self.repository
            .get_by_share_token(token)?
            .ok_or_else(|| LibraryError::ShareNotFound(token.clone()))
    }

    fn fetch(&self, id: &RubricId) -> Result<RubricDocument, LibraryError> {
        self.repository
            .get(id)?
            .ok_or_else(|| LibraryError::NotFound(id.clone()))
    }

    fn owned(&self, owner: &OwnerId, id: &RubricId) -> Result<RubricDocument, LibraryError> {
        let document = self.fetch(id)?;
        if document.meta.user_id.as_ref() != Some(owner) {
            warn!(rubric_id = %id, owner = %owner.0, "access to foreign rubric refused");
            return Err(LibraryError::PermissionDenied(id.clone()));
        }
        Ok(document)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("rubric '{0}' not found")]
    NotFound(RubricId),
    #[error("shared rubric '{0}' not found")]
    ShareNotFound(ShareToken),
    #[error("you do not have permission to access rubric '{0}'")]
    PermissionDenied(RubricId),
    #[error("rubric store failure: {0}")]
    Persistence(#[from] RepositoryError),
}

impl LibraryError {
    /// Only store failures may succeed on a later, user-initiated attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LibraryError::Persistence(_))
    }
}
