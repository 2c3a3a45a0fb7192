//! Persistence-backed rubric library: saving, loading, sharing and listing.

mod filters;
mod memory;
mod repository;
mod service;

pub use filters::{InvalidFilter, LibraryFilters, RubricSummary, SortKey, SortOrder};
pub use memory::{InMemoryRubricRepository, SHARE_TOKEN_LENGTH};
pub use repository::{RepositoryError, RubricPatch, RubricRepository};
pub use service::{LibraryError, RubricLibraryService, COPY_SUFFIX};
