//! Port for case file and evidence item persistence.
//!
//! Two multi-statement units must be atomic: creating a case file with its
//! items, and mutating an item while re-opening its parent. Adapters are
//! required to run each inside one transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CaseFile, CaseFileDetails, CaseFileQuery, EvidenceItem, EvidenceItemFields};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by case file repository adapters.
    pub enum CaseFilePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "case file repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "case file repository query failed: {message}",
    }
}

/// Port for writing and reading case files and their evidence items.
///
/// Absence is reported through `Option`/`bool` results; errors are reserved
/// for store failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseFileRepository: Send + Sync {
    /// Persist a case file together with its initial items, atomically.
    async fn create_with_items(
        &self,
        case_file: &CaseFile,
        items: &[EvidenceItem],
    ) -> Result<(), CaseFilePersistenceError>;

    /// Fetch a case file header without items.
    async fn find_header(&self, id: Uuid) -> Result<Option<CaseFile>, CaseFilePersistenceError>;

    /// Fetch a case file with items and the owning technician's identity.
    async fn find_details(
        &self,
        id: Uuid,
    ) -> Result<Option<CaseFileDetails>, CaseFilePersistenceError>;

    /// List case files matching the query, newest first, with items and
    /// technician identities attached.
    async fn list(
        &self,
        query: &CaseFileQuery,
    ) -> Result<Vec<CaseFileDetails>, CaseFilePersistenceError>;

    /// Overwrite the stored review state and justification from the entity.
    ///
    /// Returns `false` when no such case file exists.
    async fn set_state(&self, case_file: &CaseFile) -> Result<bool, CaseFilePersistenceError>;

    /// Insert an evidence item and re-open its parent, atomically.
    async fn insert_item(&self, item: &EvidenceItem) -> Result<(), CaseFilePersistenceError>;

    /// Update an item's fields and re-open its parent, atomically.
    ///
    /// Returns `None` when the item does not exist under that case file.
    async fn update_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
        fields: &EvidenceItemFields,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError>;

    /// Delete an item and re-open its parent, atomically.
    ///
    /// Returns the deleted item, or `None` when it does not exist under that
    /// case file.
    async fn delete_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError>;
}

/// Fixture implementation for tests that do not exercise case persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseFileRepository;

#[async_trait]
impl CaseFileRepository for FixtureCaseFileRepository {
    async fn create_with_items(
        &self,
        _case_file: &CaseFile,
        _items: &[EvidenceItem],
    ) -> Result<(), CaseFilePersistenceError> {
        Ok(())
    }

    async fn find_header(&self, _id: Uuid) -> Result<Option<CaseFile>, CaseFilePersistenceError> {
        Ok(None)
    }

    async fn find_details(
        &self,
        _id: Uuid,
    ) -> Result<Option<CaseFileDetails>, CaseFilePersistenceError> {
        Ok(None)
    }

    async fn list(
        &self,
        _query: &CaseFileQuery,
    ) -> Result<Vec<CaseFileDetails>, CaseFilePersistenceError> {
        Ok(Vec::new())
    }

    async fn set_state(&self, _case_file: &CaseFile) -> Result<bool, CaseFilePersistenceError> {
        Ok(false)
    }

    async fn insert_item(&self, _item: &EvidenceItem) -> Result<(), CaseFilePersistenceError> {
        Ok(())
    }

    async fn update_item(
        &self,
        _case_file_id: Uuid,
        _item_id: Uuid,
        _fields: &EvidenceItemFields,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        Ok(None)
    }

    async fn delete_item(
        &self,
        _case_file_id: Uuid,
        _item_id: Uuid,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        Ok(None)
    }
}
