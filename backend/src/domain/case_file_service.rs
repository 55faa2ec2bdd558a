//! Case file lifecycle use-cases.
//!
//! The service owns the workflow rules: creation requires at least one item,
//! review transitions go through the entity's state machine, and every
//! evidence mutation re-opens the parent case file. Persistence-level
//! atomicity for the compound writes is the repository's contract.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{CaseFilePersistenceError, CaseFileRepository};
use crate::domain::{
    AuthClaims, CaseFile, CaseFileDetails, CaseFileQuery, CaseFileScope, CaseState, Error,
    EvidenceItem, EvidenceItemFields, ReportFilter, Role,
};

/// Lifecycle operations over the case file repository port.
#[derive(Clone)]
pub struct CaseFileService {
    cases: Arc<dyn CaseFileRepository>,
}

fn map_case_persistence_error(error: CaseFilePersistenceError) -> Error {
    match error {
        CaseFilePersistenceError::Connection { message } => Error::service_unavailable(message),
        CaseFilePersistenceError::Query { message } => Error::internal(message),
    }
}

fn case_file_not_found() -> Error {
    Error::not_found("case file not found")
}

fn evidence_item_not_found() -> Error {
    Error::not_found("evidence item not found")
}

/// Visibility scope for the caller's role.
fn scope_for(claims: &AuthClaims) -> CaseFileScope {
    match claims.role {
        Role::Technician => CaseFileScope::OwnedBy(claims.user_id),
        Role::Coordinator => CaseFileScope::All,
    }
}

impl CaseFileService {
    /// Create the service over its repository port.
    pub fn new(cases: Arc<dyn CaseFileRepository>) -> Self {
        Self { cases }
    }

    /// Open a new case file with its initial evidence items.
    ///
    /// # Errors
    ///
    /// `invalid_request` when the item list is empty.
    pub async fn create(
        &self,
        technician_id: Uuid,
        items: Vec<EvidenceItemFields>,
    ) -> Result<CaseFileDetails, Error> {
        if items.is_empty() {
            return Err(
                Error::invalid_request("at least one evidence item is required").with_details(
                    json!({ "field": "indicios", "code": "empty_list" }),
                ),
            );
        }

        let case_file = CaseFile::open(technician_id);
        let items: Vec<EvidenceItem> = items
            .into_iter()
            .map(|fields| EvidenceItem::new(case_file.id(), fields))
            .collect();

        self.cases
            .create_with_items(&case_file, &items)
            .await
            .map_err(map_case_persistence_error)?;

        Ok(CaseFileDetails {
            case_file,
            technician: None,
            items,
        })
    }

    /// List every pending case file, newest first.
    pub async fn pending(&self) -> Result<Vec<CaseFileDetails>, Error> {
        let query = CaseFileQuery {
            scope: CaseFileScope::All,
            state: Some(CaseState::Pending),
            range: None,
        };
        self.cases
            .list(&query)
            .await
            .map_err(map_case_persistence_error)
    }

    /// Approve a case file. Approving twice is a no-op success.
    pub async fn approve(&self, id: Uuid) -> Result<CaseFile, Error> {
        let mut case_file = self
            .cases
            .find_header(id)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(case_file_not_found)?;

        case_file.approve();
        self.persist_state(&case_file).await?;
        Ok(case_file)
    }

    /// Reject a case file, recording the justification.
    ///
    /// # Errors
    ///
    /// `invalid_request` when the justification is blank.
    pub async fn reject(&self, id: Uuid, justification: &str) -> Result<CaseFile, Error> {
        let justification = justification.trim();
        if justification.is_empty() {
            return Err(
                Error::invalid_request("a justification is required to reject a case file")
                    .with_details(json!({ "field": "justificacion", "code": "empty_field" })),
            );
        }

        let mut case_file = self
            .cases
            .find_header(id)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(case_file_not_found)?;

        case_file.reject(justification.to_owned());
        self.persist_state(&case_file).await?;
        Ok(case_file)
    }

    /// List case files visible to the caller, newest first.
    pub async fn list_for(&self, claims: &AuthClaims) -> Result<Vec<CaseFileDetails>, Error> {
        let query = CaseFileQuery::scoped(scope_for(claims));
        self.cases
            .list(&query)
            .await
            .map_err(map_case_persistence_error)
    }

    /// Report case files matching the filters, scoped by the caller's role.
    pub async fn report(
        &self,
        claims: &AuthClaims,
        filter: ReportFilter,
    ) -> Result<Vec<CaseFileDetails>, Error> {
        let query = CaseFileQuery {
            scope: scope_for(claims),
            state: filter.state,
            range: filter.range,
        };
        self.cases
            .list(&query)
            .await
            .map_err(map_case_persistence_error)
    }

    /// Fetch one case file with items and technician identity.
    pub async fn get(&self, id: Uuid) -> Result<CaseFileDetails, Error> {
        self.cases
            .find_details(id)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(case_file_not_found)
    }

    /// Attach a new evidence item; the case file re-opens to pending.
    pub async fn add_item(
        &self,
        claims: &AuthClaims,
        case_file_id: Uuid,
        fields: EvidenceItemFields,
    ) -> Result<EvidenceItem, Error> {
        self.owned_case(claims, case_file_id).await?;
        let item = EvidenceItem::new(case_file_id, fields);
        self.cases
            .insert_item(&item)
            .await
            .map_err(map_case_persistence_error)?;
        Ok(item)
    }

    /// Update an evidence item's fields; the case file re-opens to pending.
    pub async fn update_item(
        &self,
        claims: &AuthClaims,
        case_file_id: Uuid,
        item_id: Uuid,
        fields: EvidenceItemFields,
    ) -> Result<EvidenceItem, Error> {
        self.owned_case(claims, case_file_id).await?;
        self.cases
            .update_item(case_file_id, item_id, &fields)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(evidence_item_not_found)
    }

    /// Delete an evidence item; the case file re-opens to pending.
    ///
    /// Removing the last item leaves an empty case file on record.
    pub async fn delete_item(
        &self,
        claims: &AuthClaims,
        case_file_id: Uuid,
        item_id: Uuid,
    ) -> Result<EvidenceItem, Error> {
        self.owned_case(claims, case_file_id).await?;
        self.cases
            .delete_item(case_file_id, item_id)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(evidence_item_not_found)
    }

    /// Load a case file header and require the caller to own it.
    async fn owned_case(&self, claims: &AuthClaims, id: Uuid) -> Result<CaseFile, Error> {
        let case_file = self
            .cases
            .find_header(id)
            .await
            .map_err(map_case_persistence_error)?
            .ok_or_else(case_file_not_found)?;
        if case_file.technician_id() != claims.user_id {
            return Err(Error::forbidden(
                "only the owning technician may modify evidence",
            ));
        }
        Ok(case_file)
    }

    /// Write the entity's current state and justification back to the store.
    async fn persist_state(&self, case_file: &CaseFile) -> Result<(), Error> {
        let updated = self
            .cases
            .set_state(case_file)
            .await
            .map_err(map_case_persistence_error)?;
        if updated { Ok(()) } else { Err(case_file_not_found()) }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use mockall::predicate::{always, eq};
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockCaseFileRepository;

    fn fields(description: &str) -> EvidenceItemFields {
        EvidenceItemFields::new(description, "gris", "pequeño", 0.5, "bodega A")
            .expect("valid fields")
    }

    fn technician_claims(user_id: Uuid) -> AuthClaims {
        AuthClaims {
            user_id,
            role: Role::Technician,
        }
    }

    fn pending_case(technician_id: Uuid) -> CaseFile {
        CaseFile::open(technician_id)
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_empty_item_lists_before_touching_the_store() {
        let mut repo = MockCaseFileRepository::new();
        repo.expect_create_with_items().never();
        let service = CaseFileService::new(Arc::new(repo));

        let err = service
            .create(Uuid::new_v4(), Vec::new())
            .await
            .expect_err("empty list must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn create_persists_case_and_items_together() {
        let technician_id = Uuid::new_v4();
        let mut repo = MockCaseFileRepository::new();
        repo.expect_create_with_items()
            .withf(move |case, items| {
                case.technician_id() == technician_id
                    && case.state() == CaseState::Pending
                    && items.len() == 2
                    && items.iter().all(|i| i.case_file_id() == case.id())
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let service = CaseFileService::new(Arc::new(repo));

        let details = service
            .create(technician_id, vec![fields("casquillo"), fields("fibra")])
            .await
            .expect("creation succeeds");
        assert_eq!(details.case_file.state(), CaseState::Pending);
        assert_eq!(details.items.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn approve_clears_any_stored_justification() {
        let mut rejected = pending_case(Uuid::new_v4());
        rejected.reject("missing photos".to_owned());
        let id = rejected.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .with(eq(id))
            .returning(move |_| Ok(Some(rejected.clone())));
        repo.expect_set_state()
            .withf(move |case| {
                case.id() == id
                    && case.state() == CaseState::Approved
                    && case.justification().is_none()
            })
            .times(1)
            .returning(|_| Ok(true));
        let service = CaseFileService::new(Arc::new(repo));

        let approved = service.approve(id).await.expect("approval succeeds");
        assert_eq!(approved.state(), CaseState::Approved);
        assert!(approved.justification().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn approve_unknown_case_is_not_found() {
        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header().returning(|_| Ok(None));
        let service = CaseFileService::new(Arc::new(repo));

        let err = service
            .approve(Uuid::new_v4())
            .await
            .expect_err("unknown id must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn reject_requires_a_justification(#[case] justification: &str) {
        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header().never();
        repo.expect_set_state().never();
        let service = CaseFileService::new(Arc::new(repo));

        let err = service
            .reject(Uuid::new_v4(), justification)
            .await
            .expect_err("blank justification must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn reject_stores_the_trimmed_justification() {
        let case = pending_case(Uuid::new_v4());
        let id = case.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .with(eq(id))
            .returning(move |_| Ok(Some(case.clone())));
        repo.expect_set_state()
            .withf(move |case| {
                case.id() == id
                    && case.state() == CaseState::Rejected
                    && case.justification() == Some("weak evidence")
            })
            .times(1)
            .returning(|_| Ok(true));
        let service = CaseFileService::new(Arc::new(repo));

        let rejected = service
            .reject(id, "  weak evidence  ")
            .await
            .expect("rejection succeeds");
        assert_eq!(rejected.state(), CaseState::Rejected);
        assert_eq!(rejected.justification(), Some("weak evidence"));
    }

    #[rstest]
    #[tokio::test]
    async fn technicians_list_only_their_own_case_files() {
        let technician_id = Uuid::new_v4();
        let mut repo = MockCaseFileRepository::new();
        repo.expect_list()
            .withf(move |query| query.scope == CaseFileScope::OwnedBy(technician_id))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let service = CaseFileService::new(Arc::new(repo));

        service
            .list_for(&technician_claims(technician_id))
            .await
            .expect("listing succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn coordinators_list_everything() {
        let mut repo = MockCaseFileRepository::new();
        repo.expect_list()
            .withf(|query| query.scope == CaseFileScope::All && query.state.is_none())
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let service = CaseFileService::new(Arc::new(repo));

        let claims = AuthClaims {
            user_id: Uuid::new_v4(),
            role: Role::Coordinator,
        };
        service.list_for(&claims).await.expect("listing succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn add_item_requires_ownership() {
        let owner = Uuid::new_v4();
        let case = pending_case(owner);
        let case_id = case.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .returning(move |_| Ok(Some(case.clone())));
        repo.expect_insert_item().never();
        let service = CaseFileService::new(Arc::new(repo));

        let intruder = technician_claims(Uuid::new_v4());
        let err = service
            .add_item(&intruder, case_id, fields("casquillo"))
            .await
            .expect_err("foreign technician must be refused");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn add_item_inserts_for_the_owner() {
        let owner = Uuid::new_v4();
        let case = pending_case(owner);
        let case_id = case.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .returning(move |_| Ok(Some(case.clone())));
        repo.expect_insert_item()
            .withf(move |item| item.case_file_id() == case_id)
            .times(1)
            .returning(|_| Ok(()));
        let service = CaseFileService::new(Arc::new(repo));

        let item = service
            .add_item(&technician_claims(owner), case_id, fields("casquillo"))
            .await
            .expect("insertion succeeds");
        assert_eq!(item.fields().description(), "casquillo");
    }

    #[rstest]
    #[tokio::test]
    async fn update_item_surfaces_missing_items_as_not_found() {
        let owner = Uuid::new_v4();
        let case = pending_case(owner);
        let case_id = case.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .returning(move |_| Ok(Some(case.clone())));
        repo.expect_update_item()
            .with(eq(case_id), always(), always())
            .returning(|_, _, _| Ok(None));
        let service = CaseFileService::new(Arc::new(repo));

        let err = service
            .update_item(
                &technician_claims(owner),
                case_id,
                Uuid::new_v4(),
                fields("actualizado"),
            )
            .await
            .expect_err("missing item must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_item_returns_the_removed_item() {
        let owner = Uuid::new_v4();
        let case = pending_case(owner);
        let case_id = case.id();
        let item = EvidenceItem::new(case_id, fields("casquillo"));
        let item_id = item.id();

        let mut repo = MockCaseFileRepository::new();
        repo.expect_find_header()
            .returning(move |_| Ok(Some(case.clone())));
        repo.expect_delete_item()
            .with(eq(case_id), eq(item_id))
            .times(1)
            .returning(move |_, _| Ok(Some(item.clone())));
        let service = CaseFileService::new(Arc::new(repo));

        let deleted = service
            .delete_item(&technician_claims(owner), case_id, item_id)
            .await
            .expect("deletion succeeds");
        assert_eq!(deleted.id(), item_id);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_map_to_internal_errors() {
        let mut repo = MockCaseFileRepository::new();
        repo.expect_list()
            .returning(|_| Err(CaseFilePersistenceError::query("boom")));
        let service = CaseFileService::new(Arc::new(repo));

        let err = service
            .pending()
            .await
            .expect_err("store failure must surface");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
