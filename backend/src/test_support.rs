//! In-memory adapters for integration tests.
//!
//! These implement the persistence ports over shared `Mutex`-guarded state,
//! honouring the same contracts as the Diesel adapters: newest-first
//! ordering, role scoping via the query, parent re-open on item mutations,
//! and cascade semantics. Enabled through the `test-support` feature only.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    CaseFilePersistenceError, CaseFileRepository, TokenCodec, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountService, CaseFile, CaseFileDetails, CaseFileQuery, CaseFileService, Email, EvidenceItem,
    EvidenceItemFields, User,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::auth::{Argon2PasswordHasher, JwtTokenCodec};

/// Shared in-memory store backing both repositories.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<User>>,
    cases: Mutex<Vec<CaseFile>>,
    items: Mutex<Vec<EvidenceItem>>,
}

impl InMemoryStore {
    /// Fresh, empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn technician_ref(&self, technician_id: Uuid) -> Option<crate::domain::TechnicianRef> {
        self.users
            .lock()
            .expect("state lock")
            .iter()
            .find(|user| user.id() == technician_id)
            .map(User::technician_ref)
    }

    fn items_of(&self, case_file_id: Uuid) -> Vec<EvidenceItem> {
        self.items
            .lock()
            .expect("state lock")
            .iter()
            .filter(|item| item.case_file_id() == case_file_id)
            .cloned()
            .collect()
    }

    fn details_of(&self, case_file: CaseFile) -> CaseFileDetails {
        let technician = self.technician_ref(case_file.technician_id());
        let items = self.items_of(case_file.id());
        CaseFileDetails {
            case_file,
            technician,
            items,
        }
    }

    fn reopen_case(&self, case_file_id: Uuid) {
        let mut cases = self.cases.lock().expect("state lock");
        if let Some(case) = cases.iter_mut().find(|case| case.id() == case_file_id) {
            case.reopen();
        }
    }
}

/// In-memory implementation of the user repository port.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    /// Repository over the shared store.
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.store.users.lock().expect("state lock");
        if users.iter().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let users = self.store.users.lock().expect("state lock");
        Ok(users.iter().find(|user| user.email() == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let users = self.store.users.lock().expect("state lock");
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }
}

/// In-memory implementation of the case file repository port.
#[derive(Clone)]
pub struct InMemoryCaseFileRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCaseFileRepository {
    /// Repository over the shared store.
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CaseFileRepository for InMemoryCaseFileRepository {
    async fn create_with_items(
        &self,
        case_file: &CaseFile,
        items: &[EvidenceItem],
    ) -> Result<(), CaseFilePersistenceError> {
        self.store
            .cases
            .lock()
            .expect("state lock")
            .push(case_file.clone());
        self.store
            .items
            .lock()
            .expect("state lock")
            .extend(items.iter().cloned());
        Ok(())
    }

    async fn find_header(&self, id: Uuid) -> Result<Option<CaseFile>, CaseFilePersistenceError> {
        let cases = self.store.cases.lock().expect("state lock");
        Ok(cases.iter().find(|case| case.id() == id).cloned())
    }

    async fn find_details(
        &self,
        id: Uuid,
    ) -> Result<Option<CaseFileDetails>, CaseFilePersistenceError> {
        let case = {
            let cases = self.store.cases.lock().expect("state lock");
            cases.iter().find(|case| case.id() == id).cloned()
        };
        Ok(case.map(|case| self.store.details_of(case)))
    }

    async fn list(
        &self,
        query: &CaseFileQuery,
    ) -> Result<Vec<CaseFileDetails>, CaseFilePersistenceError> {
        let mut matching: Vec<CaseFile> = {
            let cases = self.store.cases.lock().expect("state lock");
            cases
                .iter()
                .filter(|case| query.matches(case))
                .cloned()
                .collect()
        };
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching
            .into_iter()
            .map(|case| self.store.details_of(case))
            .collect())
    }

    async fn set_state(&self, case_file: &CaseFile) -> Result<bool, CaseFilePersistenceError> {
        let mut cases = self.store.cases.lock().expect("state lock");
        match cases.iter_mut().find(|case| case.id() == case_file.id()) {
            Some(stored) => {
                *stored = case_file.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_item(&self, item: &EvidenceItem) -> Result<(), CaseFilePersistenceError> {
        self.store
            .items
            .lock()
            .expect("state lock")
            .push(item.clone());
        self.store.reopen_case(item.case_file_id());
        Ok(())
    }

    async fn update_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
        fields: &EvidenceItemFields,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        let updated = {
            let mut items = self.store.items.lock().expect("state lock");
            let found = items
                .iter_mut()
                .find(|item| item.id() == item_id && item.case_file_id() == case_file_id);
            match found {
                Some(item) => {
                    *item = EvidenceItem::restore(item_id, case_file_id, fields.clone());
                    Some(item.clone())
                }
                None => None,
            }
        };
        if updated.is_some() {
            self.store.reopen_case(case_file_id);
        }
        Ok(updated)
    }

    async fn delete_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        let deleted = {
            let mut items = self.store.items.lock().expect("state lock");
            let position = items
                .iter()
                .position(|item| item.id() == item_id && item.case_file_id() == case_file_id);
            position.map(|index| items.remove(index))
        };
        if deleted.is_some() {
            self.store.reopen_case(case_file_id);
        }
        Ok(deleted)
    }
}

/// Secret used by the test token codec.
pub const TEST_TOKEN_SECRET: &[u8] = b"integration-test-secret";

/// HTTP state wired to in-memory adapters and real credential primitives.
pub fn in_memory_state() -> HttpState {
    let store = InMemoryStore::new();
    let tokens: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::with_default_ttl(TEST_TOKEN_SECRET));
    let accounts = AccountService::new(
        Arc::new(InMemoryUserRepository::new(store.clone())),
        Arc::new(Argon2PasswordHasher),
        tokens.clone(),
    );
    let case_files = CaseFileService::new(Arc::new(InMemoryCaseFileRepository::new(store)));
    HttpState::new(accounts, case_files, tokens)
}
