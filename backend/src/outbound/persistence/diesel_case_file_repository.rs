//! PostgreSQL-backed `CaseFileRepository` implementation using Diesel ORM.
//!
//! The compound writes (create-with-items, and every item mutation with its
//! parent re-open) run inside a single transaction so a crash or concurrent
//! read can never observe an item change beside a stale review state. Reads
//! that span tables run in a transaction for a consistent MVCC snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CaseFilePersistenceError, CaseFileRepository};
use crate::domain::{
    CaseFile, CaseFileDetails, CaseFileQuery, CaseFileScope, CaseFileSnapshot, CaseState, Email,
    EvidenceItem, EvidenceItemFields, TechnicianRef,
};

use super::diesel_error_mapping::StoreFault;
use super::models::{
    CaseFileReviewUpdate, CaseFileRow, EvidenceItemRow, EvidenceItemUpdate, NewCaseFileRow,
    NewEvidenceItemRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{case_files, evidence_items, users};

/// Diesel-backed implementation of the case file repository port.
#[derive(Clone)]
pub struct DieselCaseFileRepository {
    pool: DbPool,
}

impl DieselCaseFileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_case_fault(fault: StoreFault) -> CaseFilePersistenceError {
    match fault {
        StoreFault::Connection(message) => CaseFilePersistenceError::connection(message),
        StoreFault::Query(message) => CaseFilePersistenceError::query(message),
    }
}

fn map_case_pool_error(error: PoolError) -> CaseFilePersistenceError {
    map_case_fault(StoreFault::from_pool(&error))
}

fn map_case_diesel_error(error: diesel::result::Error) -> CaseFilePersistenceError {
    map_case_fault(StoreFault::from_diesel(&error))
}

/// Convert a database row into a validated domain case file.
fn row_to_case_file(row: CaseFileRow) -> Result<CaseFile, CaseFilePersistenceError> {
    let CaseFileRow {
        id,
        technician_id,
        state,
        justification,
        created_at,
    } = row;

    let state: CaseState = state
        .parse()
        .map_err(|err| CaseFilePersistenceError::query(format!("decode state: {err}")))?;

    CaseFile::restore(CaseFileSnapshot {
        id,
        technician_id,
        state,
        justification,
        created_at,
    })
    .map_err(|err| CaseFilePersistenceError::query(err.to_string()))
}

/// Convert a database row into a validated domain evidence item.
fn row_to_item(row: EvidenceItemRow) -> Result<EvidenceItem, CaseFilePersistenceError> {
    let EvidenceItemRow {
        id,
        case_file_id,
        description,
        color,
        size,
        weight,
        location,
    } = row;

    let fields = EvidenceItemFields::new(&description, &color, &size, weight, &location)
        .map_err(|err| CaseFilePersistenceError::query(format!("decode item fields: {err}")))?;
    Ok(EvidenceItem::restore(id, case_file_id, fields))
}

/// Convert a technician projection into the embedded identity.
fn tuple_to_technician(
    row: (Uuid, String, String),
) -> Result<TechnicianRef, CaseFilePersistenceError> {
    let (id, name, email) = row;
    let email = Email::new(&email)
        .map_err(|err| CaseFilePersistenceError::query(format!("decode email: {err}")))?;
    Ok(TechnicianRef { id, name, email })
}

fn new_item_row(item: &EvidenceItem) -> NewEvidenceItemRow<'_> {
    let fields = item.fields();
    NewEvidenceItemRow {
        id: item.id(),
        case_file_id: item.case_file_id(),
        description: fields.description(),
        color: fields.color(),
        size: fields.size(),
        weight: fields.weight(),
        location: fields.location(),
    }
}

/// Changeset re-opening a case file after an evidence mutation.
fn reopen_update() -> CaseFileReviewUpdate<'static> {
    CaseFileReviewUpdate {
        state: CaseState::Pending.as_str(),
        justification: None,
    }
}

/// Assemble ordered case rows with their technicians and items.
fn assemble_details(
    case_rows: Vec<CaseFileRow>,
    technician_rows: Vec<(Uuid, String, String)>,
    item_rows: Vec<EvidenceItemRow>,
) -> Result<Vec<CaseFileDetails>, CaseFilePersistenceError> {
    let mut technicians: HashMap<Uuid, TechnicianRef> = HashMap::new();
    for row in technician_rows {
        let technician = tuple_to_technician(row)?;
        technicians.insert(technician.id, technician);
    }

    let mut items_by_case: HashMap<Uuid, Vec<EvidenceItem>> = HashMap::new();
    for row in item_rows {
        let item = row_to_item(row)?;
        items_by_case.entry(item.case_file_id()).or_default().push(item);
    }

    case_rows
        .into_iter()
        .map(|row| {
            let case_file = row_to_case_file(row)?;
            let technician = technicians.get(&case_file.technician_id()).cloned();
            if technician.is_none() {
                return Err(CaseFilePersistenceError::query(
                    "technician row missing for case file",
                ));
            }
            let items = items_by_case.remove(&case_file.id()).unwrap_or_default();
            Ok(CaseFileDetails {
                case_file,
                technician,
                items,
            })
        })
        .collect()
}

/// Boxed selection of case file rows, so filters can be applied dynamically.
type BoxedCaseFileQuery<'a> = diesel::helper_types::IntoBoxed<
    'a,
    diesel::helper_types::Select<
        case_files::table,
        diesel::dsl::AsSelect<CaseFileRow, diesel::pg::Pg>,
    >,
    diesel::pg::Pg,
>;

/// Apply scope and filters to the case file selection.
fn filtered_case_query(query: CaseFileQuery) -> BoxedCaseFileQuery<'static> {
    let mut selection = case_files::table
        .select(CaseFileRow::as_select())
        .into_boxed();
    if let CaseFileScope::OwnedBy(owner) = query.scope {
        selection = selection.filter(case_files::technician_id.eq(owner));
    }
    if let Some(state) = query.state {
        selection = selection.filter(case_files::state.eq(state.as_str()));
    }
    if let Some(range) = query.range {
        selection = selection
            .filter(case_files::created_at.ge(range.start()))
            .filter(case_files::created_at.lt(range.end_exclusive()));
    }
    selection
}

/// Load the technician projections for the given ids.
async fn load_technicians(
    conn: &mut AsyncPgConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<(Uuid, String, String)>, diesel::result::Error> {
    users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::name, users::email))
        .load(conn)
        .await
}

#[async_trait]
impl CaseFileRepository for DieselCaseFileRepository {
    async fn create_with_items(
        &self,
        case_file: &CaseFile,
        items: &[EvidenceItem],
    ) -> Result<(), CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let case_row = NewCaseFileRow {
            id: case_file.id(),
            technician_id: case_file.technician_id(),
            state: case_file.state().as_str(),
            justification: case_file.justification(),
            created_at: case_file.created_at(),
        };
        let item_rows: Vec<NewEvidenceItemRow<'_>> = items.iter().map(new_item_row).collect();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(case_files::table)
                    .values(&case_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(evidence_items::table)
                    .values(&item_rows)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_case_diesel_error)
    }

    async fn find_header(&self, id: Uuid) -> Result<Option<CaseFile>, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let row: Option<CaseFileRow> = case_files::table
            .find(id)
            .select(CaseFileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_case_diesel_error)?;

        row.map(row_to_case_file).transpose()
    }

    async fn find_details(
        &self,
        id: Uuid,
    ) -> Result<Option<CaseFileDetails>, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let case_row: Option<CaseFileRow> = case_files::table
                        .find(id)
                        .select(CaseFileRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(case_row) = case_row else {
                        return Ok(None);
                    };

                    let technician_rows =
                        load_technicians(conn, vec![case_row.technician_id]).await?;
                    let item_rows: Vec<EvidenceItemRow> = evidence_items::table
                        .filter(evidence_items::case_file_id.eq(id))
                        .order(evidence_items::id)
                        .select(EvidenceItemRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some((case_row, technician_rows, item_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_case_diesel_error)?;

        let Some((case_row, technician_rows, item_rows)) = loaded else {
            return Ok(None);
        };
        let mut details = assemble_details(vec![case_row], technician_rows, item_rows)?;
        Ok(details.pop())
    }

    async fn list(
        &self,
        query: &CaseFileQuery,
    ) -> Result<Vec<CaseFileDetails>, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;
        let query = *query;

        let (case_rows, technician_rows, item_rows) = conn
            .transaction(|conn| {
                async move {
                    let case_rows: Vec<CaseFileRow> = filtered_case_query(query)
                        .order(case_files::created_at.desc())
                        .load(conn)
                        .await?;

                    let technician_ids: Vec<Uuid> =
                        case_rows.iter().map(|row| row.technician_id).collect();
                    let case_ids: Vec<Uuid> = case_rows.iter().map(|row| row.id).collect();

                    let technician_rows = load_technicians(conn, technician_ids).await?;
                    let item_rows: Vec<EvidenceItemRow> = evidence_items::table
                        .filter(evidence_items::case_file_id.eq_any(case_ids))
                        .order(evidence_items::id)
                        .select(EvidenceItemRow::as_select())
                        .load(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>((case_rows, technician_rows, item_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_case_diesel_error)?;

        assemble_details(case_rows, technician_rows, item_rows)
    }

    async fn set_state(&self, case_file: &CaseFile) -> Result<bool, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let update = CaseFileReviewUpdate {
            state: case_file.state().as_str(),
            justification: case_file.justification(),
        };
        let updated = diesel::update(case_files::table.find(case_file.id()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_case_diesel_error)?;
        Ok(updated > 0)
    }

    async fn insert_item(&self, item: &EvidenceItem) -> Result<(), CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;
        let item_row = new_item_row(item);
        let case_file_id = item.case_file_id();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(evidence_items::table)
                    .values(&item_row)
                    .execute(conn)
                    .await?;
                diesel::update(case_files::table.find(case_file_id))
                    .set(&reopen_update())
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_case_diesel_error)
    }

    async fn update_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
        fields: &EvidenceItemFields,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let update = EvidenceItemUpdate {
            description: fields.description(),
            color: fields.color(),
            size: fields.size(),
            weight: fields.weight(),
            location: fields.location(),
        };

        let updated = conn
            .transaction(|conn| {
                async move {
                    let existing: Option<Uuid> = evidence_items::table
                        .filter(evidence_items::id.eq(item_id))
                        .filter(evidence_items::case_file_id.eq(case_file_id))
                        .select(evidence_items::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Ok(false);
                    }

                    diesel::update(evidence_items::table.find(item_id))
                        .set(&update)
                        .execute(conn)
                        .await?;
                    diesel::update(case_files::table.find(case_file_id))
                        .set(&reopen_update())
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_case_diesel_error)?;

        if updated {
            Ok(Some(EvidenceItem::restore(
                item_id,
                case_file_id,
                fields.clone(),
            )))
        } else {
            Ok(None)
        }
    }

    async fn delete_item(
        &self,
        case_file_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<EvidenceItem>, CaseFilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_case_pool_error)?;

        let deleted_row = conn
            .transaction(|conn| {
                async move {
                    let existing: Option<EvidenceItemRow> = evidence_items::table
                        .filter(evidence_items::id.eq(item_id))
                        .filter(evidence_items::case_file_id.eq(case_file_id))
                        .select(EvidenceItemRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(existing) = existing else {
                        return Ok(None);
                    };

                    diesel::delete(evidence_items::table.find(item_id))
                        .execute(conn)
                        .await?;
                    diesel::update(case_files::table.find(case_file_id))
                        .set(&reopen_update())
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(existing))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_case_diesel_error)?;

        deleted_row.map(row_to_item).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and assembly coverage; live queries are exercised
    //! against a real database in deployment environments.
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn case_row(state: &str, justification: Option<&str>) -> CaseFileRow {
        CaseFileRow {
            id: Uuid::new_v4(),
            technician_id: Uuid::new_v4(),
            state: state.to_owned(),
            justification: justification.map(str::to_owned),
            created_at: Utc::now(),
        }
    }

    fn item_row(case_file_id: Uuid) -> EvidenceItemRow {
        EvidenceItemRow {
            id: Uuid::new_v4(),
            case_file_id,
            description: "casquillo".to_owned(),
            color: "gris".to_owned(),
            size: "pequeño".to_owned(),
            weight: 0.5,
            location: "bodega A".to_owned(),
        }
    }

    #[rstest]
    fn pending_rows_convert() {
        let case = row_to_case_file(case_row("PENDIENTE", None)).expect("valid row");
        assert_eq!(case.state(), CaseState::Pending);
    }

    #[rstest]
    #[case("EN_REVISION", None)]
    #[case("PENDIENTE", Some("stray justification"))]
    #[case("RECHAZADO", None)]
    fn corrupt_case_rows_surface_query_errors(
        #[case] state: &str,
        #[case] justification: Option<&str>,
    ) {
        let err =
            row_to_case_file(case_row(state, justification)).expect_err("corrupt row must fail");
        assert!(matches!(err, CaseFilePersistenceError::Query { .. }));
    }

    #[rstest]
    fn assembly_groups_items_under_their_case() {
        let case = case_row("PENDIENTE", None);
        let case_id = case.id;
        let technician = (
            case.technician_id,
            "Ana".to_owned(),
            "ana@example.com".to_owned(),
        );
        let items = vec![item_row(case_id), item_row(case_id)];

        let details = assemble_details(vec![case], vec![technician], items)
            .expect("assembly succeeds");
        assert_eq!(details.len(), 1);
        let entry = <[_]>::first(&details).expect("one case file");
        assert_eq!(entry.items.len(), 2);
        let technician = entry.technician.as_ref().expect("technician joined");
        assert_eq!(technician.name, "Ana");
    }

    #[rstest]
    fn assembly_requires_the_technician_row() {
        let case = case_row("PENDIENTE", None);
        let err = assemble_details(vec![case], Vec::new(), Vec::new())
            .expect_err("missing technician must fail");
        assert!(matches!(err, CaseFilePersistenceError::Query { .. }));
    }

    #[rstest]
    fn reopen_update_clears_the_justification() {
        let update = reopen_update();
        assert_eq!(update.state, "PENDIENTE");
        assert!(update.justification.is_none());
    }
}
