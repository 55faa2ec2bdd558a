//! Wire DTOs shared by the HTTP handlers.
//!
//! Response shapes and field names keep the legacy Spanish wire contract
//! (`expediente`, `indicios`, `tecnicoId`, …) while the domain stays
//! English-named. Conversions are one-way: DTOs never flow back into the
//! domain without validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CaseFile, CaseFileDetails, CaseState, EvidenceItem, EvidenceItemFields, Role, TechnicianRef,
    User,
};

use super::validation::{FieldFault, evidence_faults};

/// Registered account, without the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    /// Stable identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().as_str().to_owned(),
            name: user.name().to_owned(),
            role: user.role(),
        }
    }
}

/// Minimal technician identity embedded in case file reads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TechnicianDto {
    /// Technician's user id.
    pub id: Uuid,
    /// Technician's display name.
    pub name: String,
    /// Technician's email.
    pub email: String,
}

impl From<TechnicianRef> for TechnicianDto {
    fn from(technician: TechnicianRef) -> Self {
        Self {
            id: technician.id,
            name: technician.name,
            email: technician.email.as_str().to_owned(),
        }
    }
}

/// Evidence item as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItemDto {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning case file.
    pub expediente_id: Uuid,
    /// What the item is.
    pub descripcion: String,
    /// Observed colour.
    pub color: String,
    /// Observed size.
    pub tamano: String,
    /// Weight in kilograms.
    pub peso: f64,
    /// Where the item was found or is stored.
    pub ubicacion: String,
}

impl From<&EvidenceItem> for EvidenceItemDto {
    fn from(item: &EvidenceItem) -> Self {
        let fields = item.fields();
        Self {
            id: item.id(),
            expediente_id: item.case_file_id(),
            descripcion: fields.description().to_owned(),
            color: fields.color().to_owned(),
            tamano: fields.size().to_owned(),
            peso: fields.weight(),
            ubicacion: fields.location().to_owned(),
        }
    }
}

/// Case file as returned to clients.
///
/// Review endpoints return the bare record; listing and detail reads attach
/// the technician identity and the item list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFileDto {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning technician id.
    pub tecnico_id: Uuid,
    /// Creation timestamp.
    pub fecha: DateTime<Utc>,
    /// Review state.
    pub estado: CaseState,
    /// Rejection justification, if any.
    pub justificacion: Option<String>,
    /// Owning technician identity, when the read joins it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tecnico: Option<TechnicianDto>,
    /// Evidence items, when the read includes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicios: Option<Vec<EvidenceItemDto>>,
}

impl CaseFileDto {
    /// Bare record without joins, as returned by review actions.
    pub fn from_case(case_file: &CaseFile) -> Self {
        Self {
            id: case_file.id(),
            tecnico_id: case_file.technician_id(),
            fecha: case_file.created_at(),
            estado: case_file.state(),
            justificacion: case_file.justification().map(str::to_owned),
            tecnico: None,
            indicios: None,
        }
    }

    /// Full read with items and, when joined, the technician identity.
    pub fn from_details(details: CaseFileDetails) -> Self {
        let CaseFileDetails {
            case_file,
            technician,
            items,
        } = details;
        let mut dto = Self::from_case(&case_file);
        dto.tecnico = technician.map(TechnicianDto::from);
        dto.indicios = Some(items.iter().map(EvidenceItemDto::from).collect());
        dto
    }
}

/// Envelope for a single user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserEnvelope {
    /// The registered account.
    pub user: UserDto,
}

/// Envelope for the session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Envelope for a single case file.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaseFileEnvelope {
    /// The case file.
    pub expediente: CaseFileDto,
}

/// Envelope for case file listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaseFileListEnvelope {
    /// The matching case files, newest first.
    pub expedientes: Vec<CaseFileDto>,
}

/// Envelope for a single evidence item.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EvidenceItemEnvelope {
    /// The evidence item.
    pub indicio: EvidenceItemDto,
}

/// Evidence item fields as submitted by clients.
///
/// Every field is optional at the serde level so validation can report all
/// missing fields instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EvidenceItemPayload {
    /// What the item is.
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Observed colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Observed size.
    #[serde(default)]
    pub tamano: Option<String>,
    /// Weight in kilograms.
    #[serde(default)]
    pub peso: Option<f64>,
    /// Where the item was found or is stored.
    #[serde(default)]
    pub ubicacion: Option<String>,
}

impl EvidenceItemPayload {
    /// Validate the payload into domain fields, collecting every fault.
    pub(crate) fn into_fields(self) -> Result<EvidenceItemFields, Vec<FieldFault>> {
        let mut missing = Vec::new();
        let Self {
            descripcion,
            color,
            tamano,
            peso,
            ubicacion,
        } = self;

        if descripcion.is_none() {
            missing.push(FieldFault::missing("descripcion"));
        }
        if color.is_none() {
            missing.push(FieldFault::missing("color"));
        }
        if tamano.is_none() {
            missing.push(FieldFault::missing("tamano"));
        }
        if peso.is_none() {
            missing.push(FieldFault::missing("peso"));
        }
        if ubicacion.is_none() {
            missing.push(FieldFault::missing("ubicacion"));
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        EvidenceItemFields::new(
            descripcion.unwrap_or_default().as_str(),
            color.unwrap_or_default().as_str(),
            tamano.unwrap_or_default().as_str(),
            peso.unwrap_or_default(),
            ubicacion.unwrap_or_default().as_str(),
        )
        .map_err(|err| evidence_faults(&err))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{CaseFileDetails, Email, EvidenceItem};

    fn payload(value: Value) -> EvidenceItemPayload {
        serde_json::from_value(value).expect("payload deserialises")
    }

    #[rstest]
    fn complete_payloads_validate() {
        let fields = payload(json!({
            "descripcion": "casquillo",
            "color": "gris",
            "tamano": "pequeño",
            "peso": 0.5,
            "ubicacion": "bodega A",
        }))
        .into_fields()
        .expect("valid payload");
        assert_eq!(fields.description(), "casquillo");
        assert_eq!(fields.weight(), 0.5);
    }

    #[rstest]
    fn missing_fields_are_each_reported() {
        let faults = payload(json!({ "descripcion": "casquillo" }))
            .into_fields()
            .expect_err("incomplete payload");
        assert_eq!(faults.len(), 4);
    }

    #[rstest]
    fn empty_and_negative_values_are_reported() {
        let faults = payload(json!({
            "descripcion": "",
            "color": "gris",
            "tamano": "pequeño",
            "peso": -2.0,
            "ubicacion": "bodega A",
        }))
        .into_fields()
        .expect_err("invalid payload");
        assert_eq!(faults.len(), 2);
    }

    #[rstest]
    fn bare_case_files_omit_joined_fields() {
        let case = CaseFile::open(Uuid::new_v4());
        let value = serde_json::to_value(CaseFileDto::from_case(&case)).expect("serialises");
        assert_eq!(
            value.get("estado").and_then(Value::as_str),
            Some("PENDIENTE")
        );
        assert!(value.get("tecnico").is_none());
        assert!(value.get("indicios").is_none());
        assert!(value.get("tecnicoId").is_some());
    }

    #[rstest]
    fn detailed_case_files_embed_items_and_technician() {
        let case = CaseFile::open(Uuid::new_v4());
        let item = EvidenceItem::new(
            case.id(),
            EvidenceItemFields::new("casquillo", "gris", "pequeño", 0.5, "bodega A")
                .expect("valid fields"),
        );
        let details = CaseFileDetails {
            technician: Some(TechnicianRef {
                id: case.technician_id(),
                name: "Ana".to_owned(),
                email: Email::new("ana@example.com").expect("valid email"),
            }),
            case_file: case,
            items: vec![item],
        };

        let value = serde_json::to_value(CaseFileDto::from_details(details)).expect("serialises");
        let indicios = value
            .get("indicios")
            .and_then(Value::as_array)
            .expect("items embedded");
        assert_eq!(indicios.len(), 1);
        assert!(indicios[0].get("expedienteId").is_some());
        assert_eq!(
            value.pointer("/tecnico/name").and_then(Value::as_str),
            Some("Ana")
        );
    }
}
