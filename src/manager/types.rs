use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Manager API types ---

/// Most collection endpoints wrap their payload in `{"data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Response of a creation request. Parcels answer with `parcelId`, containers with `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedId {
    #[serde(alias = "parcelId", alias = "profileId")]
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub platform_version: String,
    #[serde(default)]
    pub user_mode: Option<String>,
}

/// The three policy families of the legacy model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Centralized,
    Localized,
    Security,
}

impl PolicyKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            PolicyKind::Centralized => "/template/policy/vsmart",
            PolicyKind::Localized => "/template/policy/vedge",
            PolicyKind::Security => "/template/policy/security",
        }
    }
}
