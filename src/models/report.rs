use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parcel::{ParcelType, ProfileType};

// --- Diagnostics ---

/// A non-fatal problem found while transforming or pushing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Feature template type without a registered converter
    UnsupportedTemplateType {
        template_id: Uuid,
        name: String,
        template_type: String,
    },
    /// General template whose type belongs to no feature profile category
    UncategorizedTemplate {
        device_template: String,
        template_id: Uuid,
        template_type: String,
    },
    /// Converter declared it cannot convert the item
    ConversionFailed {
        origin: Uuid,
        name: String,
        item_type: String,
        reason: String,
    },
    /// Second parcel with an already transformed origin
    DuplicateParcel { origin: Uuid, name: String },
    /// Header subelement that points at no transformed parcel
    DanglingSubelement { owner: Uuid, subelement: Uuid },
    /// Reference name with no created parcel, degraded to no value
    UnresolvedReference {
        field: String,
        value: String,
        parcel_type: ParcelType,
        parcel_name: String,
    },
    /// Reference name shared by created parcels of several types, set to no value
    AmbiguousReference {
        field: String,
        value: String,
        parcel_type: ParcelType,
        parcel_name: String,
        candidates: Vec<ParcelType>,
    },
    /// Interface attached to VPNs of different kinds, left with its own type
    ConflictingVpnParents {
        interface: Uuid,
        vpn_types: Vec<ParcelType>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnsupportedTemplateType { template_id, name, template_type } => {
                write!(f, "feature template {} ({}) of unsupported type '{}' skipped", name, template_id, template_type)
            }
            Diagnostic::UncategorizedTemplate { device_template, template_id, template_type } => write!(
                f,
                "template {} of type '{}' in device template {} matches no feature profile",
                template_id, template_type, device_template
            ),
            Diagnostic::ConversionFailed { origin, name, item_type, reason } => {
                write!(f, "{} {} {} was not converted: {}", item_type, origin, name, reason)
            }
            Diagnostic::DuplicateParcel { origin, name } => {
                write!(f, "parcel {} ({}) transformed more than once, keeping the first", name, origin)
            }
            Diagnostic::DanglingSubelement { owner, subelement } => {
                write!(f, "subelement {} of {} has no transformed parcel, dropped", subelement, owner)
            }
            Diagnostic::UnresolvedReference { field, value, parcel_type, parcel_name } => write!(
                f,
                "unresolved reference in field '{}' with value '{}' for {} parcel '{}', set to no value",
                field, value, parcel_type, parcel_name
            ),
            Diagnostic::AmbiguousReference { field, value, parcel_type, parcel_name, candidates } => {
                let types: Vec<&str> = candidates.iter().map(ParcelType::as_str).collect();
                write!(
                    f,
                    "ambiguous reference in field '{}' with value '{}' for {} parcel '{}' matches {}, set to no value",
                    field,
                    value,
                    parcel_type,
                    parcel_name,
                    types.join(", ")
                )
            }
            Diagnostic::ConflictingVpnParents { interface, vpn_types } => {
                let types: Vec<&str> = vpn_types.iter().map(ParcelType::as_str).collect();
                write!(f, "interface {} sits under VPNs of several kinds ({}), not retagged", interface, types.join(", "))
            }
        }
    }
}

/// Diagnostics collects warnings as data; each one is also logged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// --- Creation state ---

/// Lifecycle of one remote creation: pending -> creating -> created | failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationState {
    Pending,
    Creating,
    Created(Uuid),
    Failed(String),
}

impl CreationState {
    pub fn begin(self) -> Self {
        debug_assert_eq!(self, CreationState::Pending);
        CreationState::Creating
    }

    pub fn finish(self, result: &anyhow::Result<Uuid>) -> Self {
        debug_assert_eq!(self, CreationState::Creating);
        match result {
            Ok(id) => CreationState::Created(*id),
            Err(e) => CreationState::Failed(format!("{:#}", e)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CreationState::Created(_) | CreationState::Failed(_))
    }
}

// --- Build reports ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedParcel {
    pub parcel_id: Uuid,
    pub parcel_name: String,
    pub parcel_type: ParcelType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedParcel {
    pub parcel_name: String,
    pub parcel_type: ParcelType,
    pub reason: String,
}

/// Outcome of building one feature profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfileBuildReport {
    pub profile_uuid: Uuid,
    pub profile_name: String,
    pub profile_type: ProfileType,
    #[serde(default)]
    pub created_parcels: Vec<CreatedParcel>,
    #[serde(default)]
    pub failed_parcels: Vec<FailedParcel>,
}

impl FeatureProfileBuildReport {
    pub fn new(profile_uuid: Uuid, profile_name: &str, profile_type: ProfileType) -> Self {
        Self {
            profile_uuid,
            profile_name: profile_name.to_string(),
            profile_type,
            created_parcels: Vec::new(),
            failed_parcels: Vec::new(),
        }
    }

    /// Record the terminal state of one parcel creation
    pub fn record(&mut self, parcel_name: &str, parcel_type: ParcelType, state: &CreationState) {
        match state {
            CreationState::Created(id) => self.created_parcels.push(CreatedParcel {
                parcel_id: *id,
                parcel_name: parcel_name.to_string(),
                parcel_type,
            }),
            CreationState::Failed(reason) => self.add_failed_parcel(parcel_name, parcel_type, reason),
            CreationState::Pending | CreationState::Creating => {
                debug_assert!(state.is_terminal(), "recording non-terminal state");
            }
        }
    }

    pub fn add_failed_parcel(&mut self, parcel_name: &str, parcel_type: ParcelType, reason: &str) {
        tracing::warn!("Failed to create {} parcel '{}': {}", parcel_type, parcel_name, reason);
        self.failed_parcels.push(FailedParcel {
            parcel_name: parcel_name.to_string(),
            parcel_type,
            reason: reason.to_string(),
        });
    }
}

/// A feature profile whose container could not be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedFeatureProfile {
    pub profile_name: String,
    pub profile_type: ProfileType,
    pub reason: String,
    pub parcels_not_created: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigGroupReport {
    pub name: String,
    /// None when the config group itself failed to be created
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(default)]
    pub feature_profiles: Vec<FeatureProfileBuildReport>,
    #[serde(default)]
    pub failed_feature_profiles: Vec<FailedFeatureProfile>,
}

/// UX2ConfigPushReport summarises everything one push created or failed to create
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UX2ConfigPushReport {
    #[serde(default)]
    pub config_groups: Vec<ConfigGroupReport>,
    /// Profiles pushed without a config group (policy objects)
    #[serde(default)]
    pub standalone_profiles: Vec<FeatureProfileBuildReport>,
    #[serde(default)]
    pub failed_standalone_profiles: Vec<FailedFeatureProfile>,
    #[serde(default)]
    pub success_rate_message: String,
    #[serde(default)]
    pub failed_parcels: Vec<FailedParcel>,
    #[serde(default)]
    pub warnings: Diagnostics,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl UX2ConfigPushReport {
    fn all_profiles(&self) -> impl Iterator<Item = &FeatureProfileBuildReport> {
        self.config_groups
            .iter()
            .flat_map(|cg| cg.feature_profiles.iter())
            .chain(self.standalone_profiles.iter())
    }

    fn all_failed_profiles(&self) -> impl Iterator<Item = &FailedFeatureProfile> {
        self.config_groups
            .iter()
            .flat_map(|cg| cg.failed_feature_profiles.iter())
            .chain(self.failed_standalone_profiles.iter())
    }

    pub fn created_parcel_count(&self) -> usize {
        self.all_profiles().map(|fp| fp.created_parcels.len()).sum()
    }

    /// Failed parcels plus parcels whose profile never got created
    pub fn failed_parcel_count(&self) -> usize {
        let failed: usize = self.all_profiles().map(|fp| fp.failed_parcels.len()).sum();
        let orphaned: usize = self.all_failed_profiles().map(|fp| fp.parcels_not_created).sum();
        failed + orphaned
    }

    pub fn set_success_rate(&mut self) {
        let created = self.created_parcel_count();
        let total = created + self.failed_parcel_count();
        let percent = if total == 0 { 100 } else { created * 100 / total };
        self.success_rate_message = format!(
            "{}/{} ({}%) parcels created successfully.",
            created, total, percent
        );
    }

    /// Close the report: timestamp, success rate and flat failure list
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        self.set_success_rate();
        self.set_flatlist_of_failed_parcels();
    }

    pub fn set_flatlist_of_failed_parcels(&mut self) {
        let failed: Vec<FailedParcel> = self
            .all_profiles()
            .flat_map(|fp| fp.failed_parcels.iter().cloned())
            .collect();
        self.failed_parcels = failed;
    }

    /// True when every profile, group and parcel was created
    pub fn is_complete(&self) -> bool {
        self.failed_parcel_count() == 0
            && self.all_failed_profiles().next().is_none()
            && self.config_groups.iter().all(|cg| cg.uuid.is_some())
    }
}

// --- Rollback ---

/// UX2ConfigRollback records what a push created, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UX2ConfigRollback {
    #[serde(default)]
    pub config_group_ids: Vec<Uuid>,
    #[serde(default)]
    pub feature_profile_ids: Vec<(Uuid, ProfileType)>,
    #[serde(default)]
    pub report: UX2ConfigPushReport,
}

impl UX2ConfigRollback {
    pub fn add_config_group(&mut self, config_group_id: Uuid) {
        self.config_group_ids.push(config_group_id);
    }

    pub fn add_feature_profile(&mut self, feature_profile_id: Uuid, profile_type: ProfileType) {
        self.feature_profile_ids.push((feature_profile_id, profile_type));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovedItem {
    ConfigGroup,
    FeatureProfile(ProfileType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedDeletion {
    pub id: Uuid,
    pub item: RemovedItem,
    pub reason: String,
}

/// Outcome of a rollback; partial rollbacks are visible through `failed`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackReport {
    #[serde(default)]
    pub deleted: Vec<(Uuid, RemovedItem)>,
    #[serde(default)]
    pub failed: Vec<FailedDeletion>,
}

impl RollbackReport {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_report(created: usize, failed: usize) -> FeatureProfileBuildReport {
        let mut report = FeatureProfileBuildReport::new(Uuid::new_v4(), "fp", ProfileType::System);
        for i in 0..created {
            report.record(&format!("ok{}", i), ParcelType::Banner, &CreationState::Created(Uuid::new_v4()));
        }
        for i in 0..failed {
            report.record(&format!("bad{}", i), ParcelType::Logging, &CreationState::Failed("boom".into()));
        }
        report
    }

    #[test]
    fn test_success_rate_and_flat_failures() {
        let mut report = UX2ConfigPushReport::default();
        report.config_groups.push(ConfigGroupReport {
            name: "cg".into(),
            uuid: Some(Uuid::new_v4()),
            failure: None,
            feature_profiles: vec![profile_report(3, 1)],
            failed_feature_profiles: Vec::new(),
        });
        report.standalone_profiles.push(profile_report(0, 0));
        report.set_success_rate();
        report.set_flatlist_of_failed_parcels();

        assert_eq!(report.success_rate_message, "3/4 (75%) parcels created successfully.");
        assert_eq!(report.failed_parcels.len(), 1);
        assert_eq!(report.failed_parcels[0].parcel_name, "bad0");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_failed_profile_counts_its_parcels() {
        let mut report = UX2ConfigPushReport::default();
        report.failed_standalone_profiles.push(FailedFeatureProfile {
            profile_name: "policy_objects".into(),
            profile_type: ProfileType::PolicyObject,
            reason: "HTTP 500".into(),
            parcels_not_created: 2,
        });
        report.set_success_rate();
        assert_eq!(report.success_rate_message, "0/2 (0%) parcels created successfully.");
    }

    #[test]
    fn test_empty_push_is_complete() {
        let mut report = UX2ConfigPushReport::default();
        report.set_success_rate();
        assert!(report.is_complete());
        assert_eq!(report.success_rate_message, "0/0 (100%) parcels created successfully.");
    }

    #[test]
    fn test_creation_state_transitions() {
        let state = CreationState::Pending.begin();
        assert_eq!(state, CreationState::Creating);
        let id = Uuid::new_v4();
        assert_eq!(state.clone().finish(&Ok(id)), CreationState::Created(id));
        let failed = state.finish(&Err(anyhow::anyhow!("HTTP 400")));
        assert_eq!(failed, CreationState::Failed("HTTP 400".into()));
        assert!(failed.is_terminal());
    }
}
