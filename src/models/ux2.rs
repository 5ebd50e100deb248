use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::parcel::{Parcel, ParcelType, ProfileType};
use super::report::Diagnostics;

/// Discriminator of a transformed entity. Parcel payloads do not carry their own type,
/// so the header is what selects the endpoint at push time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderType {
    Profile(ProfileType),
    Parcel(ParcelType),
    Group(GroupType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    ConfigGroup,
    PolicyGroup,
    TopologyGroup,
}

/// TransformHeader carries the lineage of a UX2 entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformHeader {
    #[serde(rename = "type")]
    pub header_type: HeaderType,
    /// UUID of the UX1 source, or a fresh one for synthetic containers
    pub origin: Uuid,
    #[serde(default)]
    pub subelements: BTreeSet<Uuid>,
}

impl TransformHeader {
    pub fn new(header_type: HeaderType, origin: Uuid) -> Self {
        Self {
            header_type,
            origin,
            subelements: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileId {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigGroupCreationPayload {
    pub name: String,
    pub description: String,
    pub solution: String,
    #[serde(default)]
    pub profiles: Vec<ProfileId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfileCreationPayload {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyGroup {
    pub name: String,
    pub description: String,
    pub solution: String,
    #[serde(default)]
    pub profiles: Vec<ProfileId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedTopologyGroup {
    pub header: TransformHeader,
    pub topology_group: TopologyGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedConfigGroup {
    pub header: TransformHeader,
    pub config_group: ConfigGroupCreationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedFeatureProfile {
    pub header: TransformHeader,
    pub feature_profile: FeatureProfileCreationPayload,
}

impl TransformedFeatureProfile {
    pub fn new(profile_type: ProfileType, origin: Uuid, name: String, description: &str) -> Self {
        Self {
            header: TransformHeader::new(HeaderType::Profile(profile_type), origin),
            feature_profile: FeatureProfileCreationPayload {
                name,
                description: description.to_string(),
            },
        }
    }

    pub fn profile_type(&self) -> Option<ProfileType> {
        match self.header.header_type {
            HeaderType::Profile(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedParcel {
    pub header: TransformHeader,
    pub parcel: Parcel,
}

impl TransformedParcel {
    pub fn new(origin: Uuid, parcel: Parcel) -> Self {
        Self {
            header: TransformHeader::new(HeaderType::Parcel(parcel.parcel_type()), origin),
            parcel,
        }
    }

    pub fn with_subelements(mut self, subelements: BTreeSet<Uuid>) -> Self {
        self.header.subelements = subelements;
        self
    }
}

/// UX2Config is the full transformed configuration graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UX2Config {
    #[serde(default)]
    pub topology_groups: Vec<TransformedTopologyGroup>,
    #[serde(default, rename = "configurationGroups", alias = "configGroups")]
    pub config_groups: Vec<TransformedConfigGroup>,
    #[serde(default)]
    pub policy_groups: Vec<TransformedConfigGroup>,
    #[serde(default)]
    pub feature_profiles: Vec<TransformedFeatureProfile>,
    #[serde(default)]
    pub profile_parcels: Vec<TransformedParcel>,
    /// Items skipped or degraded while transforming
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl UX2Config {
    pub fn feature_profile(&self, origin: &Uuid) -> Option<&TransformedFeatureProfile> {
        self.feature_profiles.iter().find(|fp| &fp.header.origin == origin)
    }

    pub fn parcel(&self, origin: &Uuid) -> Option<&TransformedParcel> {
        self.profile_parcels.iter().find(|p| &p.header.origin == origin)
    }
}
