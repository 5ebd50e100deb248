use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{create_parcel, create_profile, FeatureProfileBuilder, ParcelTarget};
use crate::manager::ConfigWriter;
use crate::migration::resolver::{resolve_associations, AssociableParcels};
use crate::models::{
    Diagnostics, FeatureProfileBuildReport, FeatureProfileCreationPayload, ProfileType, TransformedParcel,
};

pub const NOT_ATTACHED_TO_VPN: &str = "not attached to a VPN";
pub const PARENT_VPN_NOT_CREATED: &str = "parent VPN was not created";

/// Builder for service and transport profiles, where interfaces live under VPNs
pub struct VpnFeatureProfileBuilder {
    profile_type: ProfileType,
    profile: Option<FeatureProfileCreationPayload>,
    parcels: Vec<TransformedParcel>,
    parcels_with_associations: Vec<TransformedParcel>,
}

impl VpnFeatureProfileBuilder {
    pub fn new(profile_type: ProfileType) -> Self {
        Self {
            profile_type,
            profile: None,
            parcels: Vec::new(),
            parcels_with_associations: Vec::new(),
        }
    }
}

#[async_trait]
impl FeatureProfileBuilder for VpnFeatureProfileBuilder {
    fn add_profile_name_and_description(&mut self, profile: FeatureProfileCreationPayload) {
        self.profile = Some(profile);
    }

    fn add_parcel(&mut self, parcel: TransformedParcel) {
        self.parcels.push(parcel);
    }

    /// VPNs and interfaces keep their place in the two passes; their references
    /// are resolved right before they are created
    fn add_parcel_with_associations(&mut self, parcel: TransformedParcel) {
        let parcel_type = parcel.parcel.parcel_type();
        if parcel_type.is_vpn() || parcel_type.is_vpn_interface() {
            self.parcels.push(parcel);
        } else {
            self.parcels_with_associations.push(parcel);
        }
    }

    fn parcel_count(&self) -> usize {
        self.parcels.len() + self.parcels_with_associations.len()
    }

    async fn build(
        &mut self,
        writer: &dyn ConfigWriter,
        diagnostics: &mut Diagnostics,
    ) -> Result<FeatureProfileBuildReport> {
        let mut report = create_profile(writer, self.profile_type, self.profile.as_ref()).await?;

        let (mut vpns, others): (Vec<TransformedParcel>, Vec<TransformedParcel>) =
            self.parcels.iter().cloned().partition(|p| p.parcel.parcel_type().is_vpn());

        // interface origin -> VPN origin
        let parent_of: HashMap<Uuid, Uuid> = vpns
            .iter()
            .flat_map(|vpn| vpn.header.subelements.iter().map(move |child| (*child, vpn.header.origin)))
            .collect();

        // parcels of this profile created so far, for by-name references
        let mut created = AssociableParcels::new();

        // Pass 1: VPNs
        let mut created_vpns: HashMap<Uuid, Uuid> = HashMap::new();
        for vpn in vpns.iter_mut() {
            if vpn.parcel.has_associations() {
                resolve_associations(&mut vpn.parcel, &created, diagnostics);
            }
            if let Some(id) = create_parcel(writer, &mut report, ParcelTarget::Profile, &vpn.parcel).await {
                created.insert(vpn.parcel.parcel_type(), vpn.parcel.name(), id);
                created_vpns.insert(vpn.header.origin, id);
            }
        }

        // Pass 2: everything else, interfaces under their VPN
        for mut transformed in others {
            let parcel_type = transformed.parcel.parcel_type();
            let target = if !parcel_type.is_vpn_interface() {
                ParcelTarget::Profile
            } else {
                match parent_of.get(&transformed.header.origin) {
                    None => {
                        report.add_failed_parcel(transformed.parcel.name(), parcel_type, NOT_ATTACHED_TO_VPN);
                        continue;
                    }
                    Some(vpn_origin) => match created_vpns.get(vpn_origin) {
                        Some(vpn_id) => ParcelTarget::Vpn(*vpn_id),
                        None => {
                            report.add_failed_parcel(transformed.parcel.name(), parcel_type, PARENT_VPN_NOT_CREATED);
                            continue;
                        }
                    },
                }
            };
            if transformed.parcel.has_associations() {
                resolve_associations(&mut transformed.parcel, &created, diagnostics);
            }
            if let Some(id) = create_parcel(writer, &mut report, target, &transformed.parcel).await {
                created.insert(parcel_type, transformed.parcel.name(), id);
            }
        }

        for transformed in self.parcels_with_associations.iter_mut() {
            resolve_associations(&mut transformed.parcel, &created, diagnostics);
            if let Some(id) = create_parcel(writer, &mut report, ParcelTarget::Profile, &transformed.parcel).await {
                created.insert(transformed.parcel.parcel_type(), transformed.parcel.name(), id);
            }
        }

        Ok(report)
    }
}
