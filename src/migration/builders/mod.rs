//! Feature profile builders: create one profile and its parcels in dependency order

pub mod simple;
pub mod uc_voice;
pub mod vpn;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::manager::ConfigWriter;
use crate::models::{
    CreationState, Diagnostics, FeatureProfileBuildReport, FeatureProfileCreationPayload, Parcel, ProfileType,
    TransformedParcel,
};

pub use simple::SimpleFeatureProfileBuilder;
pub use uc_voice::{TranslationProfile, UcVoiceFeatureProfileBuilder, ValidationError};
pub use vpn::VpnFeatureProfileBuilder;

#[async_trait]
pub trait FeatureProfileBuilder: Send {
    fn add_profile_name_and_description(&mut self, profile: FeatureProfileCreationPayload);

    /// A parcel without by-name references
    fn add_parcel(&mut self, parcel: TransformedParcel);

    /// A parcel whose references are resolved against the parcels created before it
    fn add_parcel_with_associations(&mut self, parcel: TransformedParcel);

    /// Number of parcels queued for creation
    fn parcel_count(&self) -> usize;

    /// Create the profile, then its parcels. `Err` only when the profile itself
    /// could not be created; parcel failures land in the report.
    async fn build(
        &mut self,
        writer: &dyn ConfigWriter,
        diagnostics: &mut Diagnostics,
    ) -> Result<FeatureProfileBuildReport>;
}

pub fn create_builder(profile_type: ProfileType) -> Box<dyn FeatureProfileBuilder> {
    match profile_type {
        ProfileType::Service | ProfileType::Transport => Box::new(VpnFeatureProfileBuilder::new(profile_type)),
        ProfileType::UcVoice => Box::new(UcVoiceFeatureProfileBuilder::new()),
        ProfileType::System | ProfileType::Other | ProfileType::PolicyObject => {
            Box::new(SimpleFeatureProfileBuilder::new(profile_type))
        }
    }
}

/// Where a parcel is created: directly in the profile or under a created VPN
#[derive(Debug, Clone, Copy)]
pub(crate) enum ParcelTarget {
    Profile,
    Vpn(Uuid),
}

/// Create the feature profile container and an empty report for it
pub(crate) async fn create_profile(
    writer: &dyn ConfigWriter,
    profile_type: ProfileType,
    profile: Option<&FeatureProfileCreationPayload>,
) -> Result<FeatureProfileBuildReport> {
    let profile =
        profile.ok_or_else(|| anyhow::anyhow!("{} feature profile has no name and description", profile_type))?;
    let profile_uuid = writer.create_feature_profile(profile_type, profile).await?;
    tracing::info!("Created {} feature profile '{}' ({})", profile_type, profile.name, profile_uuid);
    Ok(FeatureProfileBuildReport::new(profile_uuid, &profile.name, profile_type))
}

/// Create one parcel and record the outcome; the id is returned on success
pub(crate) async fn create_parcel(
    writer: &dyn ConfigWriter,
    report: &mut FeatureProfileBuildReport,
    target: ParcelTarget,
    parcel: &Parcel,
) -> Option<Uuid> {
    let state = CreationState::Pending.begin();
    let result = match target {
        ParcelTarget::Profile => {
            writer
                .create_parcel(report.profile_type, report.profile_uuid, parcel)
                .await
        }
        ParcelTarget::Vpn(vpn_id) => {
            writer
                .create_vpn_sub_parcel(report.profile_type, report.profile_uuid, vpn_id, parcel)
                .await
        }
    };
    let state = state.finish(&result);
    report.record(parcel.name(), parcel.parcel_type(), &state);
    match state {
        CreationState::Created(id) => Some(id),
        _ => None,
    }
}
