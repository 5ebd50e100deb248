use std::collections::HashSet;
use uuid::Uuid;

use super::builders::create_builder;
use crate::manager::ConfigWriter;
use crate::models::{
    ConfigGroupReport, CreationState, Diagnostics, FailedFeatureProfile, FeatureProfileBuildReport, ProfileId,
    ProfileType, TransformedFeatureProfile, UX2Config, UX2ConfigRollback,
};

/// Returned by a progress callback to stop the push
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("push cancelled")]
pub struct Cancelled;

/// A push stopped by cancellation; carries what had been created so far
#[derive(Debug, thiserror::Error)]
#[error(
    "push aborted after creating {} config groups and {} feature profiles",
    .rollback.config_group_ids.len(),
    .rollback.feature_profile_ids.len()
)]
pub struct PushAborted {
    pub rollback: UX2ConfigRollback,
}

fn aborted(mut rollback: UX2ConfigRollback) -> PushAborted {
    rollback.report.finish();
    tracing::warn!("Push cancelled: {}", rollback.report.success_rate_message);
    PushAborted { rollback }
}

/// UX2ConfigPusher creates a transformed graph on the manager, feature profiles
/// before the config groups that reference them
pub struct UX2ConfigPusher<'a> {
    writer: &'a dyn ConfigWriter,
    ux2: UX2Config,
    rollback: UX2ConfigRollback,
}

impl<'a> UX2ConfigPusher<'a> {
    pub fn new(writer: &'a dyn ConfigWriter, ux2: UX2Config) -> Self {
        let mut rollback = UX2ConfigRollback::default();
        rollback.report.warnings = ux2.diagnostics.clone();
        rollback.report.started_at = Some(chrono::Utc::now());
        Self { writer, ux2, rollback }
    }

    /// Profiles no config group points at
    fn standalone_profiles(&self) -> Vec<&TransformedFeatureProfile> {
        let grouped: HashSet<Uuid> = self
            .ux2
            .config_groups
            .iter()
            .flat_map(|cg| cg.header.subelements.iter().copied())
            .collect();
        self.ux2
            .feature_profiles
            .iter()
            .filter(|fp| !grouped.contains(&fp.header.origin))
            .collect()
    }

    async fn build_profile(
        writer: &dyn ConfigWriter,
        ux2: &UX2Config,
        profile: &TransformedFeatureProfile,
        warnings: &mut Diagnostics,
    ) -> Result<FeatureProfileBuildReport, FailedFeatureProfile> {
        let name = &profile.feature_profile.name;
        let Some(profile_type) = profile.profile_type() else {
            return Err(FailedFeatureProfile {
                profile_name: name.clone(),
                profile_type: ProfileType::Other,
                reason: "header does not describe a feature profile".to_string(),
                parcels_not_created: profile.header.subelements.len(),
            });
        };

        let mut builder = create_builder(profile_type);
        builder.add_profile_name_and_description(profile.feature_profile.clone());
        for origin in &profile.header.subelements {
            let Some(parcel) = ux2.parcel(origin) else { continue };
            if parcel.parcel.has_associations() {
                builder.add_parcel_with_associations(parcel.clone());
            } else {
                builder.add_parcel(parcel.clone());
            }
        }

        builder.build(writer, warnings).await.map_err(|e| {
            tracing::warn!("Failed to create {} feature profile '{}': {:#}", profile_type, name, e);
            FailedFeatureProfile {
                profile_name: name.clone(),
                profile_type,
                reason: format!("{:#}", e),
                parcels_not_created: builder.parcel_count(),
            }
        })
    }

    /// Push everything. `progress` is called after each feature profile and each
    /// config group; returning `Err(Cancelled)` stops the push.
    pub async fn push<F>(self, mut progress: F) -> Result<UX2ConfigRollback, PushAborted>
    where
        F: FnMut(&str, usize, usize) -> Result<(), Cancelled> + Send,
    {
        let standalone: Vec<TransformedFeatureProfile> = self.standalone_profiles().into_iter().cloned().collect();
        let total = self.ux2.config_groups.len() + self.ux2.feature_profiles.len();
        let mut done = 0;

        let Self { writer, ux2, mut rollback } = self;
        tracing::info!(
            "Pushing {} config groups and {} feature profiles",
            ux2.config_groups.len(),
            ux2.feature_profiles.len()
        );

        for group in &ux2.config_groups {
            let mut group_report = ConfigGroupReport {
                name: group.config_group.name.clone(),
                uuid: None,
                failure: None,
                feature_profiles: Vec::new(),
                failed_feature_profiles: Vec::new(),
            };
            let mut profile_ids = Vec::new();

            for origin in &group.header.subelements {
                let Some(profile) = ux2.feature_profile(origin) else { continue };
                match Self::build_profile(writer, &ux2, profile, &mut rollback.report.warnings).await {
                    Ok(report) => {
                        rollback.add_feature_profile(report.profile_uuid, report.profile_type);
                        profile_ids.push(ProfileId { id: report.profile_uuid });
                        group_report.feature_profiles.push(report);
                    }
                    Err(failed) => group_report.failed_feature_profiles.push(failed),
                }
                done += 1;
                if progress(&format!("Created feature profile {}", profile.feature_profile.name), done, total).is_err() {
                    rollback.report.config_groups.push(group_report);
                    return Err(aborted(rollback));
                }
            }

            let mut payload = group.config_group.clone();
            payload.profiles = profile_ids;
            let state = CreationState::Pending.begin();
            let result = writer.create_config_group(&payload).await;
            match state.finish(&result) {
                CreationState::Created(id) => {
                    tracing::info!("Created config group '{}' ({})", payload.name, id);
                    rollback.add_config_group(id);
                    group_report.uuid = Some(id);
                }
                CreationState::Failed(reason) => {
                    tracing::warn!("Failed to create config group '{}': {}", payload.name, reason);
                    group_report.failure = Some(reason);
                }
                CreationState::Pending | CreationState::Creating => {}
            }
            rollback.report.config_groups.push(group_report);

            done += 1;
            if progress(&format!("Created config group {}", payload.name), done, total).is_err() {
                return Err(aborted(rollback));
            }
        }

        for profile in &standalone {
            match Self::build_profile(writer, &ux2, profile, &mut rollback.report.warnings).await {
                Ok(report) => {
                    rollback.add_feature_profile(report.profile_uuid, report.profile_type);
                    rollback.report.standalone_profiles.push(report);
                }
                Err(failed) => rollback.report.failed_standalone_profiles.push(failed),
            }
            done += 1;
            if progress(&format!("Created feature profile {}", profile.feature_profile.name), done, total).is_err() {
                return Err(aborted(rollback));
            }
        }

        rollback.report.finish();
        tracing::info!("{}", rollback.report.success_rate_message);
        Ok(rollback)
    }
}
