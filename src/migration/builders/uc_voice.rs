use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::{create_parcel, create_profile, FeatureProfileBuilder, ParcelTarget};
use crate::manager::ConfigWriter;
use crate::migration::resolver::{resolve_associations, AssociableParcels};
use crate::models::{
    CallType, Diagnostics, FeatureProfileBuildReport, FeatureProfileCreationPayload, Parcel, ParcelType,
    ProfileType, TransformedParcel, TranslationProfileParcel, TranslationRuleParcel,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("translation profile '{0}' needs at least one translation rule")]
    MissingTranslationRule(String),
}

/// A translation profile with the rules it is composed of
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationProfile {
    tpp: TranslationProfileParcel,
    calling: Option<TranslationRuleParcel>,
    called: Option<TranslationRuleParcel>,
}

impl TranslationProfile {
    pub fn new(
        tpp: TranslationProfileParcel,
        calling: Option<TranslationRuleParcel>,
        called: Option<TranslationRuleParcel>,
    ) -> Result<Self, ValidationError> {
        if calling.is_none() && called.is_none() {
            return Err(ValidationError::MissingTranslationRule(tpp.name));
        }
        Ok(Self { tpp, calling, called })
    }

    pub fn name(&self) -> &str {
        &self.tpp.name
    }

    fn parcel_count(&self) -> usize {
        1 + usize::from(self.calling.is_some()) + usize::from(self.called.is_some())
    }
}

/// Reason recorded for a translation profile whose rules all failed
pub const NO_TRANSLATION_RULE_CREATED: &str = "no translation rule was created";

/// Builder for UC voice profiles: independent parcels, then translation profiles
/// with their rules, then parcels associated with either by name
pub struct UcVoiceFeatureProfileBuilder {
    profile: Option<FeatureProfileCreationPayload>,
    independent_parcels: Vec<Parcel>,
    rules: Vec<TranslationRuleParcel>,
    pending_profiles: Vec<TranslationProfileParcel>,
    translation_profiles: Vec<TranslationProfile>,
    parcels_with_associations: Vec<Parcel>,
    pushed_associable_parcels: AssociableParcels,
}

impl Default for UcVoiceFeatureProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UcVoiceFeatureProfileBuilder {
    pub fn new() -> Self {
        Self {
            profile: None,
            independent_parcels: Vec::new(),
            rules: Vec::new(),
            pending_profiles: Vec::new(),
            translation_profiles: Vec::new(),
            parcels_with_associations: Vec::new(),
            pushed_associable_parcels: AssociableParcels::new(),
        }
    }

    pub fn add_translation_profile(&mut self, translation_profile: TranslationProfile) {
        self.translation_profiles.push(translation_profile);
    }

    /// Pair every queued translation profile parcel with the rules its calling
    /// and called references name. Rules no profile names stay independent.
    fn pair_translation_profiles(&mut self, report: &mut FeatureProfileBuildReport) {
        let rules = std::mem::take(&mut self.rules);
        let mut paired: HashSet<String> = HashSet::new();

        for tpp in std::mem::take(&mut self.pending_profiles) {
            let mut rule_for = |call_type| {
                let name = tpp.rule_ref(call_type)?;
                let rule = rules.iter().find(|rule| rule.name == name)?;
                paired.insert(rule.name.clone());
                Some(rule.clone())
            };
            let calling = rule_for(CallType::Calling);
            let called = rule_for(CallType::Called);

            let name = tpp.name.clone();
            match TranslationProfile::new(tpp, calling, called) {
                Ok(tp) => self.add_translation_profile(tp),
                Err(e) => report.add_failed_parcel(&name, ParcelType::TranslationProfile, &e.to_string()),
            }
        }

        self.independent_parcels.extend(
            rules
                .into_iter()
                .filter(|rule| !paired.contains(&rule.name))
                .map(Parcel::TranslationRule),
        );
    }

    /// Create the rules, point the profile at them, then create the profile.
    /// A rule shared by several profiles is created once.
    async fn create_translation_profile(
        writer: &dyn ConfigWriter,
        report: &mut FeatureProfileBuildReport,
        created_rules: &mut HashMap<String, Uuid>,
        tp: &mut TranslationProfile,
    ) -> Option<Uuid> {
        tp.tpp.calling = None;
        tp.tpp.called = None;
        for (call_type, rule) in [(CallType::Called, &tp.called), (CallType::Calling, &tp.calling)] {
            let Some(rule) = rule else { continue };
            let rule_id = match created_rules.get(&rule.name) {
                Some(id) => Some(*id),
                None => {
                    let rule_parcel = Parcel::TranslationRule(rule.clone());
                    let id = create_parcel(writer, report, ParcelTarget::Profile, &rule_parcel).await;
                    if let Some(id) = id {
                        created_rules.insert(rule.name.clone(), id);
                    }
                    id
                }
            };
            if let Some(rule_id) = rule_id {
                tp.tpp.set_ref_by_call_type(rule_id, call_type);
            }
        }

        if tp.tpp.calling.is_none() && tp.tpp.called.is_none() {
            report.add_failed_parcel(tp.name(), ParcelType::TranslationProfile, NO_TRANSLATION_RULE_CREATED);
            return None;
        }
        let tpp = Parcel::TranslationProfile(tp.tpp.clone());
        create_parcel(writer, report, ParcelTarget::Profile, &tpp).await
    }
}

#[async_trait]
impl FeatureProfileBuilder for UcVoiceFeatureProfileBuilder {
    fn add_profile_name_and_description(&mut self, profile: FeatureProfileCreationPayload) {
        self.profile = Some(profile);
    }

    fn add_parcel(&mut self, parcel: TransformedParcel) {
        match parcel.parcel {
            Parcel::TranslationRule(rule) => self.rules.push(rule),
            Parcel::TranslationProfile(tpp) => self.pending_profiles.push(tpp),
            other => self.independent_parcels.push(other),
        }
    }

    fn add_parcel_with_associations(&mut self, parcel: TransformedParcel) {
        self.parcels_with_associations.push(parcel.parcel);
    }

    fn parcel_count(&self) -> usize {
        self.independent_parcels.len()
            + self.rules.len()
            + self.pending_profiles.len()
            + self.parcels_with_associations.len()
            + self.translation_profiles.iter().map(TranslationProfile::parcel_count).sum::<usize>()
    }

    async fn build(
        &mut self,
        writer: &dyn ConfigWriter,
        diagnostics: &mut Diagnostics,
    ) -> Result<FeatureProfileBuildReport> {
        let mut report = create_profile(writer, ProfileType::UcVoice, self.profile.as_ref()).await?;
        self.pair_translation_profiles(&mut report);

        for parcel in &self.independent_parcels {
            if let Some(id) = create_parcel(writer, &mut report, ParcelTarget::Profile, parcel).await {
                if parcel.parcel_type().is_associable() {
                    self.pushed_associable_parcels.insert(parcel.parcel_type(), parcel.name(), id);
                }
            }
        }

        let mut created_rules = HashMap::new();
        for tp in self.translation_profiles.iter_mut() {
            if let Some(id) = Self::create_translation_profile(writer, &mut report, &mut created_rules, tp).await {
                self.pushed_associable_parcels.insert(ParcelType::TranslationProfile, tp.name(), id);
            }
        }

        for parcel in self.parcels_with_associations.iter_mut() {
            if parcel.has_associations() {
                resolve_associations(parcel, &self.pushed_associable_parcels, diagnostics);
            }
            create_parcel(writer, &mut report, ParcelTarget::Profile, parcel).await;
        }

        Ok(report)
    }
}
