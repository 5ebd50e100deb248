use anyhow::Result;
use async_trait::async_trait;

use super::{create_parcel, create_profile, FeatureProfileBuilder, ParcelTarget};
use crate::manager::ConfigWriter;
use crate::migration::resolver::{resolve_associations, AssociableParcels};
use crate::models::{
    Diagnostics, FeatureProfileBuildReport, FeatureProfileCreationPayload, Parcel, ProfileType, TransformedParcel,
};

/// Builder for profiles without nesting: system, other and policy objects
pub struct SimpleFeatureProfileBuilder {
    profile_type: ProfileType,
    profile: Option<FeatureProfileCreationPayload>,
    independent_parcels: Vec<Parcel>,
    parcels_with_associations: Vec<Parcel>,
    pushed_associable_parcels: AssociableParcels,
}

impl SimpleFeatureProfileBuilder {
    pub fn new(profile_type: ProfileType) -> Self {
        Self {
            profile_type,
            profile: None,
            independent_parcels: Vec::new(),
            parcels_with_associations: Vec::new(),
            pushed_associable_parcels: AssociableParcels::new(),
        }
    }
}

#[async_trait]
impl FeatureProfileBuilder for SimpleFeatureProfileBuilder {
    fn add_profile_name_and_description(&mut self, profile: FeatureProfileCreationPayload) {
        self.profile = Some(profile);
    }

    fn add_parcel(&mut self, parcel: TransformedParcel) {
        self.independent_parcels.push(parcel.parcel);
    }

    fn add_parcel_with_associations(&mut self, parcel: TransformedParcel) {
        self.parcels_with_associations.push(parcel.parcel);
    }

    fn parcel_count(&self) -> usize {
        self.independent_parcels.len() + self.parcels_with_associations.len()
    }

    async fn build(
        &mut self,
        writer: &dyn ConfigWriter,
        diagnostics: &mut Diagnostics,
    ) -> Result<FeatureProfileBuildReport> {
        let mut report = create_profile(writer, self.profile_type, self.profile.as_ref()).await?;

        for parcel in &self.independent_parcels {
            let id = create_parcel(writer, &mut report, ParcelTarget::Profile, parcel).await;
            if let Some(id) = id {
                if parcel.parcel_type().is_associable() {
                    self.pushed_associable_parcels.insert(parcel.parcel_type(), parcel.name(), id);
                }
            }
        }

        for parcel in self.parcels_with_associations.iter_mut() {
            resolve_associations(parcel, &self.pushed_associable_parcels, diagnostics);
            create_parcel(writer, &mut report, ParcelTarget::Profile, parcel).await;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::testing::{generic_parcel, RecordingWriter};
    use crate::models::{Diagnostic, GenericParcel, ParcelType, RefIdItem};
    use uuid::Uuid;

    fn policy_profile() -> SimpleFeatureProfileBuilder {
        let mut builder = SimpleFeatureProfileBuilder::new(ProfileType::PolicyObject);
        builder.add_profile_name_and_description(FeatureProfileCreationPayload {
            name: "policy_objects".into(),
            description: String::new(),
        });
        builder
    }

    fn url_filtering(list_name: &str) -> TransformedParcel {
        let mut parcel = GenericParcel::new(ParcelType::UrlFiltering, "url_filter", "");
        parcel.references.insert("urlAllowedList".into(), RefIdItem::named(list_name));
        TransformedParcel::new(Uuid::new_v4(), Parcel::Generic(parcel))
    }

    #[tokio::test]
    async fn test_dependent_parcel_gets_id_of_independent_one() {
        let writer = RecordingWriter::default();
        let mut builder = policy_profile();
        builder.add_parcel(generic_parcel(ParcelType::SecurityUrlList, "allowed"));
        builder.add_parcel_with_associations(url_filtering("allowed"));

        let mut diagnostics = Diagnostics::new();
        let report = builder.build(&writer, &mut diagnostics).await.unwrap();

        assert_eq!(report.created_parcels.len(), 2);
        assert!(report.failed_parcels.is_empty());
        assert!(diagnostics.is_empty());

        let list_id = report.created_parcels[0].parcel_id;
        let payload = writer.created_payload("url_filter").unwrap();
        assert_eq!(payload["data"]["urlAllowedList"]["refId"]["value"], list_id.to_string());
    }

    #[tokio::test]
    async fn test_same_name_in_other_list_type_is_not_linked() {
        let writer = RecordingWriter::default();
        let mut builder = policy_profile();
        builder.add_parcel(generic_parcel(ParcelType::SecurityUrlList, "corp"));
        builder.add_parcel(generic_parcel(ParcelType::DataPrefix, "corp"));
        builder.add_parcel_with_associations(url_filtering("corp"));

        let mut diagnostics = Diagnostics::new();
        let report = builder.build(&writer, &mut diagnostics).await.unwrap();

        let url_list = report
            .created_parcels
            .iter()
            .find(|p| p.parcel_type == ParcelType::SecurityUrlList)
            .unwrap()
            .parcel_id;
        let payload = writer.created_payload("url_filter").unwrap();
        assert_eq!(payload["data"]["urlAllowedList"]["refId"]["value"], url_list.to_string());
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_reference_still_creates_the_parcel() {
        let writer = RecordingWriter::default();
        let mut builder = policy_profile();
        builder.add_parcel_with_associations(url_filtering("nowhere"));

        let mut diagnostics = Diagnostics::new();
        let report = builder.build(&writer, &mut diagnostics).await.unwrap();

        assert_eq!(report.created_parcels.len(), 1);
        let payload = writer.created_payload("url_filter").unwrap();
        assert_eq!(payload["data"]["urlAllowedList"]["refId"]["optionType"], "default");
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::UnresolvedReference { value, .. }) if value == "nowhere"
        ));
    }

    #[tokio::test]
    async fn test_failed_profile_creates_no_parcels() {
        let writer = RecordingWriter::default().fail_profile("policy_objects");
        let mut builder = policy_profile();
        builder.add_parcel(generic_parcel(ParcelType::Color, "colors"));

        assert!(builder.build(&writer, &mut Diagnostics::new()).await.is_err());
        assert_eq!(builder.parcel_count(), 1);
        assert!(writer.created_payload("colors").is_none());
    }
}
