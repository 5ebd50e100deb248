//! Narrow read/write seams the migration runs against

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::client::ManagerClient;
use super::types::PolicyKind;
use crate::models::{
    ConfigGroupCreationPayload, DeviceTemplate, FeatureProfileCreationPayload, FeatureTemplateInformation, Parcel,
    PolicyDefinition, PolicyInfo, PolicyList, ProfileType, TemplateInformation,
};

/// Read access to the legacy configuration
#[async_trait]
pub trait ConfigReader: Send + Sync {
    async fn platform_version(&self) -> Result<String>;
    async fn feature_templates(&self) -> Result<Vec<FeatureTemplateInformation>>;
    async fn device_template_infos(&self) -> Result<Vec<TemplateInformation>>;
    async fn device_template(&self, id: Uuid) -> Result<DeviceTemplate>;
    async fn policy_lists(&self, list_type: &str) -> Result<Vec<PolicyList>>;
    /// Definitions of one type, with their full definition bodies
    async fn policy_definitions(&self, definition_type: &str) -> Result<Vec<PolicyDefinition>>;
    async fn policies(&self, kind: PolicyKind) -> Result<Vec<PolicyInfo>>;
}

/// Create/delete access to the UX2 configuration
#[async_trait]
pub trait ConfigWriter: Send + Sync {
    async fn create_feature_profile(
        &self,
        profile_type: ProfileType,
        payload: &FeatureProfileCreationPayload,
    ) -> Result<Uuid>;
    async fn delete_feature_profile(&self, profile_type: ProfileType, id: Uuid) -> Result<()>;
    async fn create_parcel(&self, profile_type: ProfileType, profile_id: Uuid, parcel: &Parcel) -> Result<Uuid>;
    async fn create_vpn_sub_parcel(
        &self,
        profile_type: ProfileType,
        profile_id: Uuid,
        vpn_id: Uuid,
        parcel: &Parcel,
    ) -> Result<Uuid>;
    async fn create_config_group(&self, payload: &ConfigGroupCreationPayload) -> Result<Uuid>;
    async fn delete_config_group(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
impl ConfigReader for ManagerClient {
    async fn platform_version(&self) -> Result<String> {
        Ok(self.server_info().await?.platform_version)
    }

    async fn feature_templates(&self) -> Result<Vec<FeatureTemplateInformation>> {
        self.list_feature_templates().await
    }

    async fn device_template_infos(&self) -> Result<Vec<TemplateInformation>> {
        self.list_device_templates().await
    }

    async fn device_template(&self, id: Uuid) -> Result<DeviceTemplate> {
        self.get_device_template(id).await
    }

    async fn policy_lists(&self, list_type: &str) -> Result<Vec<PolicyList>> {
        self.list_policy_lists(list_type).await
    }

    async fn policy_definitions(&self, definition_type: &str) -> Result<Vec<PolicyDefinition>> {
        let summaries = self.list_policy_definitions(definition_type).await?;
        let mut definitions = Vec::with_capacity(summaries.len());
        for summary in summaries {
            definitions.push(self.get_policy_definition(definition_type, summary.definition_id).await?);
        }
        Ok(definitions)
    }

    async fn policies(&self, kind: PolicyKind) -> Result<Vec<PolicyInfo>> {
        self.list_policies(kind).await
    }
}

#[async_trait]
impl ConfigWriter for ManagerClient {
    async fn create_feature_profile(
        &self,
        profile_type: ProfileType,
        payload: &FeatureProfileCreationPayload,
    ) -> Result<Uuid> {
        ManagerClient::create_feature_profile(self, profile_type, payload).await
    }

    async fn delete_feature_profile(&self, profile_type: ProfileType, id: Uuid) -> Result<()> {
        ManagerClient::delete_feature_profile(self, profile_type, id).await
    }

    async fn create_parcel(&self, profile_type: ProfileType, profile_id: Uuid, parcel: &Parcel) -> Result<Uuid> {
        ManagerClient::create_parcel(self, profile_type, profile_id, parcel).await
    }

    async fn create_vpn_sub_parcel(
        &self,
        profile_type: ProfileType,
        profile_id: Uuid,
        vpn_id: Uuid,
        parcel: &Parcel,
    ) -> Result<Uuid> {
        ManagerClient::create_vpn_sub_parcel(self, profile_type, profile_id, vpn_id, parcel).await
    }

    async fn create_config_group(&self, payload: &ConfigGroupCreationPayload) -> Result<Uuid> {
        ManagerClient::create_config_group(self, payload).await
    }

    async fn delete_config_group(&self, id: Uuid) -> Result<()> {
        ManagerClient::delete_config_group(self, id).await
    }
}
