//! In-memory manager doubles and fixtures shared by the migration tests

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::manager::{ConfigReader, ConfigWriter, PolicyKind};
use crate::models::{
    ConfigGroupCreationPayload, DeviceTemplate, DeviceTemplateWithInfo, FeatureProfileCreationPayload,
    FeatureTemplateInformation, GeneralTemplate, GenericParcel, Parcel, ParcelType, PolicyDefinition, PolicyInfo,
    PolicyList, ProfileType, TemplateInformation, TransformedParcel, UX1Config,
};

// --- Fixtures ---

pub fn feature_template(name: &str, template_type: &str, definition: Value) -> FeatureTemplateInformation {
    FeatureTemplateInformation {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} template", name),
        template_type: template_type.to_string(),
        device_type: vec!["vedge-C8000V".to_string()],
        version: Some("15.0.0".to_string()),
        last_updated_by: "admin".to_string(),
        last_updated_on: 1_700_000_000_000,
        factory_default: false,
        devices_attached: 0,
        definition,
    }
}

pub fn vpn_template(name: &str, vpn_id: i64) -> FeatureTemplateInformation {
    feature_template(
        name,
        crate::models::CISCO_VPN,
        json!({
            "vpn-id": {"vipType": "constant", "vipValue": vpn_id.to_string(), "vipObjectType": "object"},
            "name": {"vipType": "constant", "vipValue": name, "vipObjectType": "object"}
        }),
    )
}

pub fn device_template(name: &str, general_templates: Vec<GeneralTemplate>) -> DeviceTemplateWithInfo {
    DeviceTemplateWithInfo {
        template_id: Uuid::new_v4(),
        factory_default: false,
        devices_attached: 1,
        last_updated_by: "admin".to_string(),
        last_updated_on: 1_700_000_000_000,
        template: DeviceTemplate {
            template_name: name.to_string(),
            template_description: format!("{} device template", name),
            general_templates,
            device_role: Some("sdwan-edge".to_string()),
            device_type: "vedge-C8000V".to_string(),
            security_policy_id: String::new(),
            policy_id: String::new(),
        },
    }
}

pub fn generic_parcel(parcel_type: ParcelType, name: &str) -> TransformedParcel {
    TransformedParcel::new(Uuid::new_v4(), Parcel::Generic(GenericParcel::new(parcel_type, name, "")))
}

// --- Writer ---

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateFeatureProfile { name: String, profile_type: ProfileType },
    DeleteFeatureProfile { id: Uuid, profile_type: ProfileType },
    CreateParcel { profile_id: Uuid, name: String, parcel_type: ParcelType },
    CreateVpnSubParcel { profile_id: Uuid, vpn_id: Uuid, name: String },
    CreateConfigGroup { name: String, profiles: Vec<Uuid> },
    DeleteConfigGroup { id: Uuid },
}

/// ConfigWriter that records every attempted call and fails on request
#[derive(Default)]
pub struct RecordingWriter {
    calls: Mutex<Vec<Call>>,
    created: Mutex<Vec<(String, Uuid, Value)>>,
    failing_names: HashSet<String>,
    failing_deletions: Mutex<HashSet<Uuid>>,
}

impl RecordingWriter {
    /// Fail the creation of any parcel with this name
    pub fn fail_parcel(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn fail_profile(self, name: &str) -> Self {
        self.fail_parcel(name)
    }

    pub fn fail_config_group(self, name: &str) -> Self {
        self.fail_parcel(name)
    }

    pub fn fail_deletion(&self, id: Uuid) {
        self.lock_deletions().insert(id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Payload of the successfully created item with this name
    pub fn created_payload(&self, name: &str) -> Option<Value> {
        let created = self.created.lock().ok()?;
        created.iter().find(|(n, _, _)| n == name).map(|(_, _, payload)| payload.clone())
    }

    pub fn created_id(&self, name: &str) -> Option<Uuid> {
        let created = self.created.lock().ok()?;
        created.iter().find(|(n, _, _)| n == name).map(|(_, id, _)| *id)
    }

    fn lock_deletions(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.failing_deletions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    fn create(&self, name: &str, payload: Value) -> Result<Uuid> {
        if self.failing_names.contains(name) {
            return Err(anyhow::anyhow!("Manager API error 400 Bad Request: {} rejected", name));
        }
        let id = Uuid::new_v4();
        self.created
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), id, payload));
        Ok(id)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        if self.lock_deletions().contains(&id) {
            return Err(anyhow::anyhow!("Manager API error 500 Internal Server Error: {} is in use", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigWriter for RecordingWriter {
    async fn create_feature_profile(
        &self,
        profile_type: ProfileType,
        payload: &FeatureProfileCreationPayload,
    ) -> Result<Uuid> {
        self.record(Call::CreateFeatureProfile {
            name: payload.name.clone(),
            profile_type,
        });
        self.create(&payload.name, json!(payload))
    }

    async fn delete_feature_profile(&self, profile_type: ProfileType, id: Uuid) -> Result<()> {
        self.record(Call::DeleteFeatureProfile { id, profile_type });
        self.delete(id)
    }

    async fn create_parcel(&self, _profile_type: ProfileType, profile_id: Uuid, parcel: &Parcel) -> Result<Uuid> {
        self.record(Call::CreateParcel {
            profile_id,
            name: parcel.name().to_string(),
            parcel_type: parcel.parcel_type(),
        });
        self.create(parcel.name(), parcel.payload())
    }

    async fn create_vpn_sub_parcel(
        &self,
        _profile_type: ProfileType,
        profile_id: Uuid,
        vpn_id: Uuid,
        parcel: &Parcel,
    ) -> Result<Uuid> {
        self.record(Call::CreateVpnSubParcel {
            profile_id,
            vpn_id,
            name: parcel.name().to_string(),
        });
        self.create(parcel.name(), parcel.payload())
    }

    async fn create_config_group(&self, payload: &ConfigGroupCreationPayload) -> Result<Uuid> {
        self.record(Call::CreateConfigGroup {
            name: payload.name.clone(),
            profiles: payload.profiles.iter().map(|p| p.id).collect(),
        });
        self.create(&payload.name, json!(payload))
    }

    async fn delete_config_group(&self, id: Uuid) -> Result<()> {
        self.record(Call::DeleteConfigGroup { id });
        self.delete(id)
    }
}

// --- Reader ---

/// ConfigReader serving a fixed legacy snapshot
#[derive(Default)]
pub struct FixtureReader {
    pub ux1: UX1Config,
    pub failing_list_types: HashSet<String>,
}

#[async_trait]
impl ConfigReader for FixtureReader {
    async fn platform_version(&self) -> Result<String> {
        Ok("20.12.1".to_string())
    }

    async fn feature_templates(&self) -> Result<Vec<FeatureTemplateInformation>> {
        Ok(self.ux1.templates.feature_templates.clone())
    }

    async fn device_template_infos(&self) -> Result<Vec<TemplateInformation>> {
        Ok(self
            .ux1
            .templates
            .device_templates
            .iter()
            .map(|dt| TemplateInformation {
                id: dt.template_id,
                name: dt.template.template_name.clone(),
                description: dt.template.template_description.clone(),
                device_type: dt.template.device_type.clone(),
                last_updated_by: dt.last_updated_by.clone(),
                last_updated_on: dt.last_updated_on,
                factory_default: dt.factory_default,
                devices_attached: dt.devices_attached,
            })
            .collect())
    }

    async fn device_template(&self, id: Uuid) -> Result<DeviceTemplate> {
        self.ux1
            .templates
            .device_templates
            .iter()
            .find(|dt| dt.template_id == id)
            .map(|dt| dt.template.clone())
            .ok_or_else(|| anyhow::anyhow!("Manager API error 404 Not Found: device template {}", id))
    }

    async fn policy_lists(&self, list_type: &str) -> Result<Vec<PolicyList>> {
        if self.failing_list_types.contains(list_type) {
            return Err(anyhow::anyhow!("Manager API error 500 Internal Server Error: {}", list_type));
        }
        Ok(self
            .ux1
            .policies
            .policy_lists
            .iter()
            .filter(|l| l.list_type.eq_ignore_ascii_case(list_type))
            .cloned()
            .collect())
    }

    async fn policy_definitions(&self, definition_type: &str) -> Result<Vec<PolicyDefinition>> {
        Ok(self
            .ux1
            .policies
            .policy_definitions
            .iter()
            .filter(|d| d.definition_type.eq_ignore_ascii_case(definition_type))
            .cloned()
            .collect())
    }

    async fn policies(&self, kind: PolicyKind) -> Result<Vec<PolicyInfo>> {
        let policies = &self.ux1.policies;
        Ok(match kind {
            PolicyKind::Centralized => policies.centralized_policies.clone(),
            PolicyKind::Localized => policies.localized_policies.clone(),
            PolicyKind::Security => policies.security_policies.clone(),
        })
    }
}
