use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Template type whose children stay attached when a device template is flattened
pub const CISCO_VPN: &str = "cisco_vpn";

/// Accept a legacy definition either as a JSON object or as a JSON-encoded string
fn string_or_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom),
        other => Ok(other),
    }
}

/// FeatureTemplateInformation is a leaf feature template with its legacy definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTemplateInformation {
    #[serde(rename = "templateId")]
    pub id: Uuid,
    #[serde(rename = "templateName")]
    pub name: String,
    #[serde(rename = "templateDescription", default)]
    pub description: String,
    #[serde(rename = "templateType")]
    pub template_type: String,
    #[serde(rename = "deviceType", default)]
    pub device_type: Vec<String>,
    #[serde(rename = "templateMinVersion", default)]
    pub version: Option<String>,
    #[serde(rename = "lastUpdatedBy", default)]
    pub last_updated_by: String,
    #[serde(rename = "lastUpdatedOn", default)]
    pub last_updated_on: i64,
    #[serde(rename = "factoryDefault", default)]
    pub factory_default: bool,
    #[serde(rename = "devicesAttached", default)]
    pub devices_attached: i32,
    #[serde(rename = "templateDefinition", default, deserialize_with = "string_or_object")]
    pub definition: Value,
}

/// TemplateInformation is the summary row of a device template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInformation {
    #[serde(rename = "templateId")]
    pub id: Uuid,
    #[serde(rename = "templateName")]
    pub name: String,
    #[serde(rename = "templateDescription", default)]
    pub description: String,
    #[serde(rename = "deviceType", default)]
    pub device_type: String,
    #[serde(rename = "lastUpdatedBy", default)]
    pub last_updated_by: String,
    #[serde(rename = "lastUpdatedOn", default)]
    pub last_updated_on: i64,
    #[serde(rename = "factoryDefault", default)]
    pub factory_default: bool,
    #[serde(rename = "devicesAttached", default)]
    pub devices_attached: i32,
}

/// GeneralTemplate is one slot of a device template, possibly with sub-templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralTemplate {
    #[serde(default)]
    pub name: String,
    pub template_id: Uuid,
    pub template_type: String,
    #[serde(default)]
    pub sub_templates: Vec<GeneralTemplate>,
}

impl GeneralTemplate {
    pub fn new(template_id: Uuid, template_type: &str) -> Self {
        Self {
            name: String::new(),
            template_id,
            template_type: template_type.to_string(),
            sub_templates: Vec::new(),
        }
    }

    pub fn with_sub_templates(mut self, sub_templates: Vec<GeneralTemplate>) -> Self {
        self.sub_templates = sub_templates;
        self
    }
}

/// DeviceTemplate as returned by the device template object endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemplate {
    pub template_name: String,
    #[serde(default)]
    pub template_description: String,
    #[serde(default)]
    pub general_templates: Vec<GeneralTemplate>,
    #[serde(default)]
    pub device_role: Option<String>,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub security_policy_id: String,
    #[serde(default)]
    pub policy_id: String,
}

/// DeviceTemplateWithInfo merges the template object with its summary metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemplateWithInfo {
    pub template_id: Uuid,
    #[serde(default)]
    pub factory_default: bool,
    #[serde(default)]
    pub devices_attached: i32,
    #[serde(default)]
    pub last_updated_by: String,
    #[serde(default)]
    pub last_updated_on: i64,
    #[serde(flatten)]
    pub template: DeviceTemplate,
}

impl DeviceTemplateWithInfo {
    pub fn from_merged(template: DeviceTemplate, info: &TemplateInformation) -> Self {
        Self {
            template_id: info.id,
            factory_default: info.factory_default,
            devices_attached: info.devices_attached,
            last_updated_by: info.last_updated_by.clone(),
            last_updated_on: info.last_updated_on,
            template,
        }
    }

    /// Flatten the general template tree. Children are emitted before their parent,
    /// except for cisco_vpn templates which keep their children attached.
    pub fn flattened_general_templates(&self) -> Vec<GeneralTemplate> {
        let mut result = Vec::new();
        for template in &self.template.general_templates {
            if !template.sub_templates.is_empty() && template.template_type != CISCO_VPN {
                result.extend(template.sub_templates.iter().cloned());
                let mut parent = template.clone();
                parent.sub_templates.clear();
                result.push(parent);
            } else {
                result.push(template.clone());
            }
        }
        result
    }
}

/// PolicyList is a legacy named list (prefixes, colors, applications, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyList {
    pub list_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<Map<String, Value>>,
    #[serde(default)]
    pub reference_count: i32,
    #[serde(default)]
    pub last_updated: i64,
}

/// PolicyDefinition is a legacy policy building block (ACL, IPS, URL filtering, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefinition {
    pub definition_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub definition_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: Value,
    #[serde(default)]
    pub last_updated: i64,
}

/// PolicyInfo is a centralized, localized or security policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInfo {
    pub policy_id: Uuid,
    pub policy_name: String,
    #[serde(default)]
    pub policy_description: String,
    #[serde(default)]
    pub policy_type: String,
    #[serde(default, deserialize_with = "string_or_object")]
    pub policy_definition: Value,
    #[serde(default)]
    pub is_policy_activated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UX1Policies {
    #[serde(default)]
    pub centralized_policies: Vec<PolicyInfo>,
    #[serde(default)]
    pub localized_policies: Vec<PolicyInfo>,
    #[serde(default)]
    pub security_policies: Vec<PolicyInfo>,
    #[serde(default)]
    pub policy_definitions: Vec<PolicyDefinition>,
    #[serde(default)]
    pub policy_lists: Vec<PolicyList>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UX1Templates {
    #[serde(default)]
    pub feature_templates: Vec<FeatureTemplateInformation>,
    #[serde(default)]
    pub device_templates: Vec<DeviceTemplateWithInfo>,
}

/// UX1Config is the full legacy configuration snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UX1Config {
    #[serde(default)]
    pub policies: UX1Policies,
    #[serde(default)]
    pub templates: UX1Templates,
}

impl UX1Config {
    pub fn feature_template(&self, id: &Uuid) -> Option<&FeatureTemplateInformation> {
        self.templates.feature_templates.iter().find(|t| &t.id == id)
    }
}
