//! Schema registry: per-type converters from legacy templates and policies to parcels.

pub mod feature_template;
pub mod normalize;
pub mod policy;

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{FeatureTemplateInformation, Parcel, PolicyDefinition, PolicyList};

pub use normalize::{normalize_definition, to_payload, TemplateValue, TemplateValues};

/// Declared reasons a legacy item cannot be turned into a parcel
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("no converter registered for type '{0}'")]
    Unsupported(String),
    #[error("cannot convert: {0}")]
    CannotConvert(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Converts one family of legacy feature templates
pub trait TemplateConverter: Send + Sync {
    fn supported_template_types(&self) -> &'static [&'static str];

    fn create_parcel(&self, name: &str, description: &str, values: &TemplateValues) -> Result<Parcel, ConversionError>;
}

/// Converts one family of legacy policy lists
pub trait PolicyListConverter: Send + Sync {
    fn supported_list_types(&self) -> &'static [&'static str];

    fn convert(&self, list: &PolicyList) -> Result<Parcel, ConversionError>;
}

/// Converts one family of legacy policy definitions
pub trait PolicyDefinitionConverter: Send + Sync {
    fn supported_definition_types(&self) -> &'static [&'static str];

    fn convert(
        &self,
        definition: &PolicyDefinition,
        origin: Uuid,
        context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError>;
}

/// Lookups shared between policy conversions: converted lists by their legacy id
#[derive(Debug, Clone, Default)]
pub struct PolicyConvertContext {
    list_names: HashMap<Uuid, String>,
}

impl PolicyConvertContext {
    pub fn add_list(&mut self, list_id: Uuid, parcel_name: &str) {
        self.list_names.insert(list_id, parcel_name.to_string());
    }

    /// Name of the parcel a legacy list was converted into
    pub fn list_name(&self, list_id: &Uuid) -> Option<&str> {
        self.list_names.get(list_id).map(String::as_str)
    }
}

/// SchemaRegistry dispatches legacy items to their converters by type
pub struct SchemaRegistry {
    templates: Vec<Box<dyn TemplateConverter>>,
    policy_lists: Vec<Box<dyn PolicyListConverter>>,
    policy_definitions: Vec<Box<dyn PolicyDefinitionConverter>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for converter in feature_template::default_converters() {
            registry.register_template(converter);
        }
        for converter in policy::default_list_converters() {
            registry.register_policy_list(converter);
        }
        for converter in policy::default_definition_converters() {
            registry.register_policy_definition(converter);
        }
        registry
    }
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self {
            templates: Vec::new(),
            policy_lists: Vec::new(),
            policy_definitions: Vec::new(),
        }
    }

    pub fn register_template(&mut self, converter: Box<dyn TemplateConverter>) {
        self.templates.push(converter);
    }

    pub fn register_policy_list(&mut self, converter: Box<dyn PolicyListConverter>) {
        self.policy_lists.push(converter);
    }

    pub fn register_policy_definition(&mut self, converter: Box<dyn PolicyDefinitionConverter>) {
        self.policy_definitions.push(converter);
    }

    fn template_converter(&self, template_type: &str) -> Option<&dyn TemplateConverter> {
        self.templates
            .iter()
            .find(|c| c.supported_template_types().contains(&template_type))
            .map(|c| c.as_ref())
    }

    /// The supported-type allow-list
    pub fn supports_template(&self, template_type: &str) -> bool {
        self.template_converter(template_type).is_some()
    }

    pub fn create_parcel_from_template(&self, template: &FeatureTemplateInformation) -> Result<Parcel, ConversionError> {
        let converter = self
            .template_converter(&template.template_type)
            .ok_or_else(|| ConversionError::Unsupported(template.template_type.clone()))?;
        let values = normalize_definition(&template.definition);
        converter.create_parcel(&template.name, &template.description, &values)
    }

    pub fn convert_policy_list(&self, list: &PolicyList) -> Result<Parcel, ConversionError> {
        let converter = self
            .policy_lists
            .iter()
            .find(|c| c.supported_list_types().iter().any(|t| t.eq_ignore_ascii_case(&list.list_type)))
            .ok_or_else(|| ConversionError::Unsupported(list.list_type.clone()))?;
        converter.convert(list)
    }

    pub fn convert_policy_definition(
        &self,
        definition: &PolicyDefinition,
        context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError> {
        let converter = self
            .policy_definitions
            .iter()
            .find(|c| {
                c.supported_definition_types()
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&definition.definition_type))
            })
            .ok_or_else(|| ConversionError::Unsupported(definition.definition_type.clone()))?;
        converter.convert(definition, definition.definition_id, context)
    }
}
