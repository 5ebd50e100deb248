use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A UX2 option value: every leaf of a parcel payload is wrapped in one of these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "optionType", content = "value", rename_all = "camelCase")]
pub enum OptionValue {
    Global(Value),
    Variable(String),
    Default(Option<Value>),
}

impl OptionValue {
    pub fn global(value: impl Into<Value>) -> Self {
        OptionValue::Global(value.into())
    }

    /// The explicit "no value" sentinel
    pub fn none() -> Self {
        OptionValue::Default(None)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OptionValue::Default(None) | OptionValue::Default(Some(Value::Null)))
    }

    /// The global string value, if this is one
    pub fn as_global_str(&self) -> Option<&str> {
        match self {
            OptionValue::Global(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// A reference to another parcel: `{"refId": {"optionType": ..., "value": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefIdItem {
    #[serde(rename = "refId")]
    pub ref_id: OptionValue,
}

impl RefIdItem {
    /// A reference by parcel name or by id
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            ref_id: OptionValue::Global(Value::String(name.into())),
        }
    }

    pub fn none() -> Self {
        Self {
            ref_id: OptionValue::none(),
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.ref_id = OptionValue::Global(Value::String(value.into()));
    }

    pub fn clear(&mut self) {
        self.ref_id = OptionValue::none();
    }
}
