use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::models::OptionValue;
use crate::utils::{convert_varname, to_camel_case};

/// Normalized legacy template values, keyed by the legacy (kebab-case) field names
pub type TemplateValues = BTreeMap<String, TemplateValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Leaf(OptionValue),
    Tree(TemplateValues),
    List(Vec<TemplateValues>),
}

impl TemplateValue {
    pub fn as_leaf(&self) -> Option<&OptionValue> {
        match self {
            TemplateValue::Leaf(v) => Some(v),
            _ => None,
        }
    }
}

/// Look up a nested value, e.g. `get_path(values, &["ip", "address"])`
pub fn get_path<'a>(values: &'a TemplateValues, path: &[&str]) -> Option<&'a TemplateValue> {
    let (first, rest) = path.split_first()?;
    let value = values.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        TemplateValue::Tree(children) => get_path(children, rest),
        _ => None,
    }
}

fn is_vip_key(key: &str) -> bool {
    key.starts_with("vip")
}

/// Legacy constants arrive as strings; booleans and plain integers become typed
fn coerce(value: &Value) -> Value {
    match value {
        Value::String(s) if s == "true" => Value::Bool(true),
        Value::String(s) if s == "false" => Value::Bool(false),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) && (s == "0" || !s.starts_with('0')) => {
            s.parse::<i64>().map(Value::from).unwrap_or_else(|_| value.clone())
        }
        other => other.clone(),
    }
}

fn normalize_children(node: &Map<String, Value>) -> TemplateValues {
    let mut out = TemplateValues::new();
    for (key, child) in node {
        if is_vip_key(key) {
            continue;
        }
        if let Some(value) = normalize_node(child) {
            out.insert(key.clone(), value);
        }
    }
    out
}

fn normalize_node(node: &Value) -> Option<TemplateValue> {
    let obj = node.as_object()?;
    let Some(vip_type) = obj.get("vipType").and_then(Value::as_str) else {
        let children = normalize_children(obj);
        return (!children.is_empty()).then_some(TemplateValue::Tree(children));
    };

    let object_type = obj.get("vipObjectType").and_then(Value::as_str).unwrap_or("object");
    let raw = obj.get("vipValue").cloned().unwrap_or(Value::Null);

    match vip_type {
        "ignore" => None,
        "variable" | "variableName" => {
            let name = obj.get("vipVariableName").and_then(Value::as_str).unwrap_or("");
            if name.is_empty() {
                return None;
            }
            Some(TemplateValue::Leaf(OptionValue::Variable(convert_varname(name))))
        }
        "constant" => match (object_type, raw) {
            ("tree", Value::Array(items)) => {
                let items: Vec<TemplateValues> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(normalize_children)
                    .filter(|item| !item.is_empty())
                    .collect();
                (!items.is_empty()).then_some(TemplateValue::List(items))
            }
            ("node-only", _) => {
                let children = normalize_children(obj);
                if children.is_empty() {
                    Some(TemplateValue::Leaf(OptionValue::global(true)))
                } else {
                    Some(TemplateValue::Tree(children))
                }
            }
            ("list", Value::Array(items)) => {
                let items: Vec<Value> = items.iter().map(coerce).collect();
                Some(TemplateValue::Leaf(OptionValue::Global(Value::Array(items))))
            }
            (_, Value::String(s)) if s.is_empty() => None,
            (_, Value::Null) => None,
            (_, raw) => Some(TemplateValue::Leaf(OptionValue::Global(coerce(&raw)))),
        },
        "notIgnore" => Some(TemplateValue::Leaf(OptionValue::Default(Some(coerce(&raw))))),
        other => {
            tracing::debug!("Unknown vipType '{}' dropped", other);
            None
        }
    }
}

/// Normalize a legacy definition blob: constants become global values, variables become
/// `{{name}}` placeholders, ignored fields disappear
pub fn normalize_definition(definition: &Value) -> TemplateValues {
    match definition.as_object() {
        Some(obj) => normalize_children(obj),
        None => TemplateValues::new(),
    }
}

/// Render normalized values as a UX2 `data` object with camelCase keys
pub fn to_payload(values: &TemplateValues) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in values {
        let rendered = match value {
            TemplateValue::Leaf(v) => json!(v),
            TemplateValue::Tree(children) => Value::Object(to_payload(children)),
            TemplateValue::List(items) => Value::Array(items.iter().map(|i| Value::Object(to_payload(i))).collect()),
        };
        out.insert(to_camel_case(key), rendered);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface_definition() -> Value {
        json!({
            "if-name": {"vipValue": "GigabitEthernet2", "vipObjectType": "object", "vipType": "constant", "vipVariableName": ""},
            "description": {"vipValue": "", "vipObjectType": "object", "vipType": "ignore"},
            "ip": {
                "address": {"vipValue": "10.1.17.15/24", "vipObjectType": "object", "vipType": "constant"},
                "secondary-address": {"vipValue": [], "vipObjectType": "tree", "vipType": "ignore", "vipPrimaryKey": ["address"]}
            },
            "shutdown": {"vipValue": "false", "vipObjectType": "object", "vipType": "constant"},
            "mtu": {"vipValue": "1500", "vipObjectType": "object", "vipType": "notIgnore"},
            "tracker": {"vipValue": "", "vipObjectType": "list", "vipType": "variableName", "vipVariableName": "vpn_if_tracker"},
            "nat": {"vipValue": "", "vipObjectType": "node-only", "vipType": "ignore",
                    "udp-timeout": {"vipValue": "1", "vipObjectType": "object", "vipType": "constant"}},
            "dns": {"vipValue": [
                {"dns-addr": {"vipValue": "8.8.8.8", "vipObjectType": "object", "vipType": "constant"}}
            ], "vipObjectType": "tree", "vipType": "constant", "vipPrimaryKey": ["dns-addr"]}
        })
    }

    #[test]
    fn test_normalize_definition() {
        let values = normalize_definition(&interface_definition());

        assert_eq!(
            values.get("if-name"),
            Some(&TemplateValue::Leaf(OptionValue::global("GigabitEthernet2")))
        );
        assert!(values.get("description").is_none());
        assert!(values.get("nat").is_none());
        assert_eq!(
            get_path(&values, &["ip", "address"]).and_then(TemplateValue::as_leaf),
            Some(&OptionValue::global("10.1.17.15/24"))
        );
        assert!(get_path(&values, &["ip", "secondary-address"]).is_none());
        assert_eq!(values.get("shutdown"), Some(&TemplateValue::Leaf(OptionValue::global(false))));
        assert_eq!(
            values.get("mtu"),
            Some(&TemplateValue::Leaf(OptionValue::Default(Some(json!(1500)))))
        );
        assert_eq!(
            values.get("tracker"),
            Some(&TemplateValue::Leaf(OptionValue::Variable("{{vpn_if_tracker}}".into())))
        );
        match values.get("dns") {
            Some(TemplateValue::List(items)) => assert_eq!(items.len(), 1),
            other => panic!("unexpected dns value {:?}", other),
        }
    }

    #[test]
    fn test_to_payload_uses_camel_case() {
        let values = normalize_definition(&interface_definition());
        let payload = to_payload(&values);

        assert_eq!(payload["ifName"], json!({"optionType": "global", "value": "GigabitEthernet2"}));
        assert_eq!(payload["ip"]["address"]["value"], "10.1.17.15/24");
        assert_eq!(payload["dns"][0]["dnsAddr"]["value"], "8.8.8.8");
    }

    #[test]
    fn test_coerce_keeps_leading_zero_strings() {
        assert_eq!(coerce(&json!("007")), json!("007"));
        assert_eq!(coerce(&json!("0")), json!(0));
        assert_eq!(coerce(&json!("0/1")), json!("0/1"));
    }

    #[test]
    fn test_non_object_definition_is_empty() {
        assert!(normalize_definition(&Value::Null).is_empty());
    }
}
