//! Policy list and policy definition converters

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{ConversionError, PolicyConvertContext, PolicyDefinitionConverter, PolicyListConverter};
use crate::models::{GenericParcel, OptionValue, Parcel, ParcelType, PolicyDefinition, PolicyList, RefIdItem};
use crate::utils::split_prefix;

// --- Policy lists ---

/// How the fields of one legacy list entry map onto a UX2 entry
#[derive(Debug, Clone, Copy)]
enum EntryShape {
    /// Renamed one to one: (legacy key, new key)
    Fields(&'static [(&'static str, &'static str)]),
    /// A `a.b.c.d/len` prefix split into address and length, with optional ge/le ranges
    Prefix {
        legacy: &'static str,
        address: &'static str,
        length: &'static str,
        ranges: bool,
    },
}

pub struct ListConverter {
    supported: &'static [&'static str],
    parcel_type: ParcelType,
    shape: EntryShape,
}

fn convert_entry(shape: EntryShape, entry: &Map<String, Value>) -> Result<Map<String, Value>, ConversionError> {
    let mut out = Map::new();
    match shape {
        EntryShape::Fields(fields) => {
            for (legacy, key) in fields {
                match entry.get(*legacy) {
                    Some(Value::Null) | None => {}
                    Some(Value::String(s)) if s.is_empty() => {}
                    Some(value) => {
                        out.insert(key.to_string(), json!(OptionValue::Global(value.clone())));
                    }
                }
            }
        }
        EntryShape::Prefix { legacy, address, length, ranges } => {
            let raw = entry
                .get(legacy)
                .and_then(Value::as_str)
                .ok_or(ConversionError::MissingField("ipPrefix"))?;
            let (addr, len) = split_prefix(raw).ok_or_else(|| ConversionError::InvalidValue {
                field: "ipPrefix",
                value: raw.to_string(),
            })?;
            out.insert(address.to_string(), json!(OptionValue::global(addr)));
            out.insert(length.to_string(), json!(OptionValue::global(len)));
            if ranges {
                for (legacy_range, key) in [("ge", "geRangePrefixLength"), ("le", "leRangePrefixLength")] {
                    let value = entry.get(legacy_range).and_then(|v| match v {
                        Value::Number(n) => n.as_u64(),
                        Value::String(s) => s.parse().ok(),
                        _ => None,
                    });
                    if let Some(value) = value {
                        out.insert(key.to_string(), json!(OptionValue::global(value)));
                    }
                }
            }
        }
    }
    Ok(out)
}

impl PolicyListConverter for ListConverter {
    fn supported_list_types(&self) -> &'static [&'static str] {
        self.supported
    }

    fn convert(&self, list: &PolicyList) -> Result<Parcel, ConversionError> {
        let entries = list
            .entries
            .iter()
            .map(|entry| convert_entry(self.shape, entry).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = Map::new();
        data.insert("entries".to_string(), Value::Array(entries));
        if self.parcel_type == ParcelType::SecurityUrlList {
            let kind = if list.list_type.eq_ignore_ascii_case("urlWhiteList") { "allow" } else { "block" };
            data.insert("type".to_string(), json!(kind));
        }

        let parcel = GenericParcel::new(self.parcel_type, &list.name, &list.description).with_data(data);
        Ok(Parcel::Generic(parcel))
    }
}

/// Legacy list types with no UX2 policy object counterpart
pub struct UnconvertibleListConverter;

impl PolicyListConverter for UnconvertibleListConverter {
    fn supported_list_types(&self) -> &'static [&'static str] {
        &["site", "vpn", "region", "tlocList", "appProbe"]
    }

    fn convert(&self, list: &PolicyList) -> Result<Parcel, ConversionError> {
        Err(ConversionError::CannotConvert(format!(
            "{} list '{}' has no policy object counterpart",
            list.list_type, list.name
        )))
    }
}

const fn list(supported: &'static [&'static str], parcel_type: ParcelType, shape: EntryShape) -> ListConverter {
    ListConverter { supported, parcel_type, shape }
}

const LIST_CONVERTERS: &[ListConverter] = &[
    list(&["dataPrefix"], ParcelType::DataPrefix, EntryShape::Prefix {
        legacy: "ipPrefix",
        address: "ipv4Address",
        length: "ipv4PrefixLength",
        ranges: false,
    }),
    list(&["dataIpv6Prefix"], ParcelType::DataIpv6Prefix, EntryShape::Prefix {
        legacy: "ipv6Prefix",
        address: "ipv6Address",
        length: "ipv6PrefixLength",
        ranges: false,
    }),
    list(&["prefix"], ParcelType::Prefix, EntryShape::Prefix {
        legacy: "ipPrefix",
        address: "ipv4Address",
        length: "ipv4PrefixLength",
        ranges: true,
    }),
    list(&["ipv6prefix"], ParcelType::Ipv6Prefix, EntryShape::Prefix {
        legacy: "ipv6Prefix",
        address: "ipv6Address",
        length: "ipv6PrefixLength",
        ranges: true,
    }),
    list(&["app"], ParcelType::AppList, EntryShape::Fields(&[("app", "app"), ("appFamily", "appFamily")])),
    list(&["color"], ParcelType::Color, EntryShape::Fields(&[("color", "color")])),
    list(&["asPath"], ParcelType::AsPath, EntryShape::Fields(&[("asPath", "asPathList")])),
    list(&["class"], ParcelType::Class, EntryShape::Fields(&[("queue", "queue")])),
    list(&["community"], ParcelType::StandardCommunity, EntryShape::Fields(&[("community", "standardCommunity")])),
    list(&["expandedCommunity"], ParcelType::ExpandedCommunity, EntryShape::Fields(&[("community", "expandedCommunity")])),
    list(&["extCommunity"], ParcelType::ExtCommunity, EntryShape::Fields(&[("community", "extCommunity")])),
    list(&["mirror"], ParcelType::Mirror, EntryShape::Fields(&[("remoteDest", "remoteDestIp"), ("source", "sourceIp")])),
    list(&["policer"], ParcelType::Policer, EntryShape::Fields(&[("burst", "burst"), ("exceed", "exceed"), ("rate", "rate")])),
    list(&["sla"], ParcelType::SlaClass, EntryShape::Fields(&[
        ("latency", "latency"),
        ("loss", "loss"),
        ("jitter", "jitter"),
        ("appProbeClass", "appProbeClass"),
    ])),
    list(&["tloc"], ParcelType::Tloc, EntryShape::Fields(&[
        ("tloc", "tloc"),
        ("color", "color"),
        ("encap", "encapsulation"),
        ("preference", "preference"),
    ])),
    list(&["preferredColorGroup"], ParcelType::PreferredColorGroup, EntryShape::Fields(&[
        ("primaryPreference", "primaryPreference"),
        ("secondaryPreference", "secondaryPreference"),
        ("tertiaryPreference", "tertiaryPreference"),
    ])),
    list(&["fqdn"], ParcelType::SecurityFqdn, EntryShape::Fields(&[("fqdn", "pattern")])),
    list(&["geoLocation"], ParcelType::SecurityGeolocation, EntryShape::Fields(&[("country", "country"), ("continent", "continent")])),
    list(&["port"], ParcelType::SecurityPort, EntryShape::Fields(&[("port", "port")])),
    list(&["protocolName"], ParcelType::SecurityProtocolName, EntryShape::Fields(&[("protocolName", "protocolName")])),
    list(&["localDomain"], ParcelType::SecurityLocalDomain, EntryShape::Fields(&[("nameServer", "localDomain")])),
    list(&["urlWhiteList", "urlBlackList"], ParcelType::SecurityUrlList, EntryShape::Fields(&[("pattern", "pattern")])),
    list(&["ipsSignature"], ParcelType::SecurityIpsSignature, EntryShape::Fields(&[
        ("generatorId", "generatorId"),
        ("signatureId", "signatureId"),
    ])),
    list(&["zone"], ParcelType::SecurityZone, EntryShape::Fields(&[("vpn", "vpn"), ("interface", "interface")])),
    list(&["localApp"], ParcelType::SecurityLocalApp, EntryShape::Fields(&[("app", "app"), ("appFamily", "appFamily")])),
];

pub fn default_list_converters() -> Vec<Box<dyn PolicyListConverter>> {
    let mut converters: Vec<Box<dyn PolicyListConverter>> = Vec::new();
    for c in LIST_CONVERTERS {
        converters.push(Box::new(list(c.supported, c.parcel_type, c.shape)));
    }
    converters.push(Box::new(UnconvertibleListConverter));
    converters
}

// --- Policy definitions ---

/// Copy the listed definition fields into parcel data as global values
fn copy_globals(definition: &Map<String, Value>, fields: &[(&str, &str)], data: &mut Map<String, Value>) {
    for (legacy, key) in fields {
        match definition.get(*legacy) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(value) => {
                data.insert(key.to_string(), json!(OptionValue::Global(value.clone())));
            }
        }
    }
}

/// Resolve a `{"ref": "<list uuid>"}` field to a by-name reference of the converted list
fn list_reference(
    definition: &Map<String, Value>,
    legacy: &str,
    context: &PolicyConvertContext,
) -> Result<Option<RefIdItem>, ConversionError> {
    let Some(raw) = definition.get(legacy).and_then(|v| v.get("ref")).and_then(Value::as_str) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let list_id = Uuid::parse_str(raw).map_err(|_| ConversionError::InvalidValue {
        field: "ref",
        value: raw.to_string(),
    })?;
    match context.list_name(&list_id) {
        Some(name) => Ok(Some(RefIdItem::named(name))),
        None => Err(ConversionError::CannotConvert(format!(
            "{} references list {} which was not converted",
            legacy, list_id
        ))),
    }
}

fn definition_body(definition: &PolicyDefinition) -> Result<&Map<String, Value>, ConversionError> {
    definition.definition.as_object().ok_or(ConversionError::MissingField("definition"))
}

pub struct IntrusionPreventionConverter;

impl PolicyDefinitionConverter for IntrusionPreventionConverter {
    fn supported_definition_types(&self) -> &'static [&'static str] {
        &["intrusionPrevention"]
    }

    fn convert(
        &self,
        definition: &PolicyDefinition,
        _origin: Uuid,
        context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError> {
        let body = definition_body(definition)?;
        let mut parcel = GenericParcel::new(ParcelType::IntrusionPrevention, &definition.name, &definition.description);
        copy_globals(
            body,
            &[
                ("signatureSet", "signatureSet"),
                ("inspectionMode", "inspectionMode"),
                ("logLevel", "logLevel"),
                ("customSignature", "customSignature"),
            ],
            &mut parcel.data,
        );
        if let Some(reference) = list_reference(body, "signatureWhiteList", context)? {
            parcel.references.insert("signatureAllowedList".to_string(), reference);
        }
        Ok(Parcel::Generic(parcel))
    }
}

pub struct AdvancedMalwareProtectionConverter;

impl PolicyDefinitionConverter for AdvancedMalwareProtectionConverter {
    fn supported_definition_types(&self) -> &'static [&'static str] {
        &["advancedMalwareProtection"]
    }

    fn convert(
        &self,
        definition: &PolicyDefinition,
        _origin: Uuid,
        _context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError> {
        let body = definition_body(definition)?;
        let alert = body.get("fileReputationAlert").and_then(Value::as_str).unwrap_or("");
        if alert.is_empty() {
            return Err(ConversionError::CannotConvert(
                "AMP file reputation alert must not be empty".to_string(),
            ));
        }

        let mut parcel =
            GenericParcel::new(ParcelType::AdvancedMalwareProtection, &definition.name, &definition.description);
        copy_globals(
            body,
            &[
                ("matchAllVpn", "matchAllVpn"),
                ("fileReputationCloudServer", "fileReputationCloudServer"),
                ("fileReputationEstServer", "fileReputationEstServer"),
                ("fileReputationAlert", "fileReputationAlert"),
                ("fileAnalysisEnabled", "fileAnalysisEnabled"),
                ("fileAnalysisCloudServer", "fileAnalysisCloudServer"),
                ("fileAnalysisFileTypes", "fileAnalysisFileTypes"),
                ("fileAnalysisAlert", "fileAnalysisAlert"),
            ],
            &mut parcel.data,
        );
        Ok(Parcel::Generic(parcel))
    }
}

pub struct UrlFilteringConverter;

impl PolicyDefinitionConverter for UrlFilteringConverter {
    fn supported_definition_types(&self) -> &'static [&'static str] {
        &["urlFiltering"]
    }

    fn convert(
        &self,
        definition: &PolicyDefinition,
        _origin: Uuid,
        context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError> {
        let body = definition_body(definition)?;
        let mut parcel = GenericParcel::new(ParcelType::UrlFiltering, &definition.name, &definition.description);
        copy_globals(
            body,
            &[
                ("webCategoriesAction", "webCategoriesAction"),
                ("webCategories", "webCategories"),
                ("webReputation", "webReputation"),
                ("blockPageContents", "blockPageContents"),
                ("redirectUrl", "redirectUrl"),
                ("enableAlerts", "enableAlerts"),
                ("alerts", "alerts"),
            ],
            &mut parcel.data,
        );

        match body.get("blockPageAction").and_then(Value::as_str) {
            None => {}
            Some("text") => {
                parcel.data.insert("blockPageAction".to_string(), json!(OptionValue::global("text")));
            }
            Some("redirectUrl") => {
                parcel.data.insert("blockPageAction".to_string(), json!(OptionValue::global("redirect-url")));
            }
            Some(other) => {
                return Err(ConversionError::InvalidValue {
                    field: "blockPageAction",
                    value: other.to_string(),
                })
            }
        }

        if let Some(reference) = list_reference(body, "urlWhiteList", context)? {
            parcel.references.insert("urlAllowedList".to_string(), reference);
        }
        if let Some(reference) = list_reference(body, "urlBlackList", context)? {
            parcel.references.insert("urlBlockedList".to_string(), reference);
        }
        Ok(Parcel::Generic(parcel))
    }
}

/// Definition types that exist in the legacy model but are not migrated
pub struct UnconvertibleDefinitionConverter;

impl PolicyDefinitionConverter for UnconvertibleDefinitionConverter {
    fn supported_definition_types(&self) -> &'static [&'static str] {
        &[
            "control", "hubAndSpoke", "mesh", "data", "appRoute", "cflowd", "vpnMembershipGroup", "acl", "aclv6",
            "deviceAccessPolicy", "deviceAccessPolicyv6", "qosMap", "rewriteRule", "vedgeRoute", "zoneBasedFW",
            "dnsSecurity", "sslDecryption", "sslUtdDecryptProfile", "advancedInspectionProfile",
        ]
    }

    fn convert(
        &self,
        definition: &PolicyDefinition,
        _origin: Uuid,
        _context: &PolicyConvertContext,
    ) -> Result<Parcel, ConversionError> {
        Err(ConversionError::CannotConvert(format!(
            "{} definition '{}' is not migrated",
            definition.definition_type, definition.name
        )))
    }
}

pub fn default_definition_converters() -> Vec<Box<dyn PolicyDefinitionConverter>> {
    vec![
        Box::new(IntrusionPreventionConverter),
        Box::new(AdvancedMalwareProtectionConverter),
        Box::new(UrlFilteringConverter),
        Box::new(UnconvertibleDefinitionConverter),
    ]
}
