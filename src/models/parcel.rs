use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::values::{OptionValue, RefIdItem};

/// Feature profile kinds of the UX2 model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileType {
    System,
    Transport,
    Service,
    Other,
    PolicyObject,
    UcVoice,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::System => "system",
            ProfileType::Transport => "transport",
            ProfileType::Service => "service",
            ProfileType::Other => "other",
            ProfileType::PolicyObject => "policy-object",
            ProfileType::UcVoice => "uc-voice",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parcel type '{0}'")]
pub struct UnknownParcelType(pub String);

macro_rules! parcel_types {
    ($( $variant:ident => $wire:literal, $family:ident; )*) => {
        /// Every parcel type the migration can produce, tagged with its wire name
        /// and the feature profile family it belongs to
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ParcelType {
            $( $variant, )*
        }

        impl ParcelType {
            pub const ALL: &'static [ParcelType] = &[ $( ParcelType::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( ParcelType::$variant => $wire, )*
                }
            }

            pub fn family(&self) -> ProfileType {
                match self {
                    $( ParcelType::$variant => ProfileType::$family, )*
                }
            }
        }

        impl FromStr for ParcelType {
            type Err = UnknownParcelType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(ParcelType::$variant), )*
                    other => Err(UnknownParcelType(other.to_string())),
                }
            }
        }
    };
}

parcel_types! {
    Aaa => "aaa", System;
    Banner => "banner", System;
    Basic => "basic", System;
    Bfd => "bfd", System;
    Global => "global", System;
    Logging => "logging", System;
    Ntp => "ntp", System;
    Omp => "omp", System;
    Snmp => "snmp", System;
    Security => "security", System;
    Mrf => "mrf", System;

    WanVpn => "wan/vpn", Transport;
    ManagementVpn => "management/vpn", Transport;
    WanInterfaceEthernet => "wan/vpn/interface/ethernet", Transport;
    WanInterfaceGre => "wan/vpn/interface/gre", Transport;
    WanInterfaceIpsec => "wan/vpn/interface/ipsec", Transport;
    WanInterfaceSerial => "wan/vpn/interface/serial", Transport;
    WanInterfaceEthPppoe => "wan/vpn/interface/eth-pppoe", Transport;
    WanInterfaceDslPppoe => "wan/vpn/interface/dsl-pppoe", Transport;
    WanInterfaceDslPppoa => "wan/vpn/interface/dsl-pppoa", Transport;
    WanInterfaceDslIpoe => "wan/vpn/interface/dsl-ipoe", Transport;
    ManagementInterfaceEthernet => "management/vpn/interface/ethernet", Transport;
    T1E1Controller => "t1e1-controller", Transport;
    CellularController => "cellular-controller", Transport;
    Gps => "gps", Transport;

    LanVpn => "lan/vpn", Service;
    LanInterfaceEthernet => "lan/vpn/interface/ethernet", Service;
    LanInterfaceGre => "lan/vpn/interface/gre", Service;
    LanInterfaceIpsec => "lan/vpn/interface/ipsec", Service;
    LanInterfaceSvi => "lan/vpn/interface/svi", Service;
    DhcpServer => "dhcp-server", Service;
    RoutingOspf => "routing/ospf", Service;
    RoutingOspfv3Ipv4 => "routing/ospfv3/ipv4", Service;
    RoutingOspfv3Ipv6 => "routing/ospfv3/ipv6", Service;
    RoutingMulticast => "routing/multicast", Service;
    Switchport => "switchport", Service;
    WirelessLan => "wirelesslan", Service;
    Tracker => "tracker", Service;
    TrackerGroup => "trackergroup", Service;
    RoutePolicy => "route-policy", Service;

    ThousandEyes => "thousandeyes", Other;
    Ucse => "ucse", Other;
    Cybervision => "cybervision", Other;

    AppList => "app-list", PolicyObject;
    Color => "color", PolicyObject;
    DataPrefix => "data-prefix", PolicyObject;
    DataIpv6Prefix => "data-ipv6-prefix", PolicyObject;
    Prefix => "prefix", PolicyObject;
    Ipv6Prefix => "ipv6-prefix", PolicyObject;
    AsPath => "as-path", PolicyObject;
    Class => "class", PolicyObject;
    StandardCommunity => "standard-community", PolicyObject;
    ExpandedCommunity => "expanded-community", PolicyObject;
    ExtCommunity => "ext-community", PolicyObject;
    Mirror => "mirror", PolicyObject;
    Policer => "policer", PolicyObject;
    SlaClass => "sla-class", PolicyObject;
    Tloc => "tloc", PolicyObject;
    PreferredColorGroup => "preferred-color-group", PolicyObject;
    SecurityFqdn => "security-fqdn", PolicyObject;
    SecurityGeolocation => "security-geolocation", PolicyObject;
    SecurityPort => "security-port", PolicyObject;
    SecurityProtocolName => "security-protocolname", PolicyObject;
    SecurityLocalDomain => "security-localdomain", PolicyObject;
    SecurityUrlList => "security-urllist", PolicyObject;
    SecurityIpsSignature => "security-ipssignature", PolicyObject;
    SecurityZone => "security-zone", PolicyObject;
    SecurityLocalApp => "security-localapp", PolicyObject;
    AdvancedMalwareProtection => "unified/advanced-malware-protection", PolicyObject;
    IntrusionPrevention => "unified/intrusion-prevention", PolicyObject;
    UrlFiltering => "unified/url-filtering", PolicyObject;

    MediaProfile => "media-profile", UcVoice;
    ServerGroup => "server-group", UcVoice;
    Srst => "srst", UcVoice;
    TranslationProfile => "translation-profile", UcVoice;
    TranslationRule => "translation-rule", UcVoice;
    TrunkGroup => "trunk-group", UcVoice;
    VoiceGlobal => "voice-global", UcVoice;
    VoiceTenant => "voice-tenant", UcVoice;
    SupervisoryDisconnect => "supervisory-disconnect", UcVoice;
    AnalogInterface => "analog-interface", UcVoice;
    DigitalInterface => "digital-interface", UcVoice;
    CallRouting => "call-routing", UcVoice;
}

impl ParcelType {
    pub fn is_vpn(&self) -> bool {
        matches!(self, ParcelType::LanVpn | ParcelType::WanVpn | ParcelType::ManagementVpn)
    }

    /// Interfaces are created under their VPN: `<prefix>/vpn/{vpnId}/interface/<kind>`
    pub fn is_vpn_interface(&self) -> bool {
        matches!(
            self,
            ParcelType::WanInterfaceEthernet
                | ParcelType::WanInterfaceGre
                | ParcelType::WanInterfaceIpsec
                | ParcelType::WanInterfaceSerial
                | ParcelType::WanInterfaceEthPppoe
                | ParcelType::WanInterfaceDslPppoe
                | ParcelType::WanInterfaceDslPppoa
                | ParcelType::WanInterfaceDslIpoe
                | ParcelType::ManagementInterfaceEthernet
                | ParcelType::LanInterfaceEthernet
                | ParcelType::LanInterfaceGre
                | ParcelType::LanInterfaceIpsec
                | ParcelType::LanInterfaceSvi
        )
    }

    /// Interface type to use once the parent VPN kind is known. Legacy interface
    /// templates do not say whether they serve a LAN, WAN or management VPN.
    pub fn under_vpn(&self, vpn: ParcelType) -> ParcelType {
        match (vpn, self) {
            (ParcelType::WanVpn, ParcelType::LanInterfaceEthernet) => ParcelType::WanInterfaceEthernet,
            (ParcelType::WanVpn, ParcelType::LanInterfaceGre) => ParcelType::WanInterfaceGre,
            (ParcelType::WanVpn, ParcelType::LanInterfaceIpsec) => ParcelType::WanInterfaceIpsec,
            (ParcelType::ManagementVpn, ParcelType::LanInterfaceEthernet) => ParcelType::ManagementInterfaceEthernet,
            _ => *self,
        }
    }

    /// Parcels whose ids other parcels of the same profile may reference by name
    pub fn is_associable(&self) -> bool {
        match self.family() {
            ProfileType::PolicyObject => !matches!(
                self,
                ParcelType::AdvancedMalwareProtection | ParcelType::IntrusionPrevention | ParcelType::UrlFiltering
            ),
            ProfileType::UcVoice => matches!(
                self,
                ParcelType::MediaProfile
                    | ParcelType::ServerGroup
                    | ParcelType::Srst
                    | ParcelType::TranslationProfile
                    | ParcelType::TranslationRule
                    | ParcelType::TrunkGroup
                    | ParcelType::VoiceGlobal
                    | ParcelType::VoiceTenant
                    | ParcelType::SupervisoryDisconnect
            ),
            _ => false,
        }
    }

    /// Association fields a parcel of this type may carry
    pub fn association_fields(&self) -> &'static [AssociationField] {
        use AssociationField::*;
        match self {
            ParcelType::AnalogInterface => &[TranslationProfile, TrunkGroup, VoiceTenant, SupervisoryDisconnect],
            ParcelType::DigitalInterface => &[TranslationProfile, TrunkGroup, VoiceTenant],
            ParcelType::CallRouting => &[MediaProfile, ServerGroup, TranslationProfile, TrunkGroup, VoiceTenant],
            ParcelType::Srst => &[MediaProfile],
            _ => &[],
        }
    }
}

impl fmt::Display for ParcelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParcelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParcelType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A named reference slot inside a voice association entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationField {
    MediaProfile,
    ServerGroup,
    TranslationProfile,
    TrunkGroup,
    VoiceTenant,
    SupervisoryDisconnect,
}

impl AssociationField {
    pub fn name(&self) -> &'static str {
        match self {
            AssociationField::MediaProfile => "media_profile",
            AssociationField::ServerGroup => "server_group",
            AssociationField::TranslationProfile => "translation_profile",
            AssociationField::TrunkGroup => "trunk_group",
            AssociationField::VoiceTenant => "voice_tenant",
            AssociationField::SupervisoryDisconnect => "supervisory_disconnect",
        }
    }

    /// Parcel type a reference in this slot must point at
    pub fn target(&self) -> ParcelType {
        match self {
            AssociationField::MediaProfile => ParcelType::MediaProfile,
            AssociationField::ServerGroup => ParcelType::ServerGroup,
            AssociationField::TranslationProfile => ParcelType::TranslationProfile,
            AssociationField::TrunkGroup => ParcelType::TrunkGroup,
            AssociationField::VoiceTenant => ParcelType::VoiceTenant,
            AssociationField::SupervisoryDisconnect => ParcelType::SupervisoryDisconnect,
        }
    }

    pub fn get_mut<'a>(&self, association: &'a mut Association) -> &'a mut Option<RefIdItem> {
        match self {
            AssociationField::MediaProfile => &mut association.media_profile,
            AssociationField::ServerGroup => &mut association.server_group,
            AssociationField::TranslationProfile => &mut association.translation_profile,
            AssociationField::TrunkGroup => &mut association.trunk_group,
            AssociationField::VoiceTenant => &mut association.voice_tenant,
            AssociationField::SupervisoryDisconnect => &mut association.supervisory_disconnect,
        }
    }
}

/// One association entry of a voice parcel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_profile: Option<RefIdItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_group: Option<RefIdItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_profile: Option<RefIdItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_group: Option<RefIdItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_tenant: Option<RefIdItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisory_disconnect: Option<RefIdItem>,
    /// Non-reference settings of the entry (port range, priorities, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parcel type a by-name reference field of a generic parcel points at, when known
pub fn reference_target(field: &str) -> Option<ParcelType> {
    match field {
        "urlAllowedList" | "urlBlockedList" => Some(ParcelType::SecurityUrlList),
        "signatureAllowedList" => Some(ParcelType::SecurityIpsSignature),
        _ => None,
    }
}

/// A parcel whose payload the migration treats as opaque schema data.
/// `references` holds payload fields that point at sibling parcels by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParcel {
    pub parcel_type: ParcelType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub references: BTreeMap<String, RefIdItem>,
}

impl GenericParcel {
    pub fn new(parcel_type: ParcelType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            parcel_type,
            name: name.into(),
            description: description.into(),
            data: Map::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

/// A voice parcel carrying association entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedParcel {
    pub parcel_type: ParcelType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub association: Vec<Association>,
}

impl AssociatedParcel {
    pub fn new(parcel_type: ParcelType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            parcel_type,
            name: name.into(),
            description: description.into(),
            data: Map::new(),
            association: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Calling,
    Called,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRuleParcel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Translation profile; `calling`/`called` reference rule parcels by name
/// until the rules are created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationProfileParcel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calling: Option<RefIdItem>,
    #[serde(default)]
    pub called: Option<RefIdItem>,
}

impl TranslationProfileParcel {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            calling: None,
            called: None,
        }
    }

    pub fn set_ref_by_call_type(&mut self, rule_id: Uuid, call_type: CallType) {
        let item = RefIdItem::named(rule_id.to_string());
        match call_type {
            CallType::Calling => self.calling = Some(item),
            CallType::Called => self.called = Some(item),
        }
    }

    pub fn rule_ref(&self, call_type: CallType) -> Option<&str> {
        let item = match call_type {
            CallType::Calling => self.calling.as_ref(),
            CallType::Called => self.called.as_ref(),
        };
        item.and_then(|r| r.ref_id.as_global_str())
    }
}

/// Closed sum over the parcel shapes the pipeline handles differently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parcel {
    Generic(GenericParcel),
    Associated(AssociatedParcel),
    TranslationRule(TranslationRuleParcel),
    TranslationProfile(TranslationProfileParcel),
}

impl Parcel {
    pub fn parcel_type(&self) -> ParcelType {
        match self {
            Parcel::Generic(p) => p.parcel_type,
            Parcel::Associated(p) => p.parcel_type,
            Parcel::TranslationRule(_) => ParcelType::TranslationRule,
            Parcel::TranslationProfile(_) => ParcelType::TranslationProfile,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parcel::Generic(p) => &p.name,
            Parcel::Associated(p) => &p.name,
            Parcel::TranslationRule(p) => &p.name,
            Parcel::TranslationProfile(p) => &p.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Parcel::Generic(p) => &p.description,
            Parcel::Associated(p) => &p.description,
            Parcel::TranslationRule(p) => &p.description,
            Parcel::TranslationProfile(p) => &p.description,
        }
    }

    /// Whether the parcel carries by-name references that must be resolved before creation
    pub fn has_associations(&self) -> bool {
        match self {
            Parcel::Generic(p) => !p.references.is_empty(),
            Parcel::Associated(p) => !p.association.is_empty(),
            Parcel::TranslationRule(_) | Parcel::TranslationProfile(_) => false,
        }
    }

    /// Visit every declared reference field with its field name and target type
    pub fn for_each_reference_mut(&mut self, mut f: impl FnMut(&str, Option<ParcelType>, &mut RefIdItem)) {
        match self {
            Parcel::Generic(p) => {
                for (field, item) in p.references.iter_mut() {
                    f(field, reference_target(field), item);
                }
            }
            Parcel::Associated(p) => {
                let fields = p.parcel_type.association_fields();
                for association in p.association.iter_mut() {
                    for field in fields {
                        if let Some(item) = field.get_mut(association).as_mut() {
                            f(field.name(), Some(field.target()), item);
                        }
                    }
                }
            }
            Parcel::TranslationRule(_) | Parcel::TranslationProfile(_) => {}
        }
    }

    /// Body of the parcel creation request
    pub fn payload(&self) -> Value {
        let data = match self {
            Parcel::Generic(p) => {
                let mut data = p.data.clone();
                for (field, item) in &p.references {
                    data.insert(field.clone(), json!(item));
                }
                Value::Object(data)
            }
            Parcel::Associated(p) => {
                let mut data = p.data.clone();
                if !p.association.is_empty() {
                    data.insert("association".to_string(), json!(p.association));
                }
                Value::Object(data)
            }
            Parcel::TranslationRule(p) => Value::Object(p.data.clone()),
            Parcel::TranslationProfile(p) => {
                let mut settings = Vec::new();
                for (call_type, item) in [(CallType::Calling, &p.calling), (CallType::Called, &p.called)] {
                    if let Some(item) = item {
                        settings.push(json!({
                            "callType": OptionValue::global(json!(call_type)),
                            "translationRule": item,
                        }));
                    }
                }
                json!({ "translationProfileSettings": settings })
            }
        };

        json!({
            "name": self.name(),
            "description": self.description(),
            "data": data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parcel_type_wire_names_round_trip() {
        for t in ParcelType::ALL {
            assert_eq!(t.as_str().parse::<ParcelType>().unwrap(), *t);
        }
        assert!("not-a-parcel".parse::<ParcelType>().is_err());
    }

    #[test]
    fn test_parcel_type_classification() {
        assert!(ParcelType::LanVpn.is_vpn());
        assert!(!ParcelType::LanVpn.is_vpn_interface());
        assert!(ParcelType::LanInterfaceSvi.is_vpn_interface());
        assert_eq!(ParcelType::LanInterfaceSvi.family(), ProfileType::Service);
        assert!(ParcelType::DataPrefix.is_associable());
        assert!(!ParcelType::UrlFiltering.is_associable());
        assert!(ParcelType::TranslationProfile.is_associable());
        assert!(!ParcelType::AnalogInterface.is_associable());
        assert!(ParcelType::Banner.association_fields().is_empty());
        assert_eq!(ParcelType::Srst.association_fields(), &[AssociationField::MediaProfile]);
    }

    #[test]
    fn test_interface_type_under_vpn() {
        assert_eq!(
            ParcelType::LanInterfaceEthernet.under_vpn(ParcelType::WanVpn),
            ParcelType::WanInterfaceEthernet
        );
        assert_eq!(
            ParcelType::LanInterfaceEthernet.under_vpn(ParcelType::ManagementVpn),
            ParcelType::ManagementInterfaceEthernet
        );
        assert_eq!(ParcelType::LanInterfaceSvi.under_vpn(ParcelType::LanVpn), ParcelType::LanInterfaceSvi);
        assert_eq!(ParcelType::DhcpServer.under_vpn(ParcelType::WanVpn), ParcelType::DhcpServer);
    }

    #[test]
    fn test_profile_type_serde() {
        assert_eq!(serde_json::to_value(ProfileType::PolicyObject).unwrap(), json!("policy-object"));
        assert_eq!(serde_json::to_value(ProfileType::UcVoice).unwrap(), json!("uc-voice"));
        let t: ProfileType = serde_json::from_value(json!("transport")).unwrap();
        assert_eq!(t, ProfileType::Transport);
    }

    #[test]
    fn test_for_each_reference_only_visits_declared_fields() {
        let mut srst = AssociatedParcel::new(ParcelType::Srst, "Srst", "");
        srst.association.push(Association {
            media_profile: Some(RefIdItem::named("MediaProfile")),
            trunk_group: Some(RefIdItem::named("TrunkGroup")),
            ..Default::default()
        });
        let mut parcel = Parcel::Associated(srst);

        let mut seen = Vec::new();
        parcel.for_each_reference_mut(|field, target, item| {
            seen.push((field.to_string(), target, item.ref_id.as_global_str().map(str::to_string)));
        });
        assert_eq!(
            seen,
            vec![(
                "media_profile".to_string(),
                Some(ParcelType::MediaProfile),
                Some("MediaProfile".to_string())
            )]
        );
    }

    #[test]
    fn test_reference_targets() {
        assert_eq!(reference_target("urlAllowedList"), Some(ParcelType::SecurityUrlList));
        assert_eq!(reference_target("signatureAllowedList"), Some(ParcelType::SecurityIpsSignature));
        assert_eq!(reference_target("tracker"), None);
        assert_eq!(AssociationField::TrunkGroup.target(), ParcelType::TrunkGroup);
    }

    #[test]
    fn test_translation_profile_payload() {
        let mut tpp = TranslationProfileParcel::new("TPP", "desc");
        let rule = Uuid::new_v4();
        tpp.set_ref_by_call_type(rule, CallType::Calling);
        let payload = Parcel::TranslationProfile(tpp).payload();

        assert_eq!(payload["name"], "TPP");
        let settings = payload["data"]["translationProfileSettings"].as_array().unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0]["callType"]["value"], "calling");
        assert_eq!(settings[0]["translationRule"]["refId"]["value"], rule.to_string());
    }

    #[test]
    fn test_generic_payload_inlines_references() {
        let mut p = GenericParcel::new(ParcelType::IntrusionPrevention, "ips", "");
        p.data.insert("inspectionMode".into(), json!(OptionValue::global("detection")));
        p.references.insert("signatureAllowedList".into(), RefIdItem::named("sigs"));
        let payload = Parcel::Generic(p).payload();

        assert_eq!(payload["data"]["inspectionMode"]["value"], "detection");
        assert_eq!(payload["data"]["signatureAllowedList"]["refId"]["value"], "sigs");
    }
}
