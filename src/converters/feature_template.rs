//! Feature template converters

use serde_json::Value;

use super::normalize::{get_path, to_payload, TemplateValue, TemplateValues};
use super::{ConversionError, TemplateConverter};
use crate::models::{GenericParcel, OptionValue, Parcel, ParcelType, CISCO_VPN};

/// Converter for templates whose normalized values map onto the parcel payload as is
pub struct SimpleTemplateConverter {
    supported: &'static [&'static str],
    parcel_type: ParcelType,
}

impl SimpleTemplateConverter {
    pub const fn new(supported: &'static [&'static str], parcel_type: ParcelType) -> Self {
        Self { supported, parcel_type }
    }
}

impl TemplateConverter for SimpleTemplateConverter {
    fn supported_template_types(&self) -> &'static [&'static str] {
        self.supported
    }

    fn create_parcel(&self, name: &str, description: &str, values: &TemplateValues) -> Result<Parcel, ConversionError> {
        let parcel = GenericParcel::new(self.parcel_type, name, description).with_data(to_payload(values));
        Ok(Parcel::Generic(parcel))
    }
}

/// Transport VPN id
pub const TRANSPORT_VPN_ID: i64 = 0;
/// Management VPN id
pub const MANAGEMENT_VPN_ID: i64 = 512;

/// Read the constant `vpn-id` of a normalized cisco_vpn definition
pub fn vpn_id(values: &TemplateValues) -> Result<i64, ConversionError> {
    let value = get_path(values, &["vpn-id"]).ok_or(ConversionError::MissingField("vpn-id"))?;
    match value {
        TemplateValue::Leaf(OptionValue::Global(v)) | TemplateValue::Leaf(OptionValue::Default(Some(v))) => match v {
            Value::Number(n) => n.as_i64().ok_or_else(|| ConversionError::InvalidValue {
                field: "vpn-id",
                value: n.to_string(),
            }),
            other => Err(ConversionError::InvalidValue {
                field: "vpn-id",
                value: other.to_string(),
            }),
        },
        TemplateValue::Leaf(OptionValue::Variable(name)) => Err(ConversionError::CannotConvert(format!(
            "vpn-id is the device variable {}",
            name
        ))),
        _ => Err(ConversionError::MissingField("vpn-id")),
    }
}

/// Parcel type a VPN id maps to
pub fn vpn_parcel_type(vpn_id: i64) -> ParcelType {
    match vpn_id {
        TRANSPORT_VPN_ID => ParcelType::WanVpn,
        MANAGEMENT_VPN_ID => ParcelType::ManagementVpn,
        _ => ParcelType::LanVpn,
    }
}

/// cisco_vpn turns into a LAN, WAN or management VPN depending on its id
pub struct VpnTemplateConverter;

impl TemplateConverter for VpnTemplateConverter {
    fn supported_template_types(&self) -> &'static [&'static str] {
        &[CISCO_VPN]
    }

    fn create_parcel(&self, name: &str, description: &str, values: &TemplateValues) -> Result<Parcel, ConversionError> {
        let parcel_type = vpn_parcel_type(vpn_id(values)?);
        let parcel = GenericParcel::new(parcel_type, name, description).with_data(to_payload(values));
        Ok(Parcel::Generic(parcel))
    }
}

const SIMPLE_CONVERTERS: &[SimpleTemplateConverter] = &[
    SimpleTemplateConverter::new(&["cisco_aaa", "cedge_aaa", "aaa"], ParcelType::Aaa),
    SimpleTemplateConverter::new(&["cisco_banner"], ParcelType::Banner),
    SimpleTemplateConverter::new(&["cisco_security", "security", "security-vsmart", "security-vedge"], ParcelType::Security),
    SimpleTemplateConverter::new(&["cisco_system", "system-vsmart", "system-vedge"], ParcelType::Basic),
    SimpleTemplateConverter::new(&["cedge_global"], ParcelType::Global),
    SimpleTemplateConverter::new(&["cisco_logging", "logging"], ParcelType::Logging),
    SimpleTemplateConverter::new(&["cisco_omp", "omp-vedge", "omp-vsmart"], ParcelType::Omp),
    SimpleTemplateConverter::new(&["cisco_ntp", "ntp"], ParcelType::Ntp),
    SimpleTemplateConverter::new(&["cisco_bfd", "bfd-vedge"], ParcelType::Bfd),
    SimpleTemplateConverter::new(&["cisco_thousandeyes"], ParcelType::ThousandEyes),
    SimpleTemplateConverter::new(&["ucse"], ParcelType::Ucse),
    SimpleTemplateConverter::new(&["dhcp", "cisco_dhcp_server", "dhcp-server"], ParcelType::DhcpServer),
    SimpleTemplateConverter::new(
        &["cisco_vpn_interface", "vpn-vsmart-interface", "vpn-vedge-interface", "vpn-vmanage-interface"],
        ParcelType::LanInterfaceEthernet,
    ),
    SimpleTemplateConverter::new(&["cisco_vpn_interface_gre"], ParcelType::LanInterfaceGre),
    SimpleTemplateConverter::new(&["cisco_vpn_interface_ipsec"], ParcelType::LanInterfaceIpsec),
    SimpleTemplateConverter::new(&["vpn-interface-svi"], ParcelType::LanInterfaceSvi),
    SimpleTemplateConverter::new(&["vpn-interface-t1-e1"], ParcelType::WanInterfaceSerial),
    SimpleTemplateConverter::new(&["vpn-interface-ethpppoe"], ParcelType::WanInterfaceEthPppoe),
    SimpleTemplateConverter::new(&["vpn-interface-pppoe"], ParcelType::WanInterfaceDslPppoe),
    SimpleTemplateConverter::new(&["vpn-interface-pppoa"], ParcelType::WanInterfaceDslPppoa),
    SimpleTemplateConverter::new(&["vpn-interface-ipoe"], ParcelType::WanInterfaceDslIpoe),
    SimpleTemplateConverter::new(&["cisco_ospf"], ParcelType::RoutingOspf),
    SimpleTemplateConverter::new(&["switchport"], ParcelType::Switchport),
    SimpleTemplateConverter::new(&["cisco_wireless_lan"], ParcelType::WirelessLan),
    SimpleTemplateConverter::new(
        &[
            "cisco_multicast", "cisco_pim", "cisco_igmp", "cisco_IGMP", "igmp", "pim", "multicast",
            "cedge_igmp", "cedge_multicast", "cedge_pim",
        ],
        ParcelType::RoutingMulticast,
    ),
];

/// Every feature template converter, one per supported legacy type family
pub fn default_converters() -> Vec<Box<dyn TemplateConverter>> {
    let mut converters: Vec<Box<dyn TemplateConverter>> = Vec::new();
    for c in SIMPLE_CONVERTERS {
        converters.push(Box::new(SimpleTemplateConverter::new(c.supported, c.parcel_type)));
    }
    converters.push(Box::new(VpnTemplateConverter));
    converters
}
