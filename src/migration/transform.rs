use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::merge::merge_parcels;
use crate::converters::feature_template::vpn_id;
use crate::converters::{normalize_definition, PolicyConvertContext, SchemaRegistry};
use crate::models::{
    ConfigGroupCreationPayload, DeviceTemplateWithInfo, Diagnostic, Diagnostics, GeneralTemplate, GroupType,
    HeaderType, ProfileType, TransformHeader, TransformedConfigGroup, TransformedFeatureProfile, TransformedParcel,
    UX1Config, UX2Config, CISCO_VPN,
};

pub const CONFIG_GROUP_SOLUTION: &str = "sdwan";
pub const POLICY_OBJECT_PROFILE_NAME: &str = "policy_objects";

/// Feature profiles synthesized per device template, in push order
const PROFILE_LAYOUT: [(ProfileType, &str); 4] = [
    (ProfileType::System, "system"),
    (ProfileType::Transport, "transport_and_management"),
    (ProfileType::Service, "service"),
    (ProfileType::Other, "other"),
];

/// Static template type -> feature profile table. cisco_vpn is decided per template.
pub fn template_category(template_type: &str) -> Option<ProfileType> {
    match template_type {
        "cisco_aaa" | "cedge_aaa" | "aaa" | "cisco_banner" | "cisco_security" | "security" | "security-vsmart"
        | "security-vedge" | "cisco_system" | "system-vsmart" | "system-vedge" | "cedge_global" | "cisco_logging"
        | "logging" | "cisco_omp" | "omp-vedge" | "omp-vsmart" | "cisco_ntp" | "ntp" | "cisco_bfd" | "bfd-vedge"
        | "cisco_snmp" | "snmp" => Some(ProfileType::System),

        "vpn-interface-t1-e1" | "vpn-interface-ethpppoe" | "vpn-interface-pppoe" | "vpn-interface-pppoa"
        | "vpn-interface-ipoe" | "cellular-cedge-controller" | "cisco_secure_internet_gateway" => {
            Some(ProfileType::Transport)
        }

        "cisco_vpn_interface" | "cisco_vpn_interface_gre" | "cisco_vpn_interface_ipsec" | "vpn-interface-svi"
        | "vpn-vsmart-interface" | "vpn-vedge-interface" | "vpn-vmanage-interface" | "cisco_ospf" | "cisco_ospfv3"
        | "cisco_bgp" | "switchport" | "cisco_wireless_lan" | "dhcp" | "cisco_dhcp_server" | "dhcp-server"
        | "cisco_multicast" | "cisco_pim" | "cisco_igmp" | "cisco_IGMP" | "igmp" | "pim" | "multicast"
        | "cedge_igmp" | "cedge_multicast" | "cedge_pim" => Some(ProfileType::Service),

        "cisco_thousandeyes" | "ucse" => Some(ProfileType::Other),

        _ => None,
    }
}

/// cisco_vpn 0 and 512 are transport/management VPNs, everything else a service VPN
fn vpn_category(ux1: &UX1Config, template_id: &Uuid) -> ProfileType {
    let id = ux1
        .feature_template(template_id)
        .map(|ft| normalize_definition(&ft.definition))
        .and_then(|values| vpn_id(&values).ok());
    match id {
        Some(0) | Some(512) => ProfileType::Transport,
        _ => ProfileType::Service,
    }
}

fn category(ux1: &UX1Config, template: &GeneralTemplate) -> Option<ProfileType> {
    if template.template_type == CISCO_VPN {
        return Some(vpn_category(ux1, &template.template_id));
    }
    template_category(&template.template_type)
}

/// All template ids below a node, depth first
fn descendants(template: &GeneralTemplate, out: &mut Vec<Uuid>) {
    for sub in &template.sub_templates {
        out.push(sub.template_id);
        descendants(sub, out);
    }
}

/// Direct sub-template ids of every node of every device template
fn collect_sub_templates(ux1: &UX1Config) -> HashMap<Uuid, BTreeSet<Uuid>> {
    fn walk(template: &GeneralTemplate, out: &mut HashMap<Uuid, BTreeSet<Uuid>>) {
        if !template.sub_templates.is_empty() {
            out.entry(template.template_id)
                .or_default()
                .extend(template.sub_templates.iter().map(|t| t.template_id));
        }
        for sub in &template.sub_templates {
            walk(sub, out);
        }
    }

    let mut out = HashMap::new();
    for dt in &ux1.templates.device_templates {
        for template in &dt.template.general_templates {
            walk(template, &mut out);
        }
    }
    out
}

fn transform_device_template(
    ux1: &UX1Config,
    dt: &DeviceTemplateWithInfo,
    ux2: &mut UX2Config,
    diagnostics: &mut Diagnostics,
) {
    let name = &dt.template.template_name;
    let description = &dt.template.template_description;

    let mut profiles: Vec<TransformedFeatureProfile> = PROFILE_LAYOUT
        .iter()
        .map(|(profile_type, suffix)| {
            TransformedFeatureProfile::new(*profile_type, Uuid::new_v4(), format!("{}_{}", name, suffix), description)
        })
        .collect();

    for template in dt.flattened_general_templates() {
        let Some(profile_type) = category(ux1, &template) else {
            diagnostics.push(Diagnostic::UncategorizedTemplate {
                device_template: name.clone(),
                template_id: template.template_id,
                template_type: template.template_type.clone(),
            });
            continue;
        };
        if let Some(profile) = profiles.iter_mut().find(|p| p.profile_type() == Some(profile_type)) {
            profile.header.subelements.insert(template.template_id);
            // cisco_vpn keeps its interfaces; they belong to the VPN's profile
            let mut children = Vec::new();
            descendants(&template, &mut children);
            profile.header.subelements.extend(children);
        }
    }

    let mut header = TransformHeader::new(HeaderType::Group(GroupType::ConfigGroup), dt.template_id);
    header.subelements = profiles.iter().map(|p| p.header.origin).collect();
    ux2.config_groups.push(TransformedConfigGroup {
        header,
        config_group: ConfigGroupCreationPayload {
            name: name.clone(),
            description: description.clone(),
            solution: CONFIG_GROUP_SOLUTION.to_string(),
            profiles: Vec::new(),
        },
    });
    ux2.feature_profiles.extend(profiles);
}

fn transform_feature_templates(
    ux1: &UX1Config,
    registry: &SchemaRegistry,
    ux2: &mut UX2Config,
    diagnostics: &mut Diagnostics,
) {
    let sub_templates = collect_sub_templates(ux1);

    for ft in &ux1.templates.feature_templates {
        if !registry.supports_template(&ft.template_type) {
            diagnostics.push(Diagnostic::UnsupportedTemplateType {
                template_id: ft.id,
                name: ft.name.clone(),
                template_type: ft.template_type.clone(),
            });
            continue;
        }
        match registry.create_parcel_from_template(ft) {
            Ok(parcel) => {
                let subelements = sub_templates.get(&ft.id).cloned().unwrap_or_default();
                ux2.profile_parcels
                    .push(TransformedParcel::new(ft.id, parcel).with_subelements(subelements));
            }
            Err(e) => diagnostics.push(Diagnostic::ConversionFailed {
                origin: ft.id,
                name: ft.name.clone(),
                item_type: ft.template_type.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

fn transform_policies(ux1: &UX1Config, registry: &SchemaRegistry, ux2: &mut UX2Config, diagnostics: &mut Diagnostics) {
    let mut context = PolicyConvertContext::default();
    let mut origins = BTreeSet::new();

    for list in &ux1.policies.policy_lists {
        match registry.convert_policy_list(list) {
            Ok(parcel) => {
                context.add_list(list.list_id, parcel.name());
                origins.insert(list.list_id);
                ux2.profile_parcels.push(TransformedParcel::new(list.list_id, parcel));
            }
            Err(e) => diagnostics.push(Diagnostic::ConversionFailed {
                origin: list.list_id,
                name: list.name.clone(),
                item_type: format!("{} list", list.list_type),
                reason: e.to_string(),
            }),
        }
    }

    for definition in &ux1.policies.policy_definitions {
        match registry.convert_policy_definition(definition, &context) {
            Ok(parcel) => {
                origins.insert(definition.definition_id);
                ux2.profile_parcels
                    .push(TransformedParcel::new(definition.definition_id, parcel));
            }
            Err(e) => diagnostics.push(Diagnostic::ConversionFailed {
                origin: definition.definition_id,
                name: definition.name.clone(),
                item_type: format!("{} definition", definition.definition_type),
                reason: e.to_string(),
            }),
        }
    }

    if origins.is_empty() {
        return;
    }
    let mut profile = TransformedFeatureProfile::new(
        ProfileType::PolicyObject,
        Uuid::new_v4(),
        POLICY_OBJECT_PROFILE_NAME.to_string(),
        "Policy objects migrated from UX1",
    );
    profile.header.subelements = origins;
    ux2.feature_profiles.push(profile);
}

/// Transform a legacy snapshot into the UX2 graph. No I/O; only synthetic
/// containers get fresh ids.
pub fn transform(ux1: &UX1Config, registry: &SchemaRegistry) -> UX2Config {
    let mut ux2 = UX2Config::default();
    let mut diagnostics = Diagnostics::new();

    for dt in &ux1.templates.device_templates {
        transform_device_template(ux1, dt, &mut ux2, &mut diagnostics);
    }
    transform_feature_templates(ux1, registry, &mut ux2, &mut diagnostics);
    transform_policies(ux1, registry, &mut ux2, &mut diagnostics);

    ux2.diagnostics = diagnostics;
    merge_parcels(&mut ux2);

    tracing::info!(
        "Transformed {} config groups, {} feature profiles, {} parcels ({} diagnostics)",
        ux2.config_groups.len(),
        ux2.feature_profiles.len(),
        ux2.profile_parcels.len(),
        ux2.diagnostics.len()
    );
    ux2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::testing::{device_template, feature_template, vpn_template};
    use crate::models::{ParcelType, PolicyDefinition, PolicyList};
    use serde_json::json;

    fn profile_contents(ux2: &UX2Config) -> Vec<(String, BTreeSet<Uuid>)> {
        ux2.feature_profiles
            .iter()
            .map(|p| (p.feature_profile.name.clone(), p.header.subelements.clone()))
            .collect()
    }

    fn branch_config() -> UX1Config {
        let banner = feature_template("banner", "cisco_banner", json!({
            "login": {"vipType": "constant", "vipValue": "hello", "vipObjectType": "object"}
        }));
        let snmp = feature_template("snmp", "cisco_snmp", json!({}));
        let iface = feature_template("ge1", "cisco_vpn_interface", json!({
            "if-name": {"vipType": "constant", "vipValue": "GigabitEthernet1", "vipObjectType": "object"}
        }));
        let wan = vpn_template("vpn0", 0);
        let lan = vpn_template("vpn10", 10);
        let te = feature_template("te", "cisco_thousandeyes", json!({}));

        let dt = device_template(
            "branch",
            vec![
                GeneralTemplate::new(banner.id, "cisco_banner"),
                GeneralTemplate::new(snmp.id, "cisco_snmp"),
                GeneralTemplate::new(wan.id, CISCO_VPN)
                    .with_sub_templates(vec![GeneralTemplate::new(iface.id, "cisco_vpn_interface")]),
                GeneralTemplate::new(lan.id, CISCO_VPN),
                GeneralTemplate::new(te.id, "cisco_thousandeyes"),
                GeneralTemplate::new(Uuid::new_v4(), "cisco_unknown_feature"),
            ],
        );

        let mut ux1 = UX1Config::default();
        ux1.templates.feature_templates = vec![banner, snmp, iface, wan, lan, te];
        ux1.templates.device_templates = vec![dt];
        ux1
    }

    #[test]
    fn test_device_template_yields_four_profiles_and_a_config_group() {
        let ux1 = branch_config();
        let dt = &ux1.templates.device_templates[0];
        let ux2 = transform(&ux1, &SchemaRegistry::default());

        assert_eq!(ux2.config_groups.len(), 1);
        let cg = &ux2.config_groups[0];
        assert_eq!(cg.header.origin, dt.template_id);
        assert_eq!(cg.config_group.solution, "sdwan");
        assert_eq!(cg.header.subelements.len(), 4);

        let names: Vec<&str> = ux2.feature_profiles.iter().map(|p| p.feature_profile.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["branch_system", "branch_transport_and_management", "branch_service", "branch_other"]
        );
        for profile in &ux2.feature_profiles {
            assert!(cg.header.subelements.contains(&profile.header.origin));
        }
    }

    #[test]
    fn test_cisco_vpn_is_bucketed_by_vpn_id() {
        let ux1 = branch_config();
        let ux2 = transform(&ux1, &SchemaRegistry::default());
        let wan = &ux1.templates.feature_templates[3];
        let lan = &ux1.templates.feature_templates[4];
        let iface = &ux1.templates.feature_templates[2];

        let transport = &ux2.feature_profiles[1];
        let service = &ux2.feature_profiles[2];
        assert!(transport.header.subelements.contains(&wan.id));
        assert!(transport.header.subelements.contains(&iface.id));
        assert!(service.header.subelements.contains(&lan.id));
        assert!(!service.header.subelements.contains(&iface.id));

        let wan_parcel = ux2.parcel(&wan.id).unwrap();
        assert_eq!(wan_parcel.parcel.parcel_type(), ParcelType::WanVpn);
        assert!(wan_parcel.header.subelements.contains(&iface.id));
        // interface re-tagged to its transport VPN
        assert_eq!(
            ux2.parcel(&iface.id).unwrap().parcel.parcel_type(),
            ParcelType::WanInterfaceEthernet
        );
    }

    #[test]
    fn test_unsupported_and_uncategorized_templates_are_reported() {
        let ux1 = branch_config();
        let ux2 = transform(&ux1, &SchemaRegistry::default());

        assert!(ux2
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UnsupportedTemplateType { template_type, .. } if template_type == "cisco_snmp")));
        assert!(ux2
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UncategorizedTemplate { template_type, .. } if template_type == "cisco_unknown_feature")));
        // snmp was bucketed but never transformed, so the profile no longer points at it
        let snmp = &ux1.templates.feature_templates[1];
        assert!(!ux2.feature_profiles[0].header.subelements.contains(&snmp.id));
    }

    #[test]
    fn test_bucketing_is_idempotent() {
        let ux1 = branch_config();
        let registry = SchemaRegistry::default();
        let first = transform(&ux1, &registry);
        let second = transform(&ux1, &registry);

        assert_eq!(profile_contents(&first), profile_contents(&second));
        assert_eq!(first.profile_parcels, second.profile_parcels);
    }

    #[test]
    fn test_zero_leaf_device_template() {
        let mut ux1 = UX1Config::default();
        ux1.templates.device_templates = vec![device_template("empty", Vec::new())];
        let ux2 = transform(&ux1, &SchemaRegistry::default());

        assert_eq!(ux2.config_groups.len(), 1);
        assert_eq!(ux2.feature_profiles.len(), 4);
        assert!(ux2.feature_profiles.iter().all(|p| p.header.subelements.is_empty()));
        assert!(ux2.profile_parcels.is_empty());
        assert!(ux2.diagnostics.is_empty());
    }

    #[test]
    fn test_policies_go_to_one_policy_object_profile() {
        let list: PolicyList = serde_json::from_value(json!({
            "listId": Uuid::new_v4(),
            "name": "allowed_urls",
            "type": "urlWhiteList",
            "entries": [{"pattern": "cisco.com"}]
        }))
        .unwrap();
        let site: PolicyList = serde_json::from_value(json!({
            "listId": Uuid::new_v4(),
            "name": "sites",
            "type": "site",
            "entries": [{"siteId": "100"}]
        }))
        .unwrap();
        let url_filtering: PolicyDefinition = serde_json::from_value(json!({
            "definitionId": Uuid::new_v4(),
            "name": "url_filter",
            "type": "urlFiltering",
            "definition": {"webCategoriesAction": "block", "urlWhiteList": {"ref": list.list_id.to_string()}}
        }))
        .unwrap();

        let mut ux1 = UX1Config::default();
        ux1.policies.policy_lists = vec![list.clone(), site.clone()];
        ux1.policies.policy_definitions = vec![url_filtering.clone()];
        let ux2 = transform(&ux1, &SchemaRegistry::default());

        assert_eq!(ux2.feature_profiles.len(), 1);
        let profile = &ux2.feature_profiles[0];
        assert_eq!(profile.profile_type(), Some(ProfileType::PolicyObject));
        assert_eq!(profile.feature_profile.name, POLICY_OBJECT_PROFILE_NAME);
        assert_eq!(
            profile.header.subelements,
            [list.list_id, url_filtering.definition_id].into_iter().collect::<BTreeSet<_>>()
        );
        assert!(ux2
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::ConversionFailed { origin, .. } if *origin == site.list_id)));
        assert!(ux2.parcel(&url_filtering.definition_id).unwrap().parcel.has_associations());
    }
}
