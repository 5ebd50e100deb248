use std::collections::{BTreeSet, HashMap, HashSet};
use uuid::Uuid;

use crate::models::{Diagnostic, HeaderType, Parcel, ParcelType, TransformHeader, UX2Config};

/// Drop parcels whose origin was already transformed, keeping the first
fn remove_duplicates(ux2: &mut UX2Config) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(ux2.profile_parcels.len());
    for parcel in ux2.profile_parcels.drain(..) {
        if seen.insert(parcel.header.origin) {
            kept.push(parcel);
        } else {
            ux2.diagnostics.push(Diagnostic::DuplicateParcel {
                origin: parcel.header.origin,
                name: parcel.parcel.name().to_string(),
            });
        }
    }
    ux2.profile_parcels = kept;
}

/// Interfaces under a transport or management VPN take that VPN's interface type.
/// An interface found under VPNs of different kinds keeps its type.
fn retag_vpn_interfaces(ux2: &mut UX2Config) {
    let mut parents: HashMap<Uuid, BTreeSet<ParcelType>> = HashMap::new();
    for vpn in ux2.profile_parcels.iter().filter(|p| p.parcel.parcel_type().is_vpn()) {
        for child in &vpn.header.subelements {
            parents.entry(*child).or_default().insert(vpn.parcel.parcel_type());
        }
    }

    for transformed in ux2.profile_parcels.iter_mut() {
        let Some(vpn_types) = parents.get(&transformed.header.origin) else {
            continue;
        };
        let Parcel::Generic(parcel) = &mut transformed.parcel else {
            continue;
        };
        if vpn_types.len() > 1 {
            ux2.diagnostics.push(Diagnostic::ConflictingVpnParents {
                interface: transformed.header.origin,
                vpn_types: vpn_types.iter().copied().collect(),
            });
            continue;
        }
        let Some(vpn) = vpn_types.first() else {
            continue;
        };
        let retagged = parcel.parcel_type.under_vpn(*vpn);
        if retagged != parcel.parcel_type {
            parcel.parcel_type = retagged;
            transformed.header.header_type = HeaderType::Parcel(retagged);
        }
    }
}

fn prune(header: &mut TransformHeader, known: &HashSet<Uuid>, dangling: &mut Vec<Diagnostic>) {
    let owner = header.origin;
    header.subelements.retain(|id| {
        let keep = known.contains(id);
        if !keep {
            dangling.push(Diagnostic::DanglingSubelement { owner, subelement: *id });
        }
        keep
    });
}

/// Merge transformed parcels into a consistent graph: one parcel per origin, interfaces
/// typed after their VPN, and no header pointing at something that was not transformed.
pub fn merge_parcels(ux2: &mut UX2Config) {
    remove_duplicates(ux2);
    retag_vpn_interfaces(ux2);

    let parcel_origins: HashSet<Uuid> = ux2.profile_parcels.iter().map(|p| p.header.origin).collect();
    let profile_origins: HashSet<Uuid> = ux2.feature_profiles.iter().map(|p| p.header.origin).collect();

    let mut dangling = Vec::new();
    for profile in ux2.feature_profiles.iter_mut() {
        prune(&mut profile.header, &parcel_origins, &mut dangling);
    }
    for parcel in ux2.profile_parcels.iter_mut() {
        prune(&mut parcel.header, &parcel_origins, &mut dangling);
    }
    for group in ux2.config_groups.iter_mut() {
        prune(&mut group.header, &profile_origins, &mut dangling);
    }
    for diagnostic in dangling {
        ux2.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenericParcel, ProfileType, TransformedFeatureProfile, TransformedParcel};

    fn parcel(origin: Uuid, parcel_type: ParcelType, name: &str) -> TransformedParcel {
        TransformedParcel::new(origin, Parcel::Generic(GenericParcel::new(parcel_type, name, "")))
    }

    #[test]
    fn test_duplicates_keep_the_first() {
        let origin = Uuid::new_v4();
        let mut ux2 = UX2Config::default();
        ux2.profile_parcels.push(parcel(origin, ParcelType::Banner, "first"));
        ux2.profile_parcels.push(parcel(origin, ParcelType::Banner, "second"));

        merge_parcels(&mut ux2);

        assert_eq!(ux2.profile_parcels.len(), 1);
        assert_eq!(ux2.profile_parcels[0].parcel.name(), "first");
        assert_eq!(
            ux2.diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::DuplicateParcel { origin, name: "second".into() }]
        );
    }

    #[test]
    fn test_dangling_subelements_are_pruned() {
        let banner = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let mut profile = TransformedFeatureProfile::new(ProfileType::System, Uuid::new_v4(), "sys".into(), "");
        profile.header.subelements.extend([banner, missing]);

        let mut ux2 = UX2Config::default();
        ux2.feature_profiles.push(profile);
        ux2.profile_parcels.push(parcel(banner, ParcelType::Banner, "banner"));

        merge_parcels(&mut ux2);

        let subelements = &ux2.feature_profiles[0].header.subelements;
        assert!(subelements.contains(&banner));
        assert!(!subelements.contains(&missing));
        assert!(ux2
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::DanglingSubelement { subelement, .. } if *subelement == missing)));
    }

    #[test]
    fn test_interfaces_take_the_type_of_their_vpn() {
        let vpn = Uuid::new_v4();
        let wan_if = Uuid::new_v4();
        let mut ux2 = UX2Config::default();
        ux2.profile_parcels
            .push(parcel(vpn, ParcelType::ManagementVpn, "vpn512").with_subelements([wan_if].into_iter().collect()));
        ux2.profile_parcels
            .push(parcel(wan_if, ParcelType::LanInterfaceEthernet, "mgmt"));

        merge_parcels(&mut ux2);

        let iface = ux2.parcel(&wan_if).unwrap();
        assert_eq!(iface.parcel.parcel_type(), ParcelType::ManagementInterfaceEthernet);
        assert_eq!(
            iface.header.header_type,
            HeaderType::Parcel(ParcelType::ManagementInterfaceEthernet)
        );
    }

    #[test]
    fn test_interface_under_vpns_of_different_kinds_is_not_retagged() {
        let wan = Uuid::new_v4();
        let lan = Uuid::new_v4();
        let shared = Uuid::new_v4();
        let mut ux2 = UX2Config::default();
        ux2.profile_parcels
            .push(parcel(wan, ParcelType::WanVpn, "vpn0").with_subelements([shared].into_iter().collect()));
        ux2.profile_parcels
            .push(parcel(lan, ParcelType::LanVpn, "vpn10").with_subelements([shared].into_iter().collect()));
        ux2.profile_parcels
            .push(parcel(shared, ParcelType::LanInterfaceEthernet, "ge0"));

        merge_parcels(&mut ux2);

        assert_eq!(ux2.parcel(&shared).unwrap().parcel.parcel_type(), ParcelType::LanInterfaceEthernet);
        assert_eq!(
            ux2.diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::ConflictingVpnParents {
                interface: shared,
                vpn_types: vec![ParcelType::WanVpn, ParcelType::LanVpn],
            }]
        );
    }

    #[test]
    fn test_same_interface_under_two_wan_vpns_is_retagged() {
        let shared = Uuid::new_v4();
        let mut ux2 = UX2Config::default();
        for name in ["vpn0_a", "vpn0_b"] {
            ux2.profile_parcels.push(
                parcel(Uuid::new_v4(), ParcelType::WanVpn, name).with_subelements([shared].into_iter().collect()),
            );
        }
        ux2.profile_parcels
            .push(parcel(shared, ParcelType::LanInterfaceEthernet, "ge0"));

        merge_parcels(&mut ux2);

        assert_eq!(ux2.parcel(&shared).unwrap().parcel.parcel_type(), ParcelType::WanInterfaceEthernet);
        assert!(ux2.diagnostics.is_empty());
    }
}
