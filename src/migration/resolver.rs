use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Diagnostic, Diagnostics, OptionValue, Parcel, ParcelType};
use crate::utils::is_uuid;

/// Parcels created so far in one feature profile, by type and name.
/// Names are only unique within a parcel type.
#[derive(Debug, Clone, Default)]
pub struct AssociableParcels(HashMap<(ParcelType, String), Uuid>);

enum Lookup {
    Found(Uuid),
    Missing,
    Ambiguous(Vec<ParcelType>),
}

impl AssociableParcels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parcel_type: ParcelType, name: &str, id: Uuid) {
        self.0.insert((parcel_type, name.to_string()), id);
    }

    pub fn get(&self, parcel_type: ParcelType, name: &str) -> Option<Uuid> {
        self.0.get(&(parcel_type, name.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// With a known target type only that type matches; otherwise the name must be unique
    fn lookup(&self, target: Option<ParcelType>, name: &str) -> Lookup {
        if let Some(parcel_type) = target {
            return self.get(parcel_type, name).map_or(Lookup::Missing, Lookup::Found);
        }
        let mut matches: Vec<(ParcelType, Uuid)> = self
            .0
            .iter()
            .filter(|((_, n), _)| n == name)
            .map(|((t, _), id)| (*t, *id))
            .collect();
        match matches.len() {
            0 => Lookup::Missing,
            1 => Lookup::Found(matches[0].1),
            _ => {
                matches.sort();
                Lookup::Ambiguous(matches.into_iter().map(|(t, _)| t).collect())
            }
        }
    }
}

/// Rewrite by-name references of `parcel` to the ids of already created parcels.
///
/// Absent, default, variable and UUID-valued references are left alone. A name
/// with no created parcel of the expected type, or one matching several types,
/// is set to the "no value" default and reported; this never fails.
pub fn resolve_associations(parcel: &mut Parcel, created: &AssociableParcels, diagnostics: &mut Diagnostics) {
    let parcel_type = parcel.parcel_type();
    let parcel_name = parcel.name().to_string();
    let mut unresolved = Vec::new();

    parcel.for_each_reference_mut(|field, target, item| {
        let name = match &item.ref_id {
            OptionValue::Global(Value::String(name)) if !name.is_empty() && !is_uuid(name) => name.clone(),
            _ => return,
        };
        match created.lookup(target, &name) {
            Lookup::Found(id) => {
                tracing::debug!("Resolved {} '{}' to {}", field, name, id);
                item.set(id.to_string());
            }
            Lookup::Missing => {
                item.clear();
                unresolved.push((field.to_string(), name, None));
            }
            Lookup::Ambiguous(candidates) => {
                item.clear();
                unresolved.push((field.to_string(), name, Some(candidates)));
            }
        }
    });

    for (field, value, candidates) in unresolved {
        diagnostics.push(match candidates {
            None => Diagnostic::UnresolvedReference {
                field,
                value,
                parcel_type,
                parcel_name: parcel_name.clone(),
            },
            Some(candidates) => Diagnostic::AmbiguousReference {
                field,
                value,
                parcel_type,
                parcel_name: parcel_name.clone(),
                candidates,
            },
        });
    }
}
