//! Choosing one representative registry number for a resolved compound.

use casfetch_types::{Cid, RegistryAssociation, RegistryNumber};
use indexmap::IndexMap;
use tracing::debug;

/// Pick the registry number that best represents the candidates.
///
/// Rules, first match wins:
///
/// 1. an association equal to `original`;
/// 2. the only preferred association of the only candidate that has
///    exactly one preferred association;
/// 3. the shortest number, then the smallest leading segment. Remaining
///    ties fall to the lexically smallest number, then the smallest id.
///
/// Returns `None` when no candidate has any association.
pub fn choose(associations: &IndexMap<Cid, Vec<RegistryAssociation>>, original: &str) -> Option<(Cid, RegistryNumber)> {
    let original = original.trim();
    for (cid, list) in associations {
        if let Some(found) = list.iter().find(|association| association.registry_number.as_str() == original) {
            debug!(%cid, rn = %found.registry_number, "kept input registry number");
            return Some((*cid, found.registry_number.clone()));
        }
    }

    let mut single_preferred = associations.iter().filter_map(|(cid, list)| {
        let mut preferred = list.iter().filter(|association| association.is_preferred());
        match (preferred.next(), preferred.next()) {
            (Some(only), None) => Some((*cid, &only.registry_number)),
            _ => None,
        }
    });
    if let (Some((cid, rn)), None) = (single_preferred.next(), single_preferred.next()) {
        debug!(%cid, %rn, "single preferred registry number");
        return Some((cid, rn.clone()));
    }

    let (cid, rn) = associations
        .iter()
        .flat_map(|(cid, list)| list.iter().map(move |association| (*cid, &association.registry_number)))
        .min_by(|(left_cid, left), (right_cid, right)| {
            (left.as_str().len(), left.leading_segment(), left.as_str(), left_cid).cmp(&(
                right.as_str().len(),
                right.leading_segment(),
                right.as_str(),
                right_cid,
            ))
        })?;
    debug!(%cid, %rn, "shortest registry number");
    Some((cid, rn.clone()))
}
