//! Inbound record validation.

use casfetch_types::{Ingredient, RawIngredient, RegistryNumber};
use tracing::{debug, info};

/// Keep only records carrying a well-formed registry number.
///
/// Records without a number, or with a malformed one, are dropped before
/// they can reach the resolver. Order is preserved.
pub fn validate_ingredients(raw: Vec<RawIngredient>) -> Vec<Ingredient> {
    let total = raw.len();
    let mut missing = 0usize;
    let mut malformed = 0usize;

    let valid: Vec<Ingredient> = raw
        .into_iter()
        .filter_map(|record| {
            let Some(text) = record.registry_number.as_deref().map(str::trim).filter(|text| !text.is_empty()) else {
                missing += 1;
                return None;
            };
            match RegistryNumber::parse(text) {
                Ok(registry_number) => Some(Ingredient {
                    name: record.name,
                    registry_number,
                    function: record.function,
                }),
                Err(error) => {
                    debug!(name = %record.name, %error, "dropping record");
                    malformed += 1;
                    None
                }
            }
        })
        .collect();

    info!(total, kept = valid.len(), missing, malformed, "validated input records");
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, rn: Option<&str>) -> RawIngredient {
        RawIngredient {
            name: name.into(),
            registry_number: rn.map(Into::into),
            function: None,
        }
    }

    #[test]
    fn drops_missing_and_malformed_numbers() {
        let kept = validate_ingredients(vec![
            raw("FORMALDEHYDE", Some("50-00-0")),
            raw("UNKNOWN", None),
            raw("BLANK", Some("  ")),
            raw("BROKEN", Some("50-00")),
            raw("WATER", Some(" 7732-18-5 ")),
        ]);
        let names: Vec<_> = kept.iter().map(|ingredient| ingredient.name.as_str()).collect();
        assert_eq!(names, ["FORMALDEHYDE", "WATER"]);
        assert_eq!(kept[1].registry_number.as_str(), "7732-18-5");
    }
}
