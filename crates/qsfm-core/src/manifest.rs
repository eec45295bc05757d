//! Declared cargo mass from free-text manifests.
//!
//! Only `<number>kg` tokens are understood. The number is the longest leading
//! numeric prefix of the text before `kg`, so `12,5kg` reads as 12. Everything
//! else in a declaration is ignored, and a manifest with no usable token
//! declares 0.0 kg.

/// Unit marker recognized inside a whitespace-delimited token.
const KG: &str = "kg";

/// Extract one declared mass per manifest, in input order.
pub fn extract_weights<S: AsRef<str>>(manifests: &[S]) -> Vec<f64> {
    manifests.iter().map(|m| declared_mass(m.as_ref())).collect()
}

/// Declared mass of a single manifest.
///
/// Tokens are scanned left to right and every parseable `kg` token overwrites
/// the previous one, so the last one wins.
pub fn declared_mass(manifest: &str) -> f64 {
    let mut weight = 0.0;
    for token in manifest.split_whitespace() {
        let Some(pos) = token.find(KG) else {
            continue;
        };
        match leading_number(&token[..pos]) {
            Some(v) if v.is_finite() && v >= 0.0 => weight = v,
            _ => log::debug!("skipping unparseable mass token {token:?}"),
        }
    }
    weight
}

/// Longest prefix of `s` that parses as an `f64`.
fn leading_number(s: &str) -> Option<f64> {
    (1..=s.len())
        .rev()
        .filter(|&end| s.is_char_boundary(end))
        .find_map(|end| s[..end].parse::<f64>().ok())
}

/// Mean absolute difference between sensor-implied and declared masses.
///
/// Returns 0.0 when there is nothing to compare.
pub fn mean_mass_mismatch(grav: &[f64], weights: &[f64], mass_calibration: f64) -> f64 {
    let n = grav.len().min(weights.len());
    if n == 0 {
        return 0.0;
    }
    let total: f64 = grav
        .iter()
        .zip(weights)
        .map(|(g, w)| (g * mass_calibration - w).abs())
        .sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_kg_token() {
        assert_eq!(declared_mass("cargo: electronics 50kg"), 50.0);
    }

    #[test]
    fn no_unit_is_zero() {
        assert_eq!(declared_mass("no unit here"), 0.0);
        assert_eq!(declared_mass(""), 0.0);
    }

    #[test]
    fn last_token_wins() {
        assert_eq!(declared_mass("10kg 20kg"), 20.0);
        assert_eq!(declared_mass("20kg 10kg"), 10.0);
    }

    #[test]
    fn unparseable_token_keeps_previous() {
        assert_eq!(declared_mass("12.5kg heavykg"), 12.5);
        assert_eq!(declared_mass("kg"), 0.0);
        assert_eq!(declared_mass("about:50kg"), 0.0);
    }

    #[test]
    fn suffix_after_unit_is_ignored() {
        assert_eq!(declared_mass("pallet 75kgs"), 75.0);
        assert_eq!(declared_mass("3.5kg."), 3.5);
    }

    #[test]
    fn leading_number_before_unit_is_read() {
        assert_eq!(declared_mass("12,5kg"), 12.0);
        assert_eq!(declared_mass("10kg 1,200kg"), 1.0);
        assert_eq!(declared_mass("7x9kg"), 7.0);
        assert_eq!(declared_mass("1e3kg"), 1000.0);
        assert_eq!(declared_mass("2.5e-kg"), 2.5);
    }

    #[test]
    fn negative_mass_is_skipped() {
        assert_eq!(declared_mass("5kg -3kg"), 5.0);
    }

    #[test]
    fn extract_preserves_order_and_length() {
        let manifests = ["a 1kg", "nothing", "b 2kg c 3kg"];
        assert_eq!(extract_weights(&manifests), vec![1.0, 0.0, 3.0]);

        let owned: Vec<String> = manifests.iter().map(|s| s.to_string()).collect();
        assert_eq!(extract_weights(&owned).len(), 3);
    }

    #[test]
    fn mean_mismatch_against_gravimetric_mass() {
        let grav = [5e-5, 5e-5];
        let weights = [50.0, 5.0];
        let m = mean_mass_mismatch(&grav, &weights, 1e5);
        assert!((m - 22.5).abs() < 1e-9);
        assert_eq!(mean_mass_mismatch(&[], &[], 1e5), 0.0);
    }
}
