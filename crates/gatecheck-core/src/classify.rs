//! Sample/fixture classification from in-payload markers.
//!
//! The marker lives inside the payload, never in the filename or directory
//! name: a relocated or renamed fixture still classifies as sample, because
//! the payload content is what gets hashed and reviewed.

use serde_json::Value;

/// Whether a payload is real promotion evidence or synthetic fixture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Real,
    Sample,
}

/// Classify a parsed artifact payload.
///
/// Only an explicit `"is_sample": true` marks a payload as sample; a missing
/// or non-boolean marker classifies as real.
pub fn classify(payload: &Value) -> Provenance {
    match payload.get("is_sample").and_then(Value::as_bool) {
        Some(true) => Provenance::Sample,
        _ => Provenance::Real,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Provenance};
    use serde_json::json;

    #[test]
    fn explicit_marker_classifies_as_sample() {
        assert_eq!(
            classify(&json!({"is_sample": true, "ranked_runs": []})),
            Provenance::Sample
        );
    }

    #[test]
    fn absent_or_false_marker_classifies_as_real() {
        assert_eq!(classify(&json!({"ranked_runs": []})), Provenance::Real);
        assert_eq!(
            classify(&json!({"is_sample": false, "ranked_runs": []})),
            Provenance::Real
        );
        // Non-boolean markers do not count as sample; the schema validator
        // flags the type error separately.
        assert_eq!(
            classify(&json!({"is_sample": "yes"})),
            Provenance::Real
        );
    }
}
