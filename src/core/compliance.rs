//! Compliance verdict
//!
//! A keyword search over the model's free-text report. It does not check the
//! report structure at all, and a sentence like "the shelf is not perfect"
//! still counts as compliant. Callers go through [`classify_compliance`] only,
//! so the heuristic can be replaced by a structured verdict in one place.

use crate::models::types::ComplianceStatus;
use crate::utils::constants::COMPLIANCE_MARKERS;

/// `Perfect` iff the report mentions any compliance marker, case-insensitively.
pub fn classify_compliance(analysis: &str) -> ComplianceStatus {
    let upper = analysis.to_uppercase();
    if COMPLIANCE_MARKERS.iter().any(|marker| upper.contains(marker)) {
        ComplianceStatus::Perfect
    } else {
        ComplianceStatus::Issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(
            classify_compliance("All items match — EXEMPLARY layout"),
            ComplianceStatus::Perfect
        );
        assert_eq!(
            classify_compliance("✅ COMPLIANCE STATUS: PERFECT - The shelf matches"),
            ComplianceStatus::Perfect
        );
        assert_eq!(classify_compliance("3 items missing"), ComplianceStatus::Issues);
        assert_eq!(classify_compliance(""), ComplianceStatus::Issues);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_compliance("a perfect shelf"), ComplianceStatus::Perfect);
        assert_eq!(classify_compliance("Exemplary."), ComplianceStatus::Perfect);
        assert_eq!(classify_compliance("imperfections noted"), ComplianceStatus::Perfect);
    }

    #[test]
    fn test_negated_mention_still_matches() {
        // Known weakness of the keyword heuristic
        assert_eq!(
            classify_compliance("The shelf is not perfect: Pepsi is missing"),
            ComplianceStatus::Perfect
        );
    }
}
