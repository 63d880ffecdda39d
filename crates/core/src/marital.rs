//! Marital-status vocabulary shared with the MPI

use crate::resource::{CodeableConcept, Coding};

/// Coding system for marital status
pub const MARITAL_STATUS_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus";

/// Marital statuses the MPI recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    MarriedPolygamous,
    MarriedMonogamous,
    Divorced,
    Widowed,
    LivingWithPartner,
    NeverMarried,
    Separated,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 7] = [
        MaritalStatus::MarriedPolygamous,
        MaritalStatus::MarriedMonogamous,
        MaritalStatus::Divorced,
        MaritalStatus::Widowed,
        MaritalStatus::LivingWithPartner,
        MaritalStatus::NeverMarried,
        MaritalStatus::Separated,
    ];

    /// Host code, also used as the coded term on the wire
    pub fn code(self) -> &'static str {
        match self {
            MaritalStatus::MarriedPolygamous => "MARRIED POLYGAMOUS",
            MaritalStatus::MarriedMonogamous => "MARRIED MONOGAMOUS",
            MaritalStatus::Divorced => "DIVORCED",
            MaritalStatus::Widowed => "WIDOWED",
            MaritalStatus::LivingWithPartner => "LIVING WITH PARTNER",
            MaritalStatus::NeverMarried => "NEVER MARRIED",
            MaritalStatus::Separated => "SEPARATED",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            MaritalStatus::MarriedPolygamous => "Married Polygamous",
            MaritalStatus::MarriedMonogamous => "Married Monogamous",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
            MaritalStatus::LivingWithPartner => "Living With Partner",
            MaritalStatus::NeverMarried => "Never Married",
            MaritalStatus::Separated => "Separated",
        }
    }

    /// Look up a host code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(code))
    }
}

/// Build the wire concept for a host marital-status code.
///
/// Unrecognized codes travel as text only, without a coded term.
pub fn to_concept(code: &str) -> CodeableConcept {
    match MaritalStatus::from_code(code) {
        Some(status) => CodeableConcept {
            coding: vec![Coding {
                system: Some(MARITAL_STATUS_SYSTEM.to_string()),
                code: Some(status.code().to_string()),
                display: Some(status.display().to_string()),
            }],
            text: Some(status.display().to_string()),
        },
        None => CodeableConcept::text(code.trim()),
    }
}

/// Recover the host marital-status code from a wire concept
pub fn from_concept(concept: &CodeableConcept) -> Option<String> {
    let coded = concept
        .coding
        .iter()
        .filter(|c| c.system.as_deref().is_none_or(|s| s == MARITAL_STATUS_SYSTEM))
        .filter_map(|c| c.code.as_deref())
        .find_map(MaritalStatus::from_code);

    if let Some(status) = coded {
        return Some(status.code().to_string());
    }

    let text = concept.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    match MaritalStatus::ALL
        .into_iter()
        .find(|status| status.display().eq_ignore_ascii_case(text))
    {
        Some(status) => Some(status.code().to_string()),
        None => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_married_polygamous_coding() {
        let concept = to_concept("MARRIED POLYGAMOUS");
        assert_eq!(
            concept.coding,
            vec![Coding {
                system: Some(MARITAL_STATUS_SYSTEM.to_string()),
                code: Some("MARRIED POLYGAMOUS".to_string()),
                display: Some("Married Polygamous".to_string()),
            }]
        );
        assert_eq!(concept.text.as_deref(), Some("Married Polygamous"));
    }

    #[test]
    fn test_unrecognized_code_is_text_only() {
        let concept = to_concept("Engaged");
        assert!(concept.coding.is_empty());
        assert_eq!(concept.text.as_deref(), Some("Engaged"));
        assert_eq!(from_concept(&concept).as_deref(), Some("Engaged"));
    }

    #[test]
    fn test_from_concept_prefers_coded_term() {
        for status in MaritalStatus::ALL {
            assert_eq!(from_concept(&to_concept(status.code())).as_deref(), Some(status.code()));
        }
    }

    #[test]
    fn test_from_concept_matches_display_text() {
        let concept = CodeableConcept::text("never married");
        assert_eq!(from_concept(&concept).as_deref(), Some("NEVER MARRIED"));
        assert_eq!(from_concept(&CodeableConcept::default()), None);
    }
}
