//! Local patient aggregate, as held by the host records platform.
//!
//! These values are borrowed from and handed back to the host per call;
//! nothing here is cached.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifier::IdentifierKind;
use crate::registry::AttributeType;

/// Patient record in the host platform's shape
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalPatient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,

    #[serde(default)]
    pub identifiers: Vec<PatientIdentifier>,

    #[serde(default)]
    pub names: Vec<PersonName>,

    /// Host gender code (`M`, `F`, `O`, `U`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDateTime>,

    #[serde(default)]
    pub addresses: Vec<PersonAddress>,

    #[serde(default)]
    pub telecoms: Vec<String>,

    /// Host marital-status code, e.g. `MARRIED POLYGAMOUS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,

    #[serde(default)]
    pub attributes: Vec<PersonAttribute>,

    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl LocalPatient {
    /// First identifier value of the given kind
    pub fn identifier(&self, kind: IdentifierKind) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.value.as_str())
    }

    /// The MPI-assigned cross-border ID, if one has been issued
    pub fn cross_border_id(&self) -> Option<&str> {
        self.identifier(IdentifierKind::CrossBorderId)
    }

    /// Preferred (first) name
    pub fn person_name(&self) -> Option<&PersonName> {
        self.names.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdentifier {
    pub kind: IdentifierKind,
    pub value: String,
}

impl PatientIdentifier {
    pub fn new(kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

impl PersonName {
    /// Full name in host order: given, middle, family
    pub fn full_name(&self) -> String {
        [&self.given_name, &self.middle_name, &self.family_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_blank(&self) -> bool {
        self.full_name().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Typed key-value extension on a person.
///
/// `attribute_type` is `None` until the key resolves against the
/// attribute-type registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonAttribute {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
}

/// Relationship to another person, e.g. spouse or next of kin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telecom: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_skips_missing_parts() {
        let name = PersonName {
            given_name: Some("Gloria".into()),
            middle_name: None,
            family_name: Some("West".into()),
        };
        assert_eq!(name.full_name(), "Gloria West");
        assert!(PersonName::default().is_blank());
    }

    #[test]
    fn test_deserialize_from_facade_json() {
        let json = r#"{
            "identifiers": [{"kind": "NATIONAL_ID", "value": "098900"}],
            "names": [{"givenName": "Gloria", "familyName": "West"}],
            "gender": "F",
            "birthdate": "1997-05-05T00:00:00"
        }"#;
        let patient: LocalPatient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.identifier(IdentifierKind::NationalId), Some("098900"));
        assert_eq!(patient.cross_border_id(), None);
        assert_eq!(patient.person_name().unwrap().full_name(), "Gloria West");
        assert!(patient.relationships.is_empty());
    }
}
