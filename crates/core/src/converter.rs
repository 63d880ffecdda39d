//! Bidirectional conversion between the local patient and the FHIR Patient.
//!
//! Both directions are lossy: fields without a slot on the other side are
//! dropped, never rejected. The only hard failure is building a FHIR
//! resource from a patient that lacks the fields the MPI requires.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::error::ConversionError;
use crate::identifier::IdentifierKind;
use crate::local::{
    LocalPatient, PatientIdentifier, PersonAddress, PersonAttribute, PersonName, Relationship,
};
use crate::marital;
use crate::registry::AttributeTypeRegistry;
use crate::resource::{
    Address, AdministrativeGender, CodeableConcept, ContactPoint, Extension, FhirPatient,
    HumanName, Identifier, PatientContact,
};

/// Extension URL prefix carrying person attributes; the attribute-type name follows
pub const PERSON_ATTRIBUTE_EXTENSION_PREFIX: &str = "urn:crossborder:person-attribute:";

const FHIR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts patients between the host shape and the FHIR wire shape.
///
/// Holds no per-call state; one instance is shared by every request.
#[derive(Clone)]
pub struct PatientConverter {
    attribute_types: Arc<dyn AttributeTypeRegistry>,
}

impl PatientConverter {
    pub fn new(attribute_types: Arc<dyn AttributeTypeRegistry>) -> Self {
        Self { attribute_types }
    }

    /// Build the FHIR Patient for a local patient
    pub fn to_fhir(&self, patient: &LocalPatient) -> Result<FhirPatient, ConversionError> {
        let name: Vec<HumanName> = patient
            .names
            .iter()
            .filter(|n| !n.is_blank())
            .map(human_name)
            .collect();
        if name.is_empty() {
            return Err(ConversionError::MissingName);
        }

        let mut fhir = FhirPatient::new();
        fhir.identifier = identifiers(patient);
        fhir.name = name;
        fhir.telecom = patient
            .telecoms
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
            .map(|t| vec![ContactPoint::new(t)])
            .unwrap_or_default();
        fhir.gender = patient.gender.as_deref().map(fhir_gender);
        fhir.birth_date = patient
            .birthdate
            .map(|b| b.format(FHIR_DATE_FORMAT).to_string());
        fhir.address = patient
            .addresses
            .first()
            .and_then(fhir_address)
            .into_iter()
            .collect();
        fhir.marital_status = patient
            .marital_status
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(marital::to_concept);
        fhir.contact = patient
            .relationships
            .iter()
            .filter_map(patient_contact)
            .collect();
        fhir.extension = patient
            .attributes
            .iter()
            .filter(|a| !a.key.trim().is_empty())
            .map(|a| Extension {
                url: format!("{PERSON_ATTRIBUTE_EXTENSION_PREFIX}{}", a.key.trim()),
                value_string: Some(a.value.clone()),
            })
            .collect();

        Ok(fhir)
    }

    /// Build a local patient from a FHIR Patient.
    ///
    /// Attributes whose type does not resolve against the registry are
    /// removed before the patient is returned.
    pub fn to_local(&self, fhir: &FhirPatient) -> LocalPatient {
        let mut patient = LocalPatient {
            uuid: None,
            identifiers: fhir.identifier.iter().filter_map(patient_identifier).collect(),
            names: fhir.name.iter().filter_map(person_name).collect(),
            gender: fhir.gender.map(|g| local_gender(g).to_string()),
            birthdate: fhir.birth_date.as_deref().and_then(parse_birth_date),
            addresses: fhir.address.iter().filter_map(person_address).collect(),
            telecoms: telecom_values(&fhir.telecom),
            marital_status: fhir.marital_status.as_ref().and_then(marital::from_concept),
            attributes: fhir
                .extension
                .iter()
                .filter_map(|ext| self.person_attribute(ext))
                .collect(),
            relationships: fhir.contact.iter().filter_map(relationship).collect(),
        };

        strip_unresolved_attributes(&mut patient);
        patient
    }

    fn person_attribute(&self, extension: &Extension) -> Option<PersonAttribute> {
        let key = extension
            .url
            .strip_prefix(PERSON_ATTRIBUTE_EXTENSION_PREFIX)?
            .trim();
        let value = extension.value_string.clone()?;
        if key.is_empty() {
            return None;
        }
        Some(PersonAttribute {
            key: key.to_string(),
            value,
            attribute_type: self.attribute_types.resolve(key),
        })
    }
}

/// Remove every person attribute that has no resolved attribute type
pub fn strip_unresolved_attributes(patient: &mut LocalPatient) {
    patient.attributes.retain(|a| a.attribute_type.is_some());
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.and_then(trimmed)
}

fn identifiers(patient: &LocalPatient) -> Vec<Identifier> {
    let mut identifiers = Vec::new();
    for kind in IdentifierKind::ALL {
        for id in patient.identifiers.iter().filter(|id| id.kind == kind) {
            if let Some(value) = trimmed(&id.value) {
                identifiers.push(Identifier {
                    id: Some(kind.label().to_string()),
                    system: Some(kind.system().to_string()),
                    value: Some(value),
                });
            }
        }
    }
    identifiers
}

fn patient_identifier(identifier: &Identifier) -> Option<PatientIdentifier> {
    let value = non_blank(identifier.value.as_deref())?;
    let kind = match identifier.system.as_deref() {
        Some(system) => IdentifierKind::from_system(system, identifier.id.as_deref())?,
        None => IdentifierKind::from_label(identifier.id.as_deref()?)?,
    };
    Some(PatientIdentifier::new(kind, value))
}

fn human_name(name: &PersonName) -> HumanName {
    HumanName {
        family: non_blank(name.family_name.as_deref()),
        given: [name.given_name.as_deref(), name.middle_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect(),
    }
}

fn person_name(name: &HumanName) -> Option<PersonName> {
    let mut given = name.given.iter().map(|g| g.trim()).filter(|g| !g.is_empty());
    let given_name = given.next().map(str::to_string);
    let middle = given.collect::<Vec<_>>().join(" ");

    let person = PersonName {
        given_name,
        middle_name: trimmed(&middle),
        family_name: non_blank(name.family.as_deref()),
    };
    (!person.is_blank()).then_some(person)
}

fn fhir_gender(code: &str) -> AdministrativeGender {
    AdministrativeGender::from_code(code).unwrap_or(AdministrativeGender::Unknown)
}

fn local_gender(gender: AdministrativeGender) -> &'static str {
    match gender {
        AdministrativeGender::Male => "M",
        AdministrativeGender::Female => "F",
        AdministrativeGender::Other => "O",
        AdministrativeGender::Unknown => "U",
    }
}

/// Parse a FHIR date, accepting the partial `YYYY` and `YYYY-MM` forms
fn parse_birth_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let date = match value.len() {
        4 => NaiveDate::parse_from_str(&format!("{value}-01-01"), FHIR_DATE_FORMAT).ok(),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), FHIR_DATE_FORMAT).ok(),
        _ => value
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, FHIR_DATE_FORMAT).ok()),
    }?;
    date.and_hms_opt(0, 0, 0)
}

fn fhir_address(address: &PersonAddress) -> Option<Address> {
    let address = Address {
        city: non_blank(address.city_village.as_deref()),
        state: non_blank(address.state_province.as_deref()),
        country: non_blank(address.country.as_deref()),
    };
    (address != Address::default()).then_some(address)
}

fn person_address(address: &Address) -> Option<PersonAddress> {
    let address = PersonAddress {
        city_village: non_blank(address.city.as_deref()),
        state_province: non_blank(address.state.as_deref()),
        country: non_blank(address.country.as_deref()),
    };
    (address != PersonAddress::default()).then_some(address)
}

fn telecom_values(telecom: &[ContactPoint]) -> Vec<String> {
    telecom
        .iter()
        .filter_map(|t| non_blank(t.value.as_deref()))
        .collect()
}

/// Contacts need a related person name; unnamed relationships are dropped
fn patient_contact(relationship: &Relationship) -> Option<PatientContact> {
    let name = trimmed(&relationship.name)?;

    Some(PatientContact {
        relationship: trimmed(&relationship.relationship_type)
            .map(|t| vec![CodeableConcept::text(t)])
            .unwrap_or_default(),
        name: Some(HumanName {
            family: Some(name),
            given: Vec::new(),
        }),
        telecom: non_blank(relationship.telecom.as_deref())
            .map(|t| vec![ContactPoint::new(t)])
            .unwrap_or_default(),
    })
}

fn relationship(contact: &PatientContact) -> Option<Relationship> {
    let name = contact.name.as_ref().and_then(|n| {
        let parts: Vec<&str> = n
            .given
            .iter()
            .map(String::as_str)
            .chain(n.family.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        trimmed(&parts.join(" "))
    })?;

    let relationship_type = contact
        .relationship
        .iter()
        .find_map(|r| {
            non_blank(r.text.as_deref())
                .or_else(|| r.coding.iter().find_map(|c| non_blank(c.display.as_deref())))
        })
        .unwrap_or_default();

    Some(Relationship {
        relationship_type,
        name,
        telecom: telecom_values(&contact.telecom).into_iter().next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{CROSS_BORDER_ID_SYSTEM_URN, NATIONAL_ID_SYSTEM_URN, SYSTEM_ID_SYSTEM_URN};
    use crate::marital::MARITAL_STATUS_SYSTEM;
    use crate::registry::{AttributeType, InMemoryAttributeTypes};
    use serde_json::json;

    fn converter() -> PatientConverter {
        PatientConverter::new(Arc::new(InMemoryAttributeTypes::new([
            "Telephone contact",
            "Email address",
        ])))
    }

    fn birthdate(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn full_patient() -> LocalPatient {
        LocalPatient {
            uuid: None,
            identifiers: vec![
                PatientIdentifier::new(IdentifierKind::PointOfCareId, "BUSIA-RN-00"),
                PatientIdentifier::new(IdentifierKind::CrossBorderId, "KE-2023-02-7B732"),
                PatientIdentifier::new(IdentifierKind::ClinicNumber, "CN-1001"),
                PatientIdentifier::new(IdentifierKind::NationalId, "098900"),
                PatientIdentifier::new(IdentifierKind::SystemId, "MRN-77"),
            ],
            names: vec![PersonName {
                given_name: Some("Anna".into()),
                middle_name: Some("Wanjiru".into()),
                family_name: Some("Gloria".into()),
            }],
            gender: Some("F".into()),
            birthdate: Some(birthdate(1997, 5, 5)),
            addresses: vec![PersonAddress {
                city_village: Some("Langata".into()),
                state_province: Some("Nairobi".into()),
                country: Some("Kenya".into()),
            }],
            telecoms: vec!["0719999090".into()],
            marital_status: Some("MARRIED POLYGAMOUS".into()),
            attributes: vec![PersonAttribute {
                key: "Telephone contact".into(),
                value: "0719999090".into(),
                attribute_type: Some(AttributeType {
                    name: "Telephone contact".into(),
                }),
            }],
            relationships: vec![Relationship {
                relationship_type: "Spouse".into(),
                name: "Edith Her".into(),
                telecom: Some("0712345678".into()),
            }],
        }
    }

    #[test]
    fn test_round_trip_preserves_mapped_fields() {
        let converter = converter();
        let patient = full_patient();

        let fhir = converter.to_fhir(&patient).unwrap();
        let back = converter.to_local(&fhir);

        assert_eq!(back, patient);
    }

    #[test]
    fn test_to_fhir_wire_shape() {
        let fhir = converter().to_fhir(&full_patient()).unwrap();
        let value = serde_json::to_value(&fhir).unwrap();

        assert_eq!(value["resourceType"], "Patient");
        assert_eq!(value["identifier"][0]["id"], "POINT_OF_CARE_ID");
        assert_eq!(value["identifier"][0]["system"], SYSTEM_ID_SYSTEM_URN);
        assert_eq!(value["identifier"][1]["system"], CROSS_BORDER_ID_SYSTEM_URN);
        assert_eq!(value["identifier"][1]["value"], "KE-2023-02-7B732");
        assert_eq!(value["name"], json!([{"family": "Gloria", "given": ["Anna", "Wanjiru"]}]));
        assert_eq!(value["telecom"], json!([{"value": "0719999090"}]));
        assert_eq!(value["gender"], "female");
        assert_eq!(value["birthDate"], "1997-05-05");
        assert_eq!(
            value["address"],
            json!([{"city": "Langata", "state": "Nairobi", "country": "Kenya"}])
        );
        assert_eq!(
            value["maritalStatus"],
            json!({
                "coding": [{
                    "system": MARITAL_STATUS_SYSTEM,
                    "code": "MARRIED POLYGAMOUS",
                    "display": "Married Polygamous"
                }],
                "text": "Married Polygamous"
            })
        );
        assert_eq!(
            value["contact"],
            json!([{
                "relationship": [{"text": "Spouse"}],
                "name": {"family": "Edith Her"},
                "telecom": [{"value": "0712345678"}]
            }])
        );
    }

    #[test]
    fn test_to_fhir_drops_time_of_day_and_extra_telecoms() {
        let mut patient = full_patient();
        patient.birthdate = NaiveDate::from_ymd_opt(1997, 5, 5).and_then(|d| d.and_hms_opt(13, 45, 0));
        patient.telecoms = vec!["  ".into(), "0700000001".into(), "0700000002".into()];

        let fhir = converter().to_fhir(&patient).unwrap();
        assert_eq!(fhir.birth_date.as_deref(), Some("1997-05-05"));
        assert_eq!(fhir.telecom, vec![ContactPoint::new("0700000001")]);
    }

    #[test]
    fn test_to_fhir_requires_a_name() {
        let mut patient = full_patient();
        patient.names = vec![PersonName::default()];
        assert_eq!(
            converter().to_fhir(&patient),
            Err(ConversionError::MissingName)
        );
    }

    #[test]
    fn test_to_fhir_drops_unnamed_relationship() {
        let mut patient = full_patient();
        patient.relationships.insert(
            0,
            Relationship {
                relationship_type: "Spouse".into(),
                name: " ".into(),
                telecom: Some("0712".into()),
            },
        );
        let expected = patient.relationships.len() - 1;

        let fhir = converter().to_fhir(&patient).unwrap();
        assert_eq!(fhir.contact.len(), expected);
        assert!(fhir.contact.iter().all(|c| c.name.is_some()));
    }

    #[test]
    fn test_to_fhir_skips_blank_identifiers() {
        let mut patient = full_patient();
        patient.identifiers = vec![
            PatientIdentifier::new(IdentifierKind::NationalId, ""),
            PatientIdentifier::new(IdentifierKind::ClinicNumber, "CN-1"),
        ];
        let fhir = converter().to_fhir(&patient).unwrap();
        assert_eq!(fhir.identifier.len(), 1);
        assert_eq!(fhir.identifier[0].id.as_deref(), Some("CLINIC_NUMBER"));
    }

    #[test]
    fn test_gender_vocabulary() {
        assert_eq!(fhir_gender("M"), AdministrativeGender::Male);
        assert_eq!(fhir_gender("female"), AdministrativeGender::Female);
        assert_eq!(fhir_gender("O"), AdministrativeGender::Other);
        assert_eq!(fhir_gender("X"), AdministrativeGender::Unknown);
        assert_eq!(local_gender(AdministrativeGender::Unknown), "U");
    }

    #[test]
    fn test_to_local_drops_unrecognized_identifier_systems() {
        let fhir: FhirPatient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "identifier": [
                {"id": "NATIONAL_ID", "system": "Kenya", "value": "098900"},
                {"system": "urn:oid:9.9.9", "value": "X"},
                {"system": NATIONAL_ID_SYSTEM_URN, "value": "12345678"},
                {"id": "CROSS_BORDER_ID", "value": "KE-2023-02-7B732"},
                {"id": "SOMETHING_ELSE", "value": "nope"}
            ],
            "name": [{"family": "West"}]
        }))
        .unwrap();

        let patient = converter().to_local(&fhir);
        assert_eq!(
            patient.identifiers,
            vec![
                PatientIdentifier::new(IdentifierKind::NationalId, "12345678"),
                PatientIdentifier::new(IdentifierKind::CrossBorderId, "KE-2023-02-7B732"),
            ]
        );
    }

    #[test]
    fn test_to_local_strips_attributes_without_a_type() {
        let fhir: FhirPatient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "extension": [
                {"url": format!("{PERSON_ATTRIBUTE_EXTENSION_PREFIX}Email address"), "valueString": "a@b.ke"},
                {"url": format!("{PERSON_ATTRIBUTE_EXTENSION_PREFIX}Shoe size"), "valueString": "42"},
                {"url": "http://example.org/other", "valueString": "ignored"}
            ]
        }))
        .unwrap();

        let patient = converter().to_local(&fhir);
        assert_eq!(patient.attributes.len(), 1);
        assert_eq!(patient.attributes[0].key, "Email address");
        assert!(patient.attributes.iter().all(|a| a.attribute_type.is_some()));
        assert!(!patient.attributes.iter().any(|a| a.key == "Shoe size"));
    }

    #[test]
    fn test_to_local_accepts_partial_birth_dates() {
        assert_eq!(parse_birth_date("1997"), Some(birthdate(1997, 1, 1)));
        assert_eq!(parse_birth_date("1997-05"), Some(birthdate(1997, 5, 1)));
        assert_eq!(parse_birth_date("1997-05-05T08:00:00Z"), Some(birthdate(1997, 5, 5)));
        assert_eq!(parse_birth_date("05/05/1997"), None);
    }

    #[test]
    fn test_to_local_contact_name_and_coded_relationship() {
        let fhir: FhirPatient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "contact": [
                {
                    "relationship": [{"coding": [{"display": "Next of kin"}]}],
                    "name": {"family": "Otieno", "given": ["James"]}
                },
                {"relationship": [{"text": "Spouse"}]}
            ]
        }))
        .unwrap();

        let patient = converter().to_local(&fhir);
        assert_eq!(
            patient.relationships,
            vec![Relationship {
                relationship_type: "Next of kin".into(),
                name: "James Otieno".into(),
                telecom: None,
            }]
        );
    }

    #[test]
    fn test_strip_unresolved_attributes() {
        let mut patient = full_patient();
        patient.attributes.push(PersonAttribute {
            key: "Legacy field".into(),
            value: "x".into(),
            attribute_type: None,
        });
        strip_unresolved_attributes(&mut patient);
        assert_eq!(patient.attributes.len(), 1);
    }
}
