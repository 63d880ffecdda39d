use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::WireFormatError;
use crate::resource::FhirPatient;

/// FHIR Bundle types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

/// FHIR Bundle resource (simplified for search responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<BundleType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// A single entry in a Bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,
}

impl BundleEntry {
    pub fn new(full_url: Option<String>, resource: JsonValue) -> Self {
        Self {
            full_url,
            resource: Some(resource),
        }
    }
}

impl Bundle {
    pub const RESOURCE_TYPE: &'static str = "Bundle";

    /// Create a searchset bundle
    pub fn searchset(entries: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            bundle_type: Some(BundleType::Searchset),
            total: u32::try_from(entries.len()).ok(),
            entry: entries,
        }
    }

    /// Patient resources carried by this bundle.
    ///
    /// Entries holding any other resource type, or a Patient that does not
    /// decode, are skipped.
    pub fn patients(self) -> Vec<FhirPatient> {
        self.entry
            .into_iter()
            .filter_map(|entry| entry.resource)
            .filter(|resource| {
                resource.get("resourceType").and_then(|t| t.as_str())
                    == Some(FhirPatient::RESOURCE_TYPE)
            })
            .filter_map(|resource| serde_json::from_value(resource).ok())
            .collect()
    }
}

/// A response body from the MPI, decoded by shape.
///
/// The MPI may answer with a Bundle or a bare Patient depending on the
/// deployment. Bundle is tried first, then Patient.
#[derive(Debug)]
pub enum PatientResponse {
    Bundle(Bundle),
    Patient(Box<FhirPatient>),
    Unreadable(WireFormatError),
}

impl PatientResponse {
    pub fn decode(body: &str) -> Self {
        match serde_json::from_str::<Bundle>(body) {
            Ok(bundle) if bundle.resource_type == Bundle::RESOURCE_TYPE => {
                return PatientResponse::Bundle(bundle);
            }
            _ => {}
        }

        match serde_json::from_str::<FhirPatient>(body) {
            Ok(patient) if patient.resource_type == FhirPatient::RESOURCE_TYPE => {
                PatientResponse::Patient(Box::new(patient))
            }
            Ok(other) => PatientResponse::Unreadable(WireFormatError(format!(
                "unexpected resourceType '{}'",
                other.resource_type
            ))),
            Err(e) => PatientResponse::Unreadable(WireFormatError(e.to_string())),
        }
    }

    /// All patients in the response; an unreadable body yields none
    pub fn into_patients(self) -> Vec<FhirPatient> {
        match self {
            PatientResponse::Bundle(bundle) => bundle.patients(),
            PatientResponse::Patient(patient) => vec![*patient],
            PatientResponse::Unreadable(_) => Vec::new(),
        }
    }

    /// The first patient in the response, or the decode failure
    pub fn into_first(self) -> Result<Option<FhirPatient>, WireFormatError> {
        match self {
            PatientResponse::Bundle(bundle) => Ok(bundle.patients().into_iter().next()),
            PatientResponse::Patient(patient) => Ok(Some(*patient)),
            PatientResponse::Unreadable(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::AdministrativeGender;
    use serde_json::json;

    fn patient_json(family: &str) -> JsonValue {
        json!({"resourceType": "Patient", "name": [{"family": family}]})
    }

    #[test]
    fn test_decode_searchset_skips_non_patient_entries() {
        let bundle = Bundle::searchset(vec![
            BundleEntry::new(Some("Patient/1".into()), patient_json("West")),
            BundleEntry::new(
                None,
                json!({"resourceType": "OperationOutcome", "issue": []}),
            ),
            BundleEntry::new(Some("Patient/2".into()), patient_json("Her")),
        ]);
        assert_eq!(bundle.total, Some(3));
        let body = serde_json::to_string(&bundle).unwrap();

        let response = PatientResponse::decode(&body);
        assert!(matches!(response, PatientResponse::Bundle(_)));

        let families: Vec<_> = response
            .into_patients()
            .into_iter()
            .filter_map(|p| p.name.into_iter().next().and_then(|n| n.family))
            .collect();
        assert_eq!(families, vec!["West".to_string(), "Her".to_string()]);
    }

    #[test]
    fn test_decode_falls_back_to_single_patient() {
        let body = patient_json("West").to_string();
        let response = PatientResponse::decode(&body);
        assert!(matches!(response, PatientResponse::Patient(_)));
        assert_eq!(response.into_patients().len(), 1);
    }

    #[test]
    fn test_nonstandard_gender_does_not_drop_the_patient() {
        let mut in_bundle = patient_json("West");
        in_bundle["gender"] = json!("F");
        let body = serde_json::to_string(&Bundle::searchset(vec![BundleEntry::new(None, in_bundle)]))
            .unwrap();
        let patients = PatientResponse::decode(&body).into_patients();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].gender, Some(AdministrativeGender::Female));

        let mut bare = patient_json("Her");
        bare["gender"] = json!("Femme");
        let response = PatientResponse::decode(&bare.to_string());
        assert!(matches!(response, PatientResponse::Patient(_)));
        let patient = response.into_first().unwrap().unwrap();
        assert_eq!(patient.gender, None);
        assert_eq!(patient.name[0].family.as_deref(), Some("Her"));
    }

    #[test]
    fn test_empty_bundle_has_no_first_patient() {
        let body = json!({"resourceType": "Bundle", "type": "searchset", "total": 0}).to_string();
        assert!(PatientResponse::decode(&body).into_first().unwrap().is_none());
    }

    #[test]
    fn test_malformed_bodies_are_unreadable() {
        for body in [
            "not json at all",
            "",
            r#"{"resourceType": "OperationOutcome"}"#,
            r#"{"resourceType": "Patient", "name": "not-a-list"}"#,
            "[1, 2, 3]",
        ] {
            let response = PatientResponse::decode(body);
            assert!(
                matches!(response, PatientResponse::Unreadable(_)),
                "expected unreadable for {body:?}"
            );
            assert!(response.into_patients().is_empty());
        }
    }

    #[test]
    fn test_unreadable_first_is_an_error() {
        assert!(PatientResponse::decode("<html/>").into_first().is_err());
    }
}
