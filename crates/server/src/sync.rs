//! Patient synchronization with the Master Patient Index.
//!
//! Combines the [`PatientConverter`] with a [`Gateway`]. The service keeps no
//! state between calls, so a single instance serves every request.

use crossborder_core::identifier::{
    CLINIC_NUMBER_SYSTEM_URN, CROSS_BORDER_ID_SYSTEM_URN, NATIONAL_ID_SYSTEM_URN,
};
use crossborder_core::{
    ConversionError, FhirPatient, LocalPatient, PatientConverter, PatientResponse,
    WireFormatError,
};
use serde::Deserialize;
use thiserror::Error;
use url::form_urlencoded::byte_serialize;

use crate::gateway::{Gateway, HttpGateway, TransportError};

/// MPI path for Patient reads and writes
pub const PATIENT_PATH: &str = "Patient";

/// MPI path for free-text search
pub const SEARCH_PATH: &str = "search";

/// Failure of an MPI synchronization operation
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    WireFormat(#[from] WireFormatError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to serialize Patient: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Structured patient search; unset fields add no query term
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearch {
    pub cb_id: Option<String>,
    pub clinic_no: Option<String>,
    pub national_id: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
}

impl PatientSearch {
    /// Build the MPI query string.
    ///
    /// Identifier terms are sent as `identifier=<system>|<value>`; every value
    /// is form-urlencoded.
    pub fn to_query(&self) -> String {
        let identifiers = [
            (CROSS_BORDER_ID_SYSTEM_URN, &self.cb_id),
            (CLINIC_NUMBER_SYSTEM_URN, &self.clinic_no),
            (NATIONAL_ID_SYSTEM_URN, &self.national_id),
        ]
        .into_iter()
        .filter_map(|(system, value)| {
            value
                .as_deref()
                .map(|v| format!("identifier={}", encode(&format!("{system}|{v}"))))
        });

        let plain = [("name", &self.name), ("gender", &self.gender)]
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| format!("{key}={}", encode(v))));

        identifiers.chain(plain).collect::<Vec<_>>().join("&")
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// MPI sync operations over a gateway
pub struct MpiSyncService<G = HttpGateway> {
    gateway: G,
    converter: PatientConverter,
}

impl<G: Gateway> MpiSyncService<G> {
    pub fn new(gateway: G, converter: PatientConverter) -> Self {
        Self { gateway, converter }
    }

    /// Free-text search by name.
    ///
    /// An unreadable response yields an empty list.
    pub async fn search_by_term(&self, term: &str) -> Result<Vec<LocalPatient>, SyncError> {
        let query = format!("name={}", encode(term));
        let body = self.gateway.get(SEARCH_PATH, &query).await?;
        Ok(self.decode_many(&body))
    }

    /// Structured search by identifiers, name, and gender.
    ///
    /// An unreadable response yields an empty list.
    pub async fn search_by_params(
        &self,
        search: &PatientSearch,
    ) -> Result<Vec<LocalPatient>, SyncError> {
        let body = self.gateway.get(PATIENT_PATH, &search.to_query()).await?;
        Ok(self.decode_many(&body))
    }

    /// Look up a patient by cross-border ID.
    ///
    /// `Ok(None)` means the MPI answered without a matching Patient.
    pub async fn lookup_by_cross_border_id(
        &self,
        cross_border_id: &str,
    ) -> Result<Option<LocalPatient>, SyncError> {
        let query = format!("identifier={}", encode(cross_border_id));
        let body = self.gateway.get(PATIENT_PATH, &query).await?;
        let patient = PatientResponse::decode(&body).into_first()?;
        Ok(patient.map(|p| self.converter.to_local(&p)))
    }

    /// Fail-soft lookup for existence checks: any failure reads as "absent"
    pub async fn find_by_cross_border_id(&self, cross_border_id: &str) -> Option<LocalPatient> {
        match self.lookup_by_cross_border_id(cross_border_id).await {
            Ok(patient) => patient,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cross_border_id = cross_border_id,
                    "Cross-border lookup failed, treating patient as absent"
                );
                None
            }
        }
    }

    /// Register a patient with the MPI and return the MPI's copy
    pub async fn create(&self, patient: &LocalPatient) -> Result<LocalPatient, SyncError> {
        let payload = self.payload(patient)?;
        let body = self.gateway.post(PATIENT_PATH, payload).await?;
        self.decode_one(&body)
    }

    /// Replace the MPI record identified by `cross_border_id`
    pub async fn update(
        &self,
        patient: &LocalPatient,
        cross_border_id: &str,
    ) -> Result<LocalPatient, SyncError> {
        let payload = self.payload(patient)?;
        let query = format!("crossBorderId={}", encode(cross_border_id));
        let body = self.gateway.put(PATIENT_PATH, &query, payload).await?;
        self.decode_one(&body)
    }

    fn payload(&self, patient: &LocalPatient) -> Result<String, SyncError> {
        let fhir: FhirPatient = self.converter.to_fhir(patient)?;
        Ok(serde_json::to_string(&fhir)?)
    }

    fn decode_many(&self, body: &str) -> Vec<LocalPatient> {
        let response = PatientResponse::decode(body);
        if let PatientResponse::Unreadable(e) = &response {
            tracing::warn!(error = %e, "Discarding unreadable MPI search response");
        }
        response
            .into_patients()
            .iter()
            .map(|p| self.converter.to_local(p))
            .collect()
    }

    fn decode_one(&self, body: &str) -> Result<LocalPatient, SyncError> {
        match PatientResponse::decode(body).into_first()? {
            Some(patient) => Ok(self.converter.to_local(&patient)),
            None => Err(WireFormatError("response carried no Patient".to_string()).into()),
        }
    }
}
