use thiserror::Error;

/// Failure to build a FHIR resource from a local patient
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Patient has no name")]
    MissingName,
}

/// Response body is neither a FHIR Bundle nor a Patient
#[derive(Debug, Error)]
#[error("Response is neither a Bundle nor a Patient resource: {0}")]
pub struct WireFormatError(pub String);

