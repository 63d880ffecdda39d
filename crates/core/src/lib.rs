//! crossborder-core: patient model and FHIR conversion for the MPI bridge
//!
//! Pure types and functions, no I/O: the local patient aggregate, the FHIR
//! Patient and Bundle wire models, and the converter between them.

pub mod bundle;
pub mod converter;
pub mod error;
pub mod identifier;
pub mod local;
pub mod marital;
pub mod outcome;
pub mod registry;
pub mod resource;

pub use bundle::{Bundle, BundleEntry, BundleType, PatientResponse};
pub use converter::{PatientConverter, strip_unresolved_attributes};
pub use error::{ConversionError, WireFormatError};
pub use identifier::IdentifierKind;
pub use local::{
    LocalPatient, PatientIdentifier, PersonAddress, PersonAttribute, PersonName, Relationship,
};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use registry::{AttributeType, AttributeTypeRegistry, InMemoryAttributeTypes};
pub use resource::FhirPatient;
