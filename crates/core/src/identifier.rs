use serde::{Deserialize, Serialize};

/// System URN for the MPI-assigned cross-border identifier
pub const CROSS_BORDER_ID_SYSTEM_URN: &str = "urn:oid:2.16.840.1.113883.3.26.1.3";

/// System URN for the facility clinic number
pub const CLINIC_NUMBER_SYSTEM_URN: &str = "urn:oid:2.16.840.1.113883.3.26.1.2";

/// System URN for the national ID
pub const NATIONAL_ID_SYSTEM_URN: &str = "urn:oid:2.16.840.1.113883.3.26.1.1";

/// System URN for identifiers issued by the local records system
pub const SYSTEM_ID_SYSTEM_URN: &str = "urn:oid:1.2.840.113619.2.1.3";

/// Kinds of patient identifier exchanged with the MPI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierKind {
    CrossBorderId,
    ClinicNumber,
    NationalId,
    SystemId,
    PointOfCareId,
}

impl IdentifierKind {
    /// All kinds, in the order they are emitted on the wire
    pub const ALL: [IdentifierKind; 5] = [
        IdentifierKind::PointOfCareId,
        IdentifierKind::CrossBorderId,
        IdentifierKind::ClinicNumber,
        IdentifierKind::NationalId,
        IdentifierKind::SystemId,
    ];

    /// The identifier system URN this kind is tagged with.
    ///
    /// The point-of-care ID is issued by the local system, so it shares the
    /// system-ID URN and is told apart by its label.
    pub fn system(self) -> &'static str {
        match self {
            IdentifierKind::CrossBorderId => CROSS_BORDER_ID_SYSTEM_URN,
            IdentifierKind::ClinicNumber => CLINIC_NUMBER_SYSTEM_URN,
            IdentifierKind::NationalId => NATIONAL_ID_SYSTEM_URN,
            IdentifierKind::SystemId | IdentifierKind::PointOfCareId => SYSTEM_ID_SYSTEM_URN,
        }
    }

    /// Label carried in the identifier's `id` element
    pub fn label(self) -> &'static str {
        match self {
            IdentifierKind::CrossBorderId => "CROSS_BORDER_ID",
            IdentifierKind::ClinicNumber => "CLINIC_NUMBER",
            IdentifierKind::NationalId => "NATIONAL_ID",
            IdentifierKind::SystemId => "SYSTEM_ID",
            IdentifierKind::PointOfCareId => "POINT_OF_CARE_ID",
        }
    }

    /// Resolve an inbound identifier from its system URN and optional label.
    ///
    /// Returns `None` for systems this integration does not recognize.
    pub fn from_system(system: &str, label: Option<&str>) -> Option<Self> {
        match system {
            CROSS_BORDER_ID_SYSTEM_URN => Some(IdentifierKind::CrossBorderId),
            CLINIC_NUMBER_SYSTEM_URN => Some(IdentifierKind::ClinicNumber),
            NATIONAL_ID_SYSTEM_URN => Some(IdentifierKind::NationalId),
            SYSTEM_ID_SYSTEM_URN => match label {
                Some("POINT_OF_CARE_ID") => Some(IdentifierKind::PointOfCareId),
                _ => Some(IdentifierKind::SystemId),
            },
            _ => None,
        }
    }

    /// Resolve an identifier that carries a label but no system
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}
