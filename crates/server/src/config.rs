//! Server configuration

use std::time::Duration;

const DEFAULT_ATTRIBUTE_TYPES: &str =
    "Telephone contact,Email address,Next of kin name,Next of kin contact";

/// MPI connection settings
#[derive(Debug, Clone)]
pub struct MpiConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Fixed request timeout; requests wait indefinitely when unset
    pub timeout: Option<Duration>,
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub mpi: MpiConfig,
    pub person_attribute_types: Vec<String>,
    pub cors_origins: Vec<String>,
    /// Answer facade failures with a `null` body instead of an OperationOutcome
    pub legacy_null_responses: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "host=localhost user=postgres dbname=openmrs".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            mpi: MpiConfig {
                base_url: std::env::var("MPI_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:5001/CR/fhir/".into()),
                username: std::env::var("MPI_USERNAME").ok(),
                password: std::env::var("MPI_PASSWORD").ok(),
                timeout: std::env::var("MPI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_secs),
            },
            person_attribute_types: split_list(
                &std::env::var("PERSON_ATTRIBUTE_TYPES")
                    .unwrap_or_else(|_| DEFAULT_ATTRIBUTE_TYPES.into()),
            ),
            cors_origins: split_list(&std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into())),
            legacy_null_responses: std::env::var("LEGACY_NULL_RESPONSES")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_skips_empty() {
        assert_eq!(
            split_list(" Telephone contact, ,Email address,"),
            vec!["Telephone contact".to_string(), "Email address".to_string()]
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag(" off "));
    }
}
