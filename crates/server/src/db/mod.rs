mod repository;

pub use repository::{
    CrossBorderEncounter, EncounterRepository, REFERRAL_ENCOUNTER_TYPE_UUID,
    SCREENING_ENCOUNTER_TYPE_UUID,
};

use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

/// Create a connection pool for the host records database.
///
/// Connections are opened lazily on first use.
pub fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}
