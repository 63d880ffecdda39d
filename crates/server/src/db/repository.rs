use chrono::{NaiveDate, NaiveDateTime, SecondsFormat};
use deadpool_postgres::Pool;
use serde::Serialize;
use tokio_postgres::Row;

use crate::error::AppError;

/// Encounter type for cross-border referrals
pub const REFERRAL_ENCOUNTER_TYPE_UUID: &str = "5C6DA02B-51E8-4B3D-BB67-BE8F75C4CCE1";

/// Encounter type for cross-border screening
pub const SCREENING_ENCOUNTER_TYPE_UUID: &str = "6536A8A3-7B77-414D-A0F0-E08A7178FF0F";

/// Non-voided encounters of the given types joined to the host's patient,
/// location, form and visit tables. The patient name is the preferred
/// non-voided person name.
const LIST_ENCOUNTERS: &str = "
    SELECT e.uuid::text AS encounter_uuid,
           et.name AS encounter_type,
           et.uuid::text AS encounter_type_uuid,
           e.encounter_datetime,
           concat_ws(' ', NULLIF(pn.given_name, ''), NULLIF(pn.middle_name, ''),
                     NULLIF(pn.family_name, '')) AS patient_name,
           p.uuid::text AS patient_uuid,
           l.name AS location,
           f.name AS form,
           vt.name AS visit
    FROM encounter e
    JOIN encounter_type et ON et.encounter_type_id = e.encounter_type
    JOIN person p ON p.person_id = e.patient_id
    LEFT JOIN LATERAL (
        SELECT given_name, middle_name, family_name
        FROM person_name
        WHERE person_id = e.patient_id AND NOT voided
        ORDER BY preferred DESC, person_name_id
        LIMIT 1
    ) pn ON true
    LEFT JOIN location l ON l.location_id = e.location_id
    LEFT JOIN form f ON f.form_id = e.form_id
    LEFT JOIN visit v ON v.visit_id = e.visit_id
    LEFT JOIN visit_type vt ON vt.visit_type_id = v.visit_type_id
    WHERE NOT e.voided
      AND upper(et.uuid::text) = ANY($1)
      AND ($2::timestamp IS NULL OR e.encounter_datetime >= $2)
      AND ($3::timestamp IS NULL OR e.encounter_datetime < $3)
    ORDER BY e.encounter_datetime, e.encounter_id";

/// A cross-border encounter as listed by the facade
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrossBorderEncounter {
    pub encounter_uuid: String,
    pub encounter_type: String,
    pub encounter_type_uuid: String,
    /// `yyyy-MM-dd'T'HH:mm:ss.SSS` with a `Z` offset
    pub encounter_datetime: String,
    pub patient_name: String,
    pub patient_uuid: String,
    pub location: String,
    pub form: String,
    pub visit: String,
}

impl CrossBorderEncounter {
    fn from_row(row: &Row) -> Self {
        let text = |column: &str| row.get::<_, Option<String>>(column).unwrap_or_default();
        let datetime: Option<NaiveDateTime> = row.get("encounter_datetime");

        Self {
            encounter_uuid: text("encounter_uuid"),
            encounter_type: text("encounter_type"),
            encounter_type_uuid: text("encounter_type_uuid"),
            encounter_datetime: datetime
                .map(|d| d.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            patient_name: text("patient_name"),
            patient_uuid: text("patient_uuid"),
            location: text("location"),
            form: text("form"),
            visit: text("visit"),
        }
    }
}

/// Read access to the host's cross-border encounters
#[derive(Clone)]
pub struct EncounterRepository {
    pool: Pool,
}

impl EncounterRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// List non-voided cross-border encounters within an inclusive date range
    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CrossBorderEncounter>, AppError> {
        let encounter_types = vec![
            REFERRAL_ENCOUNTER_TYPE_UUID.to_string(),
            SCREENING_ENCOUNTER_TYPE_UUID.to_string(),
        ];
        let start = from.map(start_of_day);
        let end = to.and_then(|d| d.succ_opt()).map(start_of_day);

        let client = self.pool.get().await?;
        let rows = client
            .query(LIST_ENCOUNTERS, &[&encounter_types, &start, &end])
            .await?;

        Ok(rows.iter().map(CrossBorderEncounter::from_row).collect())
    }
}

/// Host datetimes are stored without zone and read as UTC
fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            start_of_day(date).and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            "2024-03-01T00:00:00.000Z"
        );
    }
}
