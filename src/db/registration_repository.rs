use crate::db::admin_repository::{format_timestamp, parse_json, parse_timestamp};
use crate::errors::ApiError;
use crate::models::registration::{Registration, RegistrationPayload};
use chrono::Utc;
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Result as RusqliteResult, Transaction,
    TransactionBehavior,
};
use uuid::Uuid;

pub struct RegistrationRepository {
    conn: Connection,
}

/// Outcome of a submission: either a new record or an update of the record
/// already filed under the same phone number.
#[derive(Debug)]
pub enum SaveOutcome {
    Created(Registration),
    Updated(Registration),
}

impl SaveOutcome {
    pub fn into_registration(self) -> Registration {
        match self {
            SaveOutcome::Created(reg) | SaveOutcome::Updated(reg) => reg,
        }
    }
}

fn phone_conflict(e: rusqlite::Error) -> ApiError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => ApiError::Conflict(
            "Another registration already uses this phone number".to_string(),
        ),
        _ => ApiError::DatabaseError(e.to_string()),
    }
}

impl RegistrationRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    const SELECT_FIELDS: &'static str =
        "id, personal_info, buddies, next_of_kin, created_at, updated_at";

    fn map_row_to_registration(row: &rusqlite::Row) -> RusqliteResult<Registration> {
        let personal_info: String = row.get(1)?;
        let buddies: String = row.get(2)?;
        let next_of_kin: String = row.get(3)?;
        let created_at: String = row.get(4)?;
        let updated_at: Option<String> = row.get(5)?;

        Ok(Registration {
            id: row.get(0)?,
            personal_info: parse_json(1, &personal_info)?,
            buddies: parse_json(2, &buddies)?,
            next_of_kin: parse_json(3, &next_of_kin)?,
            created_at: parse_timestamp(4, &created_at)?,
            updated_at: updated_at
                .map(|raw| parse_timestamp(5, &raw))
                .transpose()?,
        })
    }

    fn find_id_by_phone(&self, phone: &str) -> Result<Option<String>, ApiError> {
        self.conn
            .query_row(
                "SELECT id FROM registrations WHERE registrant_phone = ?1
                 ORDER BY created_at LIMIT 1",
                params![phone],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// Files a submission. A phone number already on file updates that record
    /// in place, keeping its id and creation time.
    pub fn save_registration(&self, payload: &RegistrationPayload) -> Result<SaveOutcome, ApiError> {
        // IMMEDIATE takes the write lock up front, so the lookup and the
        // write cannot interleave with another submission.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let outcome = self.upsert_by_phone(payload)?;
        tx.commit()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(outcome)
    }

    fn upsert_by_phone(&self, payload: &RegistrationPayload) -> Result<SaveOutcome, ApiError> {
        let phone = &payload.personal_info.registrant_phone;
        if let Some(existing_id) = self.find_id_by_phone(phone)? {
            return self
                .update_registration(&existing_id, payload)
                .map(SaveOutcome::Updated);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO registrations
                    (id, registrant_phone, personal_info, buddies, next_of_kin, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    phone,
                    serde_json::to_string(&payload.personal_info)?,
                    serde_json::to_string(&payload.buddies)?,
                    serde_json::to_string(&payload.next_of_kin)?,
                    format_timestamp(&now),
                ],
            )
            .map_err(phone_conflict)?;

        self.get_registration_by_id(&id).map(SaveOutcome::Created)
    }

    pub fn update_registration(
        &self,
        id: &str,
        payload: &RegistrationPayload,
    ) -> Result<Registration, ApiError> {
        let rows = self
            .conn
            .execute(
                "UPDATE registrations SET
                    registrant_phone = ?1, personal_info = ?2, buddies = ?3,
                    next_of_kin = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    payload.personal_info.registrant_phone,
                    serde_json::to_string(&payload.personal_info)?,
                    serde_json::to_string(&payload.buddies)?,
                    serde_json::to_string(&payload.next_of_kin)?,
                    format_timestamp(&Utc::now()),
                    id,
                ],
            )
            .map_err(phone_conflict)?;

        if rows == 0 {
            return Err(ApiError::NotFound("Registration not found".to_string()));
        }
        self.get_registration_by_id(id)
    }

    pub fn get_registration_by_id(&self, id: &str) -> Result<Registration, ApiError> {
        let query = format!(
            "SELECT {} FROM registrations WHERE id = ?1",
            Self::SELECT_FIELDS
        );
        self.conn
            .query_row(&query, params![id], Self::map_row_to_registration)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    ApiError::NotFound("Registration not found".to_string())
                }
                _ => ApiError::DatabaseError(e.to_string()),
            })
    }

    /// All registrations, oldest first.
    pub fn get_all_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        let query = format!(
            "SELECT {} FROM registrations ORDER BY created_at ASC",
            Self::SELECT_FIELDS
        );
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let registration_iter = stmt
            .query_map([], Self::map_row_to_registration)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        registration_iter
            .collect::<Result<Vec<Registration>, _>>()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    pub fn delete_registration_by_id(&self, id: &str) -> Result<(), ApiError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM registrations WHERE id = ?1", params![id])
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if rows_affected == 0 {
            return Err(ApiError::NotFound("Registration not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_db;
    use crate::models::registration::{fixtures::valid_payload, BloodGroup};

    fn repo() -> (tempfile::TempDir, RegistrationRepository) {
        let tmp = tempfile::tempdir().unwrap();
        let conn = init_db(&tmp.path().join("reg.db")).unwrap();
        (tmp, RegistrationRepository::new(conn))
    }

    #[test]
    fn saved_registration_is_listed_unchanged() {
        let (_tmp, repo) = repo();
        let payload = valid_payload();
        let saved = repo.save_registration(&payload).unwrap();
        assert!(matches!(saved, SaveOutcome::Created(_)));
        let saved = saved.into_registration();

        let all = repo.get_all_registrations().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], saved);
        assert_eq!(all[0].payload(), payload);
        assert!(all[0].updated_at.is_none());
    }

    #[test]
    fn same_phone_updates_in_place() {
        let (_tmp, repo) = repo();
        let first = repo
            .save_registration(&valid_payload())
            .unwrap()
            .into_registration();

        let mut again = valid_payload();
        again.personal_info.blood_group = Some(BloodGroup::BNegative);
        let second = repo.save_registration(&again).unwrap();
        assert!(matches!(second, SaveOutcome::Updated(_)));
        let second = second.into_registration();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at.is_some());
        assert_eq!(repo.get_all_registrations().unwrap().len(), 1);
    }

    #[test]
    fn missing_records_are_not_found() {
        let (_tmp, repo) = repo();
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            repo.get_registration_by_id(&id),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            repo.update_registration(&id, &valid_payload()),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_registration_by_id(&id),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn delete_removes_record() {
        let (_tmp, repo) = repo();
        let reg = repo
            .save_registration(&valid_payload())
            .unwrap()
            .into_registration();
        repo.delete_registration_by_id(&reg.id).unwrap();
        assert!(repo.get_all_registrations().unwrap().is_empty());
    }

    #[test]
    fn edit_cannot_take_another_records_phone() {
        let (_tmp, repo) = repo();
        let first = repo
            .save_registration(&valid_payload())
            .unwrap()
            .into_registration();

        let mut other = valid_payload();
        other.personal_info.registrant_phone = "+1000000000".to_string();
        let second = repo.save_registration(&other).unwrap().into_registration();

        other.personal_info.registrant_phone = first.personal_info.registrant_phone.clone();
        assert!(matches!(
            repo.update_registration(&second.id, &other),
            Err(ApiError::Conflict(_))
        ));
        assert_eq!(
            repo.get_registration_by_id(&second.id)
                .unwrap()
                .personal_info
                .registrant_phone,
            "+1000000000"
        );
    }

    #[test]
    fn concurrent_submissions_share_one_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reg.db");
        init_db(&path).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let repo = RegistrationRepository::new(init_db(&path).unwrap());
                    for _ in 0..5 {
                        repo.save_registration(&valid_payload()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let repo = RegistrationRepository::new(init_db(&path).unwrap());
        assert_eq!(repo.get_all_registrations().unwrap().len(), 1);
    }
}
