use crate::{
    errors::ApiError,
    models::admin::{Admin, AdminRecord},
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Result as RusqliteResult};
use uuid::Uuid;

pub struct AdminRepository {
    conn: Connection,
}

// Fixed precision keeps the stored text sortable.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> RusqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> RusqliteResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl AdminRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn map_row_to_admin(row: &rusqlite::Row) -> RusqliteResult<AdminRecord> {
        let additional_emails: String = row.get(5)?;
        let created_at: String = row.get(6)?;

        Ok(AdminRecord {
            admin: Admin {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
                additional_emails: parse_json(5, &additional_emails)?,
                created_at: parse_timestamp(6, &created_at)?,
            },
            password_hash: row.get(4)?,
        })
    }

    /// Returns the admin, if one has been set up.
    pub fn get_admin(&self) -> Result<Option<AdminRecord>, ApiError> {
        self.conn
            .query_row(
                "SELECT id, name, phone, email, password_hash, additional_emails, created_at
                 FROM admins LIMIT 1",
                [],
                Self::map_row_to_admin,
            )
            .optional()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// Fails with `Conflict` when an admin already exists.
    pub fn create_admin(
        &self,
        name: &str,
        phone: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Admin, ApiError> {
        if self.get_admin()?.is_some() {
            return Err(ApiError::Conflict("Admin already exists".to_string()));
        }

        let admin = Admin {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            additional_emails: Vec::new(),
            created_at: Utc::now(),
        };

        let result = self.conn.execute(
            "INSERT INTO admins (id, name, phone, email, password_hash, additional_emails, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6)",
            params![
                admin.id,
                admin.name,
                admin.phone,
                admin.email,
                password_hash,
                format_timestamp(&admin.created_at),
            ],
        );

        match result {
            Ok(_) => self
                .get_admin()?
                .map(|record| record.admin)
                .ok_or_else(|| ApiError::InternalError("Admin vanished after insert".to_string())),
            // Lost a race with a concurrent setup.
            Err(e) if e.to_string().contains("UNIQUE constraint failed: admins.slot") => {
                Err(ApiError::Conflict("Admin already exists".to_string()))
            }
            Err(e) => Err(ApiError::DatabaseError(e.to_string())),
        }
    }

    pub fn update_additional_emails(&self, emails: &[String]) -> Result<Admin, ApiError> {
        let encoded = serde_json::to_string(emails)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let rows = self
            .conn
            .execute(
                "UPDATE admins SET additional_emails = ?1",
                params![encoded],
            )
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if rows == 0 {
            return Err(ApiError::NotFound("Admin not found".to_string()));
        }

        self.get_admin()?
            .map(|record| record.admin)
            .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))
    }

    pub fn delete_admin(&self) -> Result<(), ApiError> {
        let rows = self
            .conn
            .execute("DELETE FROM admins", [])
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if rows == 0 {
            return Err(ApiError::NotFound("Admin not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_db;

    fn repo() -> (tempfile::TempDir, AdminRepository) {
        let tmp = tempfile::tempdir().unwrap();
        let conn = init_db(&tmp.path().join("admin.db")).unwrap();
        (tmp, AdminRepository::new(conn))
    }

    #[test]
    fn only_one_admin_can_exist() {
        let (_tmp, repo) = repo();
        assert!(repo.get_admin().unwrap().is_none());

        let admin = repo
            .create_admin("Test Admin", "+1234567890", "admin@test.com", "hash")
            .unwrap();
        let stored = repo.get_admin().unwrap().unwrap();
        assert_eq!(stored.admin, admin);
        assert_eq!(stored.password_hash, "hash");

        let err = repo
            .create_admin("Other", "+1", "other@test.com", "hash2")
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn delete_allows_new_setup() {
        let (_tmp, repo) = repo();
        repo.create_admin("A", "1", "a@test.com", "h").unwrap();
        repo.delete_admin().unwrap();
        assert!(repo.get_admin().unwrap().is_none());
        assert!(matches!(repo.delete_admin(), Err(ApiError::NotFound(_))));
        repo.create_admin("B", "2", "b@test.com", "h").unwrap();
    }

    #[test]
    fn additional_emails_round_trip() {
        let (_tmp, repo) = repo();
        assert!(matches!(
            repo.update_additional_emails(&[]),
            Err(ApiError::NotFound(_))
        ));
        repo.create_admin("A", "1", "a@test.com", "h").unwrap();
        let emails = vec!["ops@test.com".to_string(), "desk@test.com".to_string()];
        let admin = repo.update_additional_emails(&emails).unwrap();
        assert_eq!(admin.additional_emails, emails);
    }
}
