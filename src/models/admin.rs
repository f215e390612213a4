use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::utils::is_valid_email;

pub const MAX_ADDITIONAL_EMAILS: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 8;

/// The singleton operator account as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub additional_emails: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Admin {
    /// Everyone who should receive a copy of registration notifications.
    pub fn notification_recipients(&self) -> Vec<String> {
        std::iter::once(self.email.clone())
            .chain(self.additional_emails.iter().cloned())
            .collect()
    }

    pub fn email_matches(&self, candidate: &str) -> bool {
        self.email.trim().to_lowercase() == candidate.trim().to_lowercase()
    }
}

/// Stored row; the hash never leaves the server.
#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub admin: Admin,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminRegisterRequest {
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    pub phone: String,
    #[validate(custom(function = "email_format", message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl AdminRegisterRequest {
    /// Trims the identity fields so that blank-looking input fails the checks
    /// and stored values carry no stray whitespace. The password is kept as typed.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }

    /// Runs the derived rules and reports the first failure in form order.
    pub fn check(&self) -> Result<(), String> {
        self.validate()
            .map_err(|errors| first_message(&errors, &["name", "phone", "email", "password"]))
    }
}

fn email_format(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn first_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let field_errors = errors.field_errors();
    order
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid admin details".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdditionalEmailsRequest {
    #[serde(default)]
    pub additional_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AdditionalEmailsRequest {
    /// Drops blank entries and trims the rest.
    pub fn filtered(&self) -> Vec<String> {
        filter_blank_emails(&self.additional_emails)
    }
}

pub fn filter_blank_emails(emails: &[String]) -> Vec<String> {
    emails
        .iter()
        .map(|email| email.trim())
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAdminRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AdminRegisterRequest {
        AdminRegisterRequest {
            name: "Test Admin".to_string(),
            phone: "+1234567890".to_string(),
            email: "admin@test.com".to_string(),
            password: "AdminPass123!".to_string(),
        }
    }

    #[test]
    fn register_request_reports_first_failure() {
        assert_eq!(request().check(), Ok(()));

        let mut bad = request();
        bad.email = "not-an-email".to_string();
        bad.password = "short".to_string();
        assert_eq!(
            bad.check().unwrap_err(),
            "Please enter a valid email address"
        );

        let mut bad = request();
        bad.password = "short".to_string();
        assert_eq!(
            bad.check().unwrap_err(),
            "Password must be at least 8 characters"
        );

        let mut bad = request();
        bad.phone.clear();
        assert_eq!(bad.check().unwrap_err(), "Please fill in all fields");
    }

    #[test]
    fn register_request_uses_the_shared_email_rule() {
        let mut bad = request();
        bad.email = "admin@test".to_string();
        assert_eq!(
            bad.check().unwrap_err(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn whitespace_only_fields_fail_after_trimming() {
        let mut blank = request();
        blank.name = "   ".to_string();
        blank.phone = "\t ".to_string();
        let blank = blank.trimmed();
        assert_eq!(blank.check().unwrap_err(), "Please fill in all fields");

        let mut padded = request();
        padded.name = "  Test Admin ".to_string();
        padded.email = " admin@test.com ".to_string();
        padded.password = " AdminPass123! ".to_string();
        let padded = padded.trimmed();
        assert_eq!(padded.name, "Test Admin");
        assert_eq!(padded.email, "admin@test.com");
        assert_eq!(padded.password, " AdminPass123! ");
        assert_eq!(padded.check(), Ok(()));
    }

    #[test]
    fn blank_additional_emails_are_filtered() {
        let req = AdditionalEmailsRequest {
            additional_emails: vec![
                " ops@test.com ".to_string(),
                "   ".to_string(),
                String::new(),
                "desk@test.com".to_string(),
            ],
            password: None,
        };
        assert_eq!(req.filtered(), vec!["ops@test.com", "desk@test.com"]);
    }

    #[test]
    fn email_match_ignores_case() {
        let admin = Admin {
            id: "1".to_string(),
            name: "A".to_string(),
            phone: "1".to_string(),
            email: "Admin@Test.com".to_string(),
            additional_emails: vec!["ops@test.com".to_string()],
            created_at: Utc::now(),
        };
        assert!(admin.email_matches("admin@test.COM"));
        assert!(!admin.email_matches("other@test.com"));
        assert_eq!(
            admin.notification_recipients(),
            vec!["Admin@Test.com", "ops@test.com"]
        );
    }

    #[test]
    fn admin_wire_names() {
        let json = serde_json::json!({
            "id": "x",
            "name": "n",
            "phone": "p",
            "email": "e@x.io",
            "additional_emails": ["a@x.io"],
            "createdAt": "2024-06-15T10:00:00Z"
        });
        let admin: Admin = serde_json::from_value(json).unwrap();
        assert_eq!(admin.additional_emails, vec!["a@x.io"]);
    }
}
