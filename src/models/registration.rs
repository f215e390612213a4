use crate::models::response::ValidationResponse;
use crate::utils::is_valid_email;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const REQUIRED_BUDDIES: usize = 2;
pub const MIN_NEXT_OF_KIN: usize = 1;
pub const MAX_NEXT_OF_KIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BloodGroup {
    #[display("A+")]
    APositive,
    #[display("A-")]
    ANegative,
    #[display("B+")]
    BPositive,
    #[display("B-")]
    BNegative,
    #[display("O+")]
    OPositive,
    #[display("O-")]
    ONegative,
    #[display("AB+")]
    AbPositive,
    #[display("AB-")]
    AbNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.to_string() == s)
            .ok_or_else(|| format!("Unknown blood group: {}", s))
    }
}

// An unselected blood group travels as "" so that validation, not parsing,
// reports it with the field-specific message.
mod blood_group_field {
    use super::BloodGroup;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<BloodGroup>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(group) => serializer.collect_str(group),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BloodGroup>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(D::Error::custom)
    }
}

impl Serialize for BloodGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BloodGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub registrant_name: String,
    pub registrant_phone: String,
    pub registrant_apt_number: String,
    pub date_of_birth: String,
    #[serde(with = "blood_group_field")]
    pub blood_group: Option<BloodGroup>,
    pub insurance_policy: String,
    pub insurance_company: String,
    pub doctor_name: String,
    pub doctor_contact: String,
    pub hospital_name: String,
    pub hospital_number: String,
    pub current_ailments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Buddy {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub apt_number: String,
}

impl Buddy {
    fn is_complete(&self) -> bool {
        !(self.name.is_empty()
            || self.phone.is_empty()
            || self.email.is_empty()
            || self.apt_number.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextOfKin {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl NextOfKin {
    fn is_complete(&self) -> bool {
        !(self.name.is_empty() || self.phone.is_empty() || self.email.is_empty())
    }
}

/// Body of a registration submission, and the editable part of a stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub personal_info: PersonalInfo,
    pub buddies: Vec<Buddy>,
    pub next_of_kin: Vec<NextOfKin>,
}

impl RegistrationPayload {
    /// Checks the required fields in form order and reports the first failure.
    pub fn validate_fields(&self) -> Result<(), ValidationResponse> {
        let info = &self.personal_info;

        if info.registrant_phone.is_empty() {
            return Err(ValidationResponse::new(
                "registrantPhone",
                "Please enter your phone number",
            ));
        }
        if info.blood_group.is_none() {
            return Err(ValidationResponse::new(
                "bloodGroup",
                "Please select a blood group",
            ));
        }
        if info.insurance_policy.is_empty() || info.insurance_company.is_empty() {
            return Err(ValidationResponse::new(
                "insurance",
                "Please fill in insurance details",
            ));
        }
        if info.doctor_name.is_empty()
            || info.hospital_name.is_empty()
            || info.hospital_number.is_empty()
        {
            return Err(ValidationResponse::new(
                "doctor",
                "Please fill in doctor and hospital details",
            ));
        }
        if info.current_ailments.is_empty() {
            return Err(ValidationResponse::new(
                "currentAilments",
                "Please describe current ailments",
            ));
        }

        for (i, buddy) in self.buddies.iter().enumerate() {
            let field = format!("buddies[{}]", i);
            if !buddy.is_complete() {
                return Err(ValidationResponse::new(
                    field,
                    format!("Please fill in all details for Buddy {}", i + 1),
                ));
            }
            if !is_valid_email(&buddy.email) {
                return Err(ValidationResponse::new(
                    field,
                    format!("Invalid email for Buddy {}", i + 1),
                ));
            }
        }

        for (i, kin) in self.next_of_kin.iter().enumerate() {
            let field = format!("nextOfKin[{}]", i);
            if !kin.is_complete() {
                return Err(ValidationResponse::new(
                    field,
                    format!("Please fill in all details for Next of Kin {}", i + 1),
                ));
            }
            if !is_valid_email(&kin.email) {
                return Err(ValidationResponse::new(
                    field,
                    format!("Invalid email for Next of Kin {}", i + 1),
                ));
            }
        }

        Ok(())
    }

    /// Rules for a new submission: exactly two buddies, one to three next of kin.
    pub fn validate_for_create(&self) -> Result<(), ValidationResponse> {
        if self.buddies.len() != REQUIRED_BUDDIES {
            return Err(ValidationResponse::new(
                "buddies",
                "Exactly 2 buddies are required",
            ));
        }
        self.validate_next_of_kin_count()?;
        self.validate_fields()
    }

    /// Rules for an admin edit: the edit form allows one or two buddies.
    pub fn validate_for_update(&self) -> Result<(), ValidationResponse> {
        if self.buddies.is_empty() || self.buddies.len() > REQUIRED_BUDDIES {
            return Err(ValidationResponse::new(
                "buddies",
                "Between 1 and 2 buddies are allowed",
            ));
        }
        self.validate_next_of_kin_count()?;
        self.validate_fields()
    }

    fn validate_next_of_kin_count(&self) -> Result<(), ValidationResponse> {
        if !(MIN_NEXT_OF_KIN..=MAX_NEXT_OF_KIN).contains(&self.next_of_kin.len()) {
            return Err(ValidationResponse::new(
                "nextOfKin",
                "Between 1 and 3 next of kin contacts are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub personal_info: PersonalInfo,
    pub buddies: Vec<Buddy>,
    pub next_of_kin: Vec<NextOfKin>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            personal_info: self.personal_info.clone(),
            buddies: self.buddies.clone(),
            next_of_kin: self.next_of_kin.clone(),
        }
    }

    pub fn formatted_date(&self) -> String {
        self.created_at.format("%m/%d/%Y").to_string()
    }
}

/// `PUT /api/registrations/{id}` body. The password may be omitted while the
/// session holds a recent verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub payload: RegistrationPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn valid_payload() -> RegistrationPayload {
        RegistrationPayload {
            personal_info: PersonalInfo {
                registrant_name: "John Doe".to_string(),
                registrant_phone: "+1987654321".to_string(),
                registrant_apt_number: "A101".to_string(),
                date_of_birth: "1990-06-15".to_string(),
                blood_group: Some(BloodGroup::OPositive),
                insurance_policy: "INS123456".to_string(),
                insurance_company: "Health Corp".to_string(),
                doctor_name: "Dr. Smith".to_string(),
                doctor_contact: "+1555123456".to_string(),
                hospital_name: "City Hospital".to_string(),
                hospital_number: "H789".to_string(),
                current_ailments: "None".to_string(),
            },
            buddies: vec![
                Buddy {
                    name: "Alice Johnson".to_string(),
                    phone: "+1555111111".to_string(),
                    email: "alice@test.com".to_string(),
                    apt_number: "B202".to_string(),
                },
                Buddy {
                    name: "Bob Wilson".to_string(),
                    phone: "+1555222222".to_string(),
                    email: "bob@test.com".to_string(),
                    apt_number: "C303".to_string(),
                },
            ],
            next_of_kin: vec![NextOfKin {
                name: "Jane Doe".to_string(),
                phone: "+1555333333".to_string(),
                email: "jane@test.com".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::valid_payload;
    use super::*;

    fn message(result: Result<(), ValidationResponse>) -> String {
        result.expect_err("expected a validation failure").message
    }

    #[test]
    fn valid_payload_passes_create_rules() {
        assert_eq!(valid_payload().validate_for_create(), Ok(()));
    }

    #[test]
    fn phone_is_checked_before_everything_else() {
        let mut payload = valid_payload();
        payload.personal_info.registrant_phone.clear();
        payload.personal_info.blood_group = None;
        payload.buddies[0].email = "broken".to_string();
        assert_eq!(
            message(payload.validate_fields()),
            "Please enter your phone number"
        );
    }

    #[test]
    fn sections_fail_in_form_order() {
        let mut payload = valid_payload();
        payload.personal_info.blood_group = None;
        payload.personal_info.current_ailments.clear();
        assert_eq!(message(payload.validate_fields()), "Please select a blood group");

        let mut payload = valid_payload();
        payload.personal_info.insurance_company.clear();
        payload.personal_info.hospital_number.clear();
        assert_eq!(
            message(payload.validate_fields()),
            "Please fill in insurance details"
        );

        let mut payload = valid_payload();
        payload.personal_info.hospital_number.clear();
        payload.personal_info.current_ailments.clear();
        assert_eq!(
            message(payload.validate_fields()),
            "Please fill in doctor and hospital details"
        );

        let mut payload = valid_payload();
        payload.personal_info.current_ailments.clear();
        assert_eq!(
            message(payload.validate_fields()),
            "Please describe current ailments"
        );
    }

    #[test]
    fn contacts_report_their_position() {
        let mut payload = valid_payload();
        payload.buddies[1].apt_number.clear();
        payload.next_of_kin[0].email = "nope".to_string();
        assert_eq!(
            message(payload.validate_fields()),
            "Please fill in all details for Buddy 2"
        );

        let mut payload = valid_payload();
        payload.buddies[0].email = "alice at test.com".to_string();
        assert_eq!(message(payload.validate_fields()), "Invalid email for Buddy 1");

        let mut payload = valid_payload();
        payload.next_of_kin.push(NextOfKin {
            name: "Jim".to_string(),
            phone: "+1".to_string(),
            email: "jim@test".to_string(),
        });
        let err = payload.validate_fields().unwrap_err();
        assert_eq!(err.field, "nextOfKin[1]");
        assert_eq!(err.message, "Invalid email for Next of Kin 2");
    }

    #[test]
    fn counts_differ_between_create_and_update() {
        let mut payload = valid_payload();
        payload.buddies.truncate(1);
        assert_eq!(
            message(payload.validate_for_create()),
            "Exactly 2 buddies are required"
        );
        assert_eq!(payload.validate_for_update(), Ok(()));

        let mut payload = valid_payload();
        let extra = payload.buddies[0].clone();
        payload.buddies.push(extra);
        assert!(payload.validate_for_update().is_err());

        let mut payload = valid_payload();
        let kin = payload.next_of_kin[0].clone();
        payload.next_of_kin = vec![kin; 4];
        assert_eq!(
            message(payload.validate_for_update()),
            "Between 1 and 3 next of kin contacts are required"
        );
        payload.next_of_kin.clear();
        assert!(payload.validate_for_create().is_err());
    }

    #[test]
    fn blood_group_uses_wire_labels() {
        let json = serde_json::to_value(valid_payload()).unwrap();
        assert_eq!(json["personalInfo"]["bloodGroup"], "O+");
        assert_eq!("AB-".parse::<BloodGroup>(), Ok(BloodGroup::AbNegative));
        assert!("C+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn empty_blood_group_deserializes_as_unselected() {
        let mut json = serde_json::to_value(valid_payload()).unwrap();
        json["personalInfo"]["bloodGroup"] = serde_json::json!("");
        let payload: RegistrationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.personal_info.blood_group, None);
    }

    #[test]
    fn update_request_flattens_payload_next_to_password() {
        let json = serde_json::json!({
            "password": "AdminPass123!",
            "personalInfo": { "registrantPhone": "+1", "bloodGroup": "A+" },
            "buddies": [],
            "nextOfKin": []
        });
        let request: RegistrationUpdateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.password.as_deref(), Some("AdminPass123!"));
        assert_eq!(
            request.payload.personal_info.blood_group,
            Some(BloodGroup::APositive)
        );
    }
}
