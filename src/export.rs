//! Plain-text rendering of registrations for sharing and bulk export.

use askama::Template;
use chrono::{Datelike, NaiveDate};

use crate::models::registration::{Buddy, NextOfKin, PersonalInfo, Registration};

/// Formats accepted for `dateOfBirth`.
const DOB_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

#[derive(Template)]
#[template(path = "export/registration.txt", escape = "none")]
struct RegistrationTemplate<'a> {
    date: String,
    age: String,
    blood_group: String,
    info: &'a PersonalInfo,
    buddies: &'a [Buddy],
    next_of_kin: &'a [NextOfKin],
}

#[derive(Template)]
#[template(path = "export/all.txt", escape = "none")]
struct AllRegistrationsTemplate {
    total: usize,
    export_date: String,
    blocks: Vec<String>,
}

pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DOB_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Whole years between `dob` and `today`, one less if the birthday has not
/// come round yet this year.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years - 1
    } else {
        years
    }
}

pub fn age_label(date_of_birth: &str, today: NaiveDate) -> String {
    parse_date_of_birth(date_of_birth)
        .map(|dob| age_on(dob, today).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn display_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

pub fn format_registration(reg: &Registration, today: NaiveDate) -> Result<String, askama::Error> {
    RegistrationTemplate {
        date: display_date(reg.created_at.date_naive()),
        age: age_label(&reg.personal_info.date_of_birth, today),
        blood_group: reg
            .personal_info
            .blood_group
            .map(|group| group.to_string())
            .unwrap_or_default(),
        info: &reg.personal_info,
        buddies: &reg.buddies,
        next_of_kin: &reg.next_of_kin,
    }
    .render()
}

pub fn format_all_registrations(
    regs: &[Registration],
    today: NaiveDate,
) -> Result<String, askama::Error> {
    let blocks = regs
        .iter()
        .map(|reg| format_registration(reg, today))
        .collect::<Result<Vec<_>, _>>()?;

    AllRegistrationsTemplate {
        total: regs.len(),
        export_date: display_date(today),
        blocks,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registration::fixtures::valid_payload;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registration(id: &str) -> Registration {
        let payload = valid_payload();
        Registration {
            id: id.to_string(),
            personal_info: payload.personal_info,
            buddies: payload.buddies,
            next_of_kin: payload.next_of_kin,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn age_turns_over_on_the_birthday() {
        let dob = date(1990, 6, 15);
        assert_eq!(age_on(dob, date(2024, 6, 14)), 33);
        assert_eq!(age_on(dob, date(2024, 6, 15)), 34);
        assert_eq!(age_on(dob, date(2024, 5, 31)), 33);
        assert_eq!(age_on(dob, date(2024, 7, 1)), 34);
    }

    #[test]
    fn leap_day_birthday() {
        let dob = date(2000, 2, 29);
        assert_eq!(age_on(dob, date(2023, 2, 28)), 22);
        assert_eq!(age_on(dob, date(2023, 3, 1)), 23);
        assert_eq!(age_on(dob, date(2024, 2, 29)), 24);
    }

    #[test]
    fn both_date_formats_parse() {
        assert_eq!(parse_date_of_birth("1990-06-15"), Some(date(1990, 6, 15)));
        assert_eq!(parse_date_of_birth("15/01/1990"), Some(date(1990, 1, 15)));
        assert_eq!(age_label("sometime in 1990", date(2024, 1, 1)), "N/A");
        assert_eq!(age_label("", date(2024, 1, 1)), "N/A");
    }

    #[test]
    fn single_block_lists_every_section() {
        let text = format_registration(&registration("r1"), date(2024, 6, 14)).unwrap();

        assert!(text.contains("HEALTH REGISTRATION DETAILS"));
        assert!(text.contains("Registration Date: 03/05/2024"));
        assert!(text.contains("Date of Birth: 1990-06-15 (Age: 33 years)"));
        assert!(text.contains("Blood Group: O+"));
        assert!(text.contains("Insurance Company: Health Corp"));
        assert!(text.contains("Buddy 1:\n  Name: Alice Johnson"));
        assert!(text.contains("Buddy 2:\n  Name: Bob Wilson"));
        assert!(text.contains("  Apt Number: C303"));
        assert!(text.contains("Contact 1:\n  Name: Jane Doe"));
        assert!(!text.contains("Contact 2:"));
    }

    #[test]
    fn bulk_export_numbers_each_block() {
        let regs = vec![registration("r1"), registration("r2")];
        let text = format_all_registrations(&regs, date(2024, 6, 15)).unwrap();

        assert!(text.contains("ALL HEALTH REGISTRATIONS EXPORT"));
        assert!(text.contains("Total Registrations: 2"));
        assert!(text.contains("Export Date: 06/15/2024"));
        assert!(text.contains("REGISTRATION #1"));
        assert!(text.contains("REGISTRATION #2"));
        assert_eq!(text.matches("HEALTH REGISTRATION DETAILS").count(), 2);
        assert!(text.contains("(Age: 34 years)"));
    }
}
