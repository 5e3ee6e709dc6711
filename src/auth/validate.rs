//! Input validation for the account operations.
//!
//! Each operation runs a single pass that collects every violation before any
//! store access, so a client fixing a form sees all problems at once.

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

pub(crate) const NAME_MIN_CHARS: usize = 2;
pub(crate) const NAME_MAX_CHARS: usize = 50;
pub(crate) const PASSWORD_MIN_CHARS: usize = 6;
pub(crate) const PASSWORD_MAX_CHARS: usize = 128;
pub(crate) const MIN_AGE_YEARS: i32 = 13;
pub(crate) const MAX_AGE_YEARS: i32 = 120;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Calendar age: year difference, minus one if the birthday has not yet
/// occurred this year. Someone whose 13th birthday is today is 13.
pub(crate) fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Validate signup input, collecting every violation. Returns the parsed
/// date of birth on success.
pub(crate) fn validate_signup(
    name: &str,
    email: &str,
    date_of_birth: &str,
    password: &str,
) -> Result<NaiveDate, Vec<String>> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else if name.chars().count() < NAME_MIN_CHARS {
        errors.push("Name must be at least 2 characters long".to_string());
    } else if name.chars().count() > NAME_MAX_CHARS {
        errors.push("Name cannot exceed 50 characters".to_string());
    }

    let email = normalize_email(email);
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !valid_email(&email) {
        errors.push("Please provide a valid email address".to_string());
    }

    let parsed_dob = match NaiveDate::parse_from_str(date_of_birth.trim(), "%Y-%m-%d") {
        Ok(dob) => {
            let age = age_on(dob, Utc::now().date_naive());
            if age < MIN_AGE_YEARS {
                errors.push("You must be at least 13 years old to register".to_string());
                None
            } else if age > MAX_AGE_YEARS {
                errors.push("Please provide a valid date of birth".to_string());
                None
            } else {
                Some(dob)
            }
        }
        Err(_) => {
            errors.push("Please provide a valid date of birth".to_string());
            None
        }
    };

    if password.is_empty() {
        errors.push("Password is required".to_string());
    } else if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push("Password must be at least 6 characters long".to_string());
    } else if password.chars().count() > PASSWORD_MAX_CHARS {
        errors.push("Password cannot exceed 128 characters".to_string());
    } else if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        errors.push("Password must contain at least one letter".to_string());
    }

    match (errors.is_empty(), parsed_dob) {
        (true, Some(dob)) => Ok(dob),
        _ => Err(errors),
    }
}

pub(crate) fn validate_login(email: &str, password: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let email = normalize_email(email);
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !valid_email(&email) {
        errors.push("Please provide a valid email address".to_string());
    }

    if password.is_empty() {
        errors.push("Password is required".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub(crate) fn validate_otp(email: &str, otp: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let email = normalize_email(email);
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !valid_email(&email) {
        errors.push("Please provide a valid email address".to_string());
    }

    let otp = otp.trim();
    if otp.is_empty() {
        errors.push("OTP is required".to_string());
    } else if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        errors.push("OTP must be a 6-digit number".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub(crate) fn validate_email_only(email: &str) -> Result<(), Vec<String>> {
    let email = normalize_email(email);
    if email.is_empty() {
        Err(vec!["Email is required".to_string()])
    } else if !valid_email(&email) {
        Err(vec!["Please provide a valid email address".to_string()])
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn age_counts_birthdays_not_years() {
        let dob = NaiveDate::from_ymd_opt(2010, 6, 15).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2023, 6, 14).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        assert_eq!(age_on(dob, day_before), 12);
        assert_eq!(age_on(dob, birthday), 13);
    }

    #[test]
    fn signup_accepts_a_fourteen_year_old() {
        let today = Utc::now().date_naive();
        // Mid-month date avoids leap-day construction issues.
        let dob = NaiveDate::from_ymd_opt(today.year() - 14, 6, 15)
            .unwrap()
            .to_string();

        let result = validate_signup("Ana", "ana@example.com", &dob, "secret1");
        assert!(result.is_ok());
    }

    #[test]
    fn signup_rejects_twelve_year_olds() {
        let today = Utc::now().date_naive();
        // Strictly under 13 regardless of where today falls in the year.
        let dob = (today - Duration::days(12 * 366)).to_string();

        let errors = validate_signup("Ana", "ana@example.com", &dob, "secret1").unwrap_err();
        assert!(errors.contains(&"You must be at least 13 years old to register".to_string()));
    }

    #[test]
    fn signup_rejects_implausible_ages() {
        let errors =
            validate_signup("Ana", "ana@example.com", "1850-01-01", "secret1").unwrap_err();
        assert!(errors.contains(&"Please provide a valid date of birth".to_string()));
    }

    #[test]
    fn signup_rejects_unparseable_dates() {
        let errors =
            validate_signup("Ana", "ana@example.com", "15/03/2000", "secret1").unwrap_err();
        assert!(errors.contains(&"Please provide a valid date of birth".to_string()));
    }

    #[test]
    fn signup_collects_all_violations() {
        let errors = validate_signup("A", "not-an-email", "never", "12345").unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"Name must be at least 2 characters long".to_string()));
        assert!(errors.contains(&"Please provide a valid email address".to_string()));
        assert!(errors.contains(&"Please provide a valid date of birth".to_string()));
        assert!(errors.contains(&"Password must be at least 6 characters long".to_string()));
    }

    #[test]
    fn signup_requires_a_letter_in_password() {
        let errors = validate_signup("Ana", "ana@example.com", "2000-03-15", "123456").unwrap_err();
        assert_eq!(
            errors,
            vec!["Password must contain at least one letter".to_string()]
        );
    }

    #[test]
    fn signup_bounds_name_length() {
        let long_name = "x".repeat(51);
        let errors =
            validate_signup(&long_name, "ana@example.com", "2000-03-15", "secret1").unwrap_err();
        assert_eq!(errors, vec!["Name cannot exceed 50 characters".to_string()]);
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert!(validate_otp("ana@example.com", "123456").is_ok());
        assert!(validate_otp("ana@example.com", "12345").is_err());
        assert!(validate_otp("ana@example.com", "1234567").is_err());
        assert!(validate_otp("ana@example.com", "12a456").is_err());
        assert!(validate_otp("ana@example.com", "").is_err());
    }

    #[test]
    fn login_requires_wellformed_email_and_password() {
        assert!(validate_login("ana@example.com", "secret1").is_ok());
        assert!(validate_login("nope", "secret1").is_err());
        assert!(validate_login("ana@example.com", "").is_err());
    }

    #[test]
    fn email_only_check() {
        assert!(validate_email_only("ana@example.com").is_ok());
        assert!(validate_email_only("").is_err());
        assert!(validate_email_only("nope").is_err());
    }
}
