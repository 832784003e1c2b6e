//! Input validation rules for user records
//!
//! Each rule is a plain function of its inputs. The [`Validator`] bundles
//! them with the configured minimum age so the create, replace and patch
//! paths can apply exactly the rules that concern the fields they touch.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{UserError, UserResult},
    models::{DateRange, Field, User, UserDraft},
};

/// Minimum age applied when none is configured
pub const DEFAULT_MINIMUM_AGE: u32 = 18;

const MAX_EMAIL_LENGTH: usize = 254;

/// Validate that a mandatory text field is present and not blank
pub fn validate_required_field(value: Option<&str>, field: Field) -> UserResult<()> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(UserError::RequiredFieldMissing { field }),
    }
}

/// Validate email shape: `local@domain.label`, no whitespace
///
/// The local part accepts the RFC 5322 atom characters and dots. The domain
/// needs at least two dot-separated labels; the last one may be any length.
pub fn validate_email_format(email: &str) -> UserResult<()> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+$")
            .expect("Failed to compile email regex")
    });

    if email.len() > MAX_EMAIL_LENGTH || !regex.is_match(email) {
        return Err(UserError::InvalidFormat {
            field: Field::Email,
        });
    }

    Ok(())
}

/// Validate that the birth date lies strictly before `today`
pub fn validate_birth_date_in_past(birth_date: NaiveDate, today: NaiveDate) -> UserResult<()> {
    if birth_date >= today {
        return Err(UserError::InvalidBirthDate);
    }

    Ok(())
}

/// Number of complete years between `birth_date` and `today`
///
/// The age goes up on each anniversary of the birth month and day. Negative
/// for dates in the future.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Validate that the person is at least `minimum_age` years old on `today`
pub fn validate_minimum_age(
    birth_date: NaiveDate,
    minimum_age: u32,
    today: NaiveDate,
) -> UserResult<()> {
    let age = age_on(birth_date, today);
    if age < 0 || (age as u32) < minimum_age {
        return Err(UserError::UnderMinimumAge {
            minimum: minimum_age,
        });
    }

    Ok(())
}

/// Validate that a range does not start after it ends
pub fn validate_date_range_order(range: &DateRange) -> UserResult<()> {
    match (range.from, range.to) {
        (Some(from), Some(to)) if from > to => Err(UserError::InvalidRangeOrder),
        _ => Ok(()),
    }
}

/// Rule set bound to a fixed minimum age
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    minimum_age: u32,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_AGE)
    }
}

impl Validator {
    /// Create a validator enforcing `minimum_age`
    pub fn new(minimum_age: u32) -> Self {
        Self { minimum_age }
    }

    pub fn minimum_age(&self) -> u32 {
        self.minimum_age
    }

    /// Required and format rules for an email value
    pub fn validate_email(&self, email: &str) -> UserResult<()> {
        validate_required_field(Some(email), Field::Email)?;
        validate_email_format(email)
    }

    /// Both birth date rules; neither implies the other
    pub fn validate_birth_date(&self, birth_date: NaiveDate, today: NaiveDate) -> UserResult<()> {
        validate_birth_date_in_past(birth_date, today)?;
        validate_minimum_age(birth_date, self.minimum_age, today)
    }

    /// Every rule violated by a candidate, in field order
    pub fn violations(&self, draft: &UserDraft, today: NaiveDate) -> Vec<UserError> {
        let mut errors = Vec::new();

        for (value, field) in [
            (draft.first_name.as_deref(), Field::FirstName),
            (draft.last_name.as_deref(), Field::LastName),
        ] {
            if let Err(e) = validate_required_field(value, field) {
                errors.push(e);
            }
        }

        if let Err(e) = validate_required_field(draft.email.as_deref(), Field::Email)
            .and_then(|_| validate_email_format(draft.email.as_deref().unwrap_or_default()))
        {
            errors.push(e);
        }

        match draft.birth_date {
            None => errors.push(UserError::RequiredFieldMissing {
                field: Field::BirthDate,
            }),
            Some(birth_date) => {
                if let Err(e) = validate_birth_date_in_past(birth_date, today) {
                    errors.push(e);
                }
                if let Err(e) = validate_minimum_age(birth_date, self.minimum_age, today) {
                    errors.push(e);
                }
            }
        }

        errors
    }

    /// Run the full rule set and build an unsaved [`User`] from the candidate
    ///
    /// Fails with the first violation found.
    pub fn validate_user(&self, draft: &UserDraft, today: NaiveDate) -> UserResult<User> {
        if let Some(first) = self.violations(draft, today).into_iter().next() {
            return Err(first);
        }

        let birth_date = draft.birth_date.ok_or(UserError::RequiredFieldMissing {
            field: Field::BirthDate,
        })?;

        Ok(User {
            id: None,
            first_name: draft.first_name.clone().unwrap_or_default(),
            last_name: draft.last_name.clone().unwrap_or_default(),
            email: draft.email.clone().unwrap_or_default(),
            birth_date,
            address: draft.address.clone(),
            phone: draft.phone.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, Months};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> UserDraft {
        UserDraft {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            birth_date: Some(date(1990, 5, 1)),
            address: Some("1 Main St".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_required_field() {
        assert!(validate_required_field(Some("Jane"), Field::FirstName).is_ok());
        assert!(matches!(
            validate_required_field(Some(""), Field::FirstName),
            Err(UserError::RequiredFieldMissing {
                field: Field::FirstName
            })
        ));
        assert!(validate_required_field(Some("   "), Field::LastName).is_err());
        assert!(validate_required_field(None, Field::Email).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email_format("jane@example.com").is_ok());
        assert!(validate_email_format("jane.doe+tag@mail.example.co.uk").is_ok());
        assert!(validate_email_format("o'brien@example.com").is_ok());
        assert!(validate_email_format("a@b.c").is_ok());
        assert!(validate_email_format("user@example.123").is_ok());
        assert!(validate_email_format("x!#$&*=?^`{|}~@example.org").is_ok());

        for bad in [
            "not-an-email",
            "jane@localhost",
            "jane @example.com",
            "@example.com",
            "jane@.com",
            "jane@example..com",
            "jane@example.com.",
            "jane@exa mple.com",
            "jane@@example.com",
        ] {
            assert!(
                matches!(
                    validate_email_format(bad),
                    Err(UserError::InvalidFormat {
                        field: Field::Email
                    })
                ),
                "{bad} should be rejected"
            );
        }

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email_format(&long).is_err());
    }

    #[test]
    fn test_birth_date_must_be_strictly_past() {
        let today = date(2024, 6, 15);
        assert!(validate_birth_date_in_past(date(2024, 6, 14), today).is_ok());
        assert!(matches!(
            validate_birth_date_in_past(today, today),
            Err(UserError::InvalidBirthDate)
        ));
        assert!(validate_birth_date_in_past(date(2030, 1, 1), today).is_err());
    }

    #[test]
    fn test_age_turns_on_anniversary() {
        let birth = date(2000, 3, 10);
        assert_eq!(age_on(birth, date(2018, 3, 9)), 17);
        assert_eq!(age_on(birth, date(2018, 3, 10)), 18);
        assert_eq!(age_on(date(2000, 2, 29), date(2018, 2, 28)), 17);
        assert_eq!(age_on(date(2000, 2, 29), date(2018, 3, 1)), 18);
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), -6);
    }

    #[test]
    fn test_minimum_age_boundary() {
        let today = date(2024, 6, 15);
        let exactly_18 = today.checked_sub_months(Months::new(18 * 12)).unwrap();
        let one_day_short = exactly_18.checked_add_days(Days::new(1)).unwrap();

        assert!(validate_minimum_age(exactly_18, 18, today).is_ok());
        assert!(matches!(
            validate_minimum_age(one_day_short, 18, today),
            Err(UserError::UnderMinimumAge { minimum: 18 })
        ));
        assert!(validate_minimum_age(date(2030, 1, 1), 0, today).is_err());
    }

    #[test]
    fn test_date_range_order() {
        let early = Some(date(1980, 1, 1));
        let late = Some(date(1990, 1, 1));

        assert!(validate_date_range_order(&DateRange::new(early, late)).is_ok());
        assert!(validate_date_range_order(&DateRange::new(early, early)).is_ok());
        assert!(validate_date_range_order(&DateRange::new(None, early)).is_ok());
        assert!(validate_date_range_order(&DateRange::new(late, None)).is_ok());
        assert!(matches!(
            validate_date_range_order(&DateRange::new(late, early)),
            Err(UserError::InvalidRangeOrder)
        ));
    }

    #[test]
    fn test_validate_user_builds_unsaved_user() {
        let user = Validator::default()
            .validate_user(&draft(), date(2024, 6, 15))
            .unwrap();

        assert_eq!(user.id, None);
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn test_violations_collects_every_field() {
        let candidate = UserDraft {
            first_name: None,
            last_name: Some("".to_string()),
            email: Some("nope".to_string()),
            birth_date: Some(date(2030, 1, 1)),
            ..UserDraft::default()
        };

        let messages: Vec<String> = Validator::default()
            .violations(&candidate, date(2024, 6, 15))
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            messages,
            vec![
                "First name is required",
                "Last name is required",
                "Invalid email format",
                "Birth date must be in the past",
                "User must be at least 18 years old.",
            ]
        );
    }

    #[test]
    fn test_missing_email_reports_required_not_format() {
        let candidate = UserDraft {
            email: None,
            ..draft()
        };

        let errors = Validator::default().violations(&candidate, date(2024, 6, 15));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Email is required");
    }

    #[test]
    fn test_configured_minimum_age_is_used() {
        let validator = Validator::new(21);
        let today = date(2024, 6, 15);

        assert_eq!(validator.minimum_age(), 21);
        assert!(matches!(
            validator.validate_birth_date(date(2004, 1, 1), today),
            Err(UserError::UnderMinimumAge { minimum: 21 })
        ));
        assert!(validator.validate_birth_date(date(2003, 1, 1), today).is_ok());
    }
}
