//! User model and related functionality

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User entity
///
/// `id` is assigned by storage on first save and never changes afterwards.
/// Equality is identity based: two users are equal only when both carry an
/// id and the ids match, so a user that was never persisted equals nothing,
/// itself included. For that reason `User` is `PartialEq` but not `Eq`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Candidate user supplied by a caller, not yet validated
///
/// Every field is optional so that absent values surface as validation
/// failures instead of deserialization errors. An `id` in the payload is
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Inclusive birth date window used by the range query
///
/// A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Whether `date` falls inside the window, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.to.is_none_or(|to| date <= to)
    }
}

/// Single-column change applied by the field-level patch operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FirstName(String),
    LastName(String),
    Email(String),
    BirthDate(NaiveDate),
    Address(String),
    Phone(String),
}

impl FieldUpdate {
    /// Write the new value onto `user`
    pub fn apply_to(&self, user: &mut User) {
        match self {
            FieldUpdate::FirstName(value) => user.first_name = value.clone(),
            FieldUpdate::LastName(value) => user.last_name = value.clone(),
            FieldUpdate::Email(value) => user.email = value.clone(),
            FieldUpdate::BirthDate(value) => user.birth_date = *value,
            FieldUpdate::Address(value) => user.address = Some(value.clone()),
            FieldUpdate::Phone(value) => user.phone = Some(value.clone()),
        }
    }
}

/// Validated user fields, named the way error messages refer to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    BirthDate,
}

impl Field {
    /// Lower-case noun used inside sentences
    pub fn noun(&self) -> &'static str {
        match self {
            Field::FirstName => "first name",
            Field::LastName => "last name",
            Field::Email => "email",
            Field::BirthDate => "birth date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::BirthDate => "Birth date",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Option<i64>, email: &str) -> User {
        User {
            id,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            address: None,
            phone: None,
        }
    }

    #[test]
    fn test_users_with_same_id_are_equal() {
        assert_eq!(user(Some(7), "a@example.com"), user(Some(7), "b@example.com"));
        assert_ne!(user(Some(7), "a@example.com"), user(Some(8), "a@example.com"));
    }

    #[test]
    fn test_unsaved_user_equals_nothing() {
        let unsaved = user(None, "a@example.com");
        assert_ne!(unsaved, unsaved.clone());
        assert_ne!(unsaved, user(Some(1), "a@example.com"));
    }

    #[test]
    fn test_field_update_touches_one_field() {
        let mut target = user(Some(1), "a@example.com");
        FieldUpdate::Phone("555".to_string()).apply_to(&mut target);
        FieldUpdate::BirthDate(NaiveDate::from_ymd_opt(1980, 1, 2).unwrap()).apply_to(&mut target);

        assert_eq!(target.phone.as_deref(), Some("555"));
        assert_eq!(target.birth_date, NaiveDate::from_ymd_opt(1980, 1, 2).unwrap());
        assert_eq!(target.first_name, "Jane");
        assert_eq!(target.address, None);
    }

    #[test]
    fn test_date_range_contains_bounds() {
        let from = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(1990, 12, 31).unwrap();
        let range = DateRange::new(Some(from), Some(to));

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(NaiveDate::from_ymd_opt(1991, 1, 1).unwrap()));
        assert!(DateRange::default().contains(NaiveDate::from_ymd_opt(1800, 1, 1).unwrap()));
    }

    #[test]
    fn test_draft_deserializes_camel_case_and_ignores_id() {
        let draft: UserDraft = serde_json::from_str(
            r#"{"id": 99, "firstName": "Jane", "birthDate": "1990-05-01"}"#,
        )
        .unwrap();

        assert_eq!(draft.first_name.as_deref(), Some("Jane"));
        assert_eq!(draft.last_name, None);
        assert_eq!(draft.birth_date, NaiveDate::from_ymd_opt(1990, 5, 1));
    }
}
