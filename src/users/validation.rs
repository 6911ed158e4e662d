//! Per-field validation rules.
//!
//! Each [`Check`] names a field, an ordered list of predicates and the message
//! reported when any of them fails. Running a list of checks collects every
//! failing field into one [`FieldErrors`] map; when several checks target the
//! same field, the first failing one supplies the message.

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub type Rule = fn(&str) -> bool;

pub fn is_valid_email(value: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(value)
}

pub fn not_email(value: &str) -> bool {
    !is_valid_email(value)
}

pub fn min_chars<const N: usize>(value: &str) -> bool {
    value.chars().count() >= N
}

pub fn chars_between<const MIN: usize, const MAX: usize>(value: &str) -> bool {
    let n = value.chars().count();
    (MIN..=MAX).contains(&n)
}

/// Field name → message for every field that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Anything whose fields can be looked up by their wire name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

#[derive(Clone, Copy)]
pub struct Check {
    pub field: &'static str,
    /// When set, an absent or empty value fails the check. Otherwise such a
    /// value skips the rules.
    pub required: bool,
    pub rules: &'static [Rule],
    pub message: &'static str,
}

impl Check {
    pub const fn required(
        field: &'static str,
        rules: &'static [Rule],
        message: &'static str,
    ) -> Self {
        Self {
            field,
            required: true,
            rules,
            message,
        }
    }

    pub const fn optional(
        field: &'static str,
        rules: &'static [Rule],
        message: &'static str,
    ) -> Self {
        Self {
            field,
            required: false,
            rules,
            message,
        }
    }

    pub fn passes(&self, value: Option<&str>) -> bool {
        match value.filter(|v| !v.is_empty()) {
            None => !self.required,
            Some(v) => self.rules.iter().all(|rule| rule(v)),
        }
    }
}

pub fn validate<S: FieldSource + ?Sized>(checks: &[Check], source: &S) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    for check in checks {
        if !check.passes(source.field(check.field)) {
            errors.insert(check.field, check.message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub const SIGNUP_CHECKS: &[Check] = &[
    Check::required("email", &[is_valid_email], "Please provide a valid email."),
    Check::required(
        "username",
        &[min_chars::<4>],
        "Please provide a username with at least 4 characters.",
    ),
    Check::optional("username", &[not_email], "Username cannot be an email."),
    Check::required(
        "password",
        &[min_chars::<6>],
        "Password must be 6 characters or more.",
    ),
    Check::required("firstName", &[], "Please provide your first name."),
    Check::required("lastName", &[], "Please provide your last name."),
];
