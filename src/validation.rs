//! Declarative form validation.
//!
//! A [`FormSpec`] lists, per field, the constraints a submission has to
//! satisfy. Validation never short-circuits across fields so the form can be
//! re-rendered with every message at once.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Read access to submitted form values. Missing fields read as `""`.
pub trait FormFields {
    fn value(&self, name: &str) -> &str;
}

#[derive(Debug, Clone)]
pub enum Constraint {
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Required {
        message: &'static str,
    },
    Email {
        message: &'static str,
    },
    EqualTo {
        field: &'static str,
        message: &'static str,
    },
}

impl Constraint {
    pub fn length(min: usize, max: usize) -> Self {
        Constraint::Length {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn min_length(min: usize) -> Self {
        Constraint::Length {
            min: Some(min),
            max: None,
        }
    }

    fn check<F: FormFields + ?Sized>(&self, value: &str, form: &F) -> Option<String> {
        match self {
            Constraint::Length { min, max } => {
                let len = value.chars().count();
                let too_short = min.is_some_and(|m| len < m);
                let too_long = max.is_some_and(|m| len > m);
                if !too_short && !too_long {
                    return None;
                }
                Some(match (min, max) {
                    (Some(lo), Some(hi)) => {
                        format!("Field must be between {lo} and {hi} characters long.")
                    }
                    (Some(lo), None) => format!("Field must be at least {lo} characters long."),
                    (None, Some(hi)) => {
                        format!("Field cannot be longer than {hi} characters.")
                    }
                    (None, None) => return None,
                })
            }
            Constraint::Required { message } => {
                value.trim().is_empty().then(|| message.to_string())
            }
            Constraint::Email { message } => {
                (!is_valid_email(value.trim())).then(|| message.to_string())
            }
            Constraint::EqualTo { field, message } => {
                (value != form.value(field)).then(|| message.to_string())
            }
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Constraint table for one form.
#[derive(Debug, Clone, Default)]
pub struct FormSpec {
    fields: Vec<(&'static str, Vec<Constraint>)>,
}

impl FormSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, constraints: Vec<Constraint>) -> Self {
        self.fields.push((name, constraints));
        self
    }

    pub fn validate<F: FormFields + ?Sized>(&self, form: &F) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for (name, constraints) in &self.fields {
            let value = form.value(name);
            for constraint in constraints {
                if let Some(msg) = constraint.check(value, form) {
                    errors.add(name, msg);
                }
            }
        }
        errors
    }
}

/// Per-field error messages. Empty means the submission is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

lazy_static! {
    pub static ref REGISTER_FORM: FormSpec = FormSpec::new()
        .field("name", vec![Constraint::length(4, 25)])
        .field("username", vec![Constraint::length(5, 35)])
        .field(
            "email",
            vec![Constraint::Email {
                message: "Please enter a valid email address.",
            }],
        )
        .field(
            "password",
            vec![
                Constraint::Required {
                    message: "Please choose a password.",
                },
                Constraint::EqualTo {
                    field: "confirm",
                    message: "Passwords do not match.",
                },
            ],
        );

    pub static ref ARTICLE_FORM: FormSpec = FormSpec::new()
        .field("title", vec![Constraint::length(5, 100)])
        .field("content", vec![Constraint::min_length(10)]);
}
