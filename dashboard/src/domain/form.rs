//! Create/edit form model for directory users.
//!
//! The form carries only the four editable fields. Validation happens here,
//! before anything reaches the network; a rejected form becomes an
//! [`ErrorCode::Validation`](crate::domain::ErrorCode::Validation) error with
//! per-field messages in its details.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{Address, Company, Error, NewUser, User};

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Company,
}

impl FormField {
    /// Field name as used in error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    /// Message for one field, if it failed validation.
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate failing fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_owned());
    }
}

impl From<FormErrors> for Error {
    fn from(errors: FormErrors) -> Self {
        let details: Map<String, Value> = errors
            .iter()
            .map(|(field, message)| (field.as_str().to_owned(), Value::from(message)))
            .collect();
        Self::validation("user form is invalid").with_details(Value::Object(details))
    }
}

/// Values entered in the create/edit user form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl UserForm {
    /// Prefill the form from an existing user.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            company: user.company.name.clone(),
        }
    }

    /// Check every field, collecting all failures.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::{FormField, UserForm};
    ///
    /// let form = UserForm { email: "nope".into(), ..UserForm::default() };
    /// let errors = form.validate().expect_err("blank form is invalid");
    /// assert_eq!(errors.get(FormField::Email), Some("Please enter a valid email"));
    /// assert_eq!(errors.len(), 4);
    /// ```
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.insert(FormField::Name, "Name is required");
        }
        if !email_regex().is_match(self.email.trim()) {
            errors.insert(FormField::Email, "Please enter a valid email");
        }
        if self.phone.trim().is_empty() {
            errors.insert(FormField::Phone, "Phone is required");
        }
        if self.company.trim().is_empty() {
            errors.insert(FormField::Company, "Company is required");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build the request body for this form.
    ///
    /// New users get the placeholder address and company tagline; an edited
    /// user keeps its existing address, catch phrase and tagline.
    pub fn to_new_user(&self, existing: Option<&User>) -> NewUser {
        let name = self.name.trim().to_owned();
        let website = format!(
            "{}.com",
            name.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase()
        );
        let (address, company) = match existing {
            Some(user) => (
                user.address.clone(),
                Company {
                    name: self.company.trim().to_owned(),
                    ..user.company.clone()
                },
            ),
            None => (Address::default(), Company::named(self.company.trim())),
        };

        NewUser {
            username: name.clone(),
            name,
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            website,
            address,
            company,
        }
    }
}
