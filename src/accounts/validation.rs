//! Profile form parsing and validation.
//!
//! Multipart bodies are collected into a [`ProfileForm`] by the handlers and
//! turned into typed, validated values here. Every failure is an
//! [`AppError::Validation`] carrying the message shown to the client.

use crate::types::{AppError, Gender, ImageUpload, NewProfile, ProfileUpdate, Result};
use std::collections::HashMap;

/// Youngest age accepted at registration.
pub const MINIMUM_AGE: u32 = 18;

/// Raw text fields and the optional `image` part of a profile form.
#[derive(Debug, Default)]
pub struct ProfileForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

/// A fully validated registration request.
#[derive(Debug)]
pub struct Registration {
    pub profile: NewProfile,
    pub password: String,
    pub image: ImageUpload,
}

/// A validated partial update of the caller's own profile.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub update: ProfileUpdate,
    pub password: Option<String>,
    pub image: Option<ImageUpload>,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text field. A repeated field keeps its last value.
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    /// Validate every registration field, in form order.
    pub fn into_registration(mut self) -> Result<Registration> {
        let name = required(&self.fields, "name", "Name cannot be empty")?;
        let email = email(self.fields.get("email").map(String::as_str).unwrap_or(""))?;
        let password = password(self.fields.get("password").map(String::as_str).unwrap_or(""))?;
        let gender = match non_blank(&self.fields, "gender") {
            Some(value) => value.parse::<Gender>()?,
            None => Gender::default(),
        };
        let age = age(self.fields.get("age").map(String::as_str).unwrap_or(""))?;
        let address = required(&self.fields, "address", "Address cannot be empty")?;
        let city = required(&self.fields, "city", "City cannot be empty")?;
        let state = required(&self.fields, "state", "State cannot be empty")?;
        let zip = required(&self.fields, "zip", "ZIP cannot be empty")?;
        let image = self
            .image
            .take()
            .filter(|image| !image.bytes.is_empty())
            .ok_or_else(|| AppError::Validation("Image cannot be empty".to_string()))?;

        Ok(Registration {
            profile: NewProfile {
                name,
                email,
                gender,
                age,
                address,
                city,
                state,
                zip,
            },
            password,
            image,
        })
    }

    /// Validate the fields that are present; absent fields stay untouched.
    ///
    /// `imageUpdate=true` without an `image` part is rejected. An `image` part
    /// is uploaded whenever it is present.
    pub fn into_changes(mut self) -> Result<ProfileChanges> {
        let fields = &self.fields;
        let mut update = ProfileUpdate::default();

        if let Some(value) = fields.get("name") {
            update.name = Some(not_empty(value, "Name cannot be empty")?);
        }
        if let Some(value) = fields.get("email") {
            update.email = Some(email(value)?);
        }
        if let Some(value) = non_blank(fields, "gender") {
            update.gender = Some(value.parse::<Gender>()?);
        }
        if let Some(value) = fields.get("age") {
            update.age = Some(age(value)?);
        }
        if let Some(value) = fields.get("address") {
            update.address = Some(not_empty(value, "Address cannot be empty")?);
        }
        if let Some(value) = fields.get("city") {
            update.city = Some(not_empty(value, "City cannot be empty")?);
        }
        if let Some(value) = fields.get("state") {
            update.state = Some(not_empty(value, "State cannot be empty")?);
        }
        if let Some(value) = fields.get("zip") {
            update.zip = Some(not_empty(value, "ZIP cannot be empty")?);
        }

        let password = match fields.get("password") {
            Some(value) => Some(password(value)?),
            None => None,
        };

        let wants_image = fields
            .get("imageUpdate")
            .map(|flag| flag.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let image = self.image.take().filter(|image| !image.bytes.is_empty());
        if wants_image && image.is_none() {
            return Err(AppError::Validation("Image cannot be empty".to_string()));
        }

        Ok(ProfileChanges {
            update,
            password,
            image,
        })
    }
}

fn non_blank<'a>(fields: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required(fields: &HashMap<String, String>, name: &str, message: &str) -> Result<String> {
    not_empty(fields.get(name).map(String::as_str).unwrap_or(""), message)
}

fn not_empty(value: &str, message: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

// Passwords are taken verbatim; surrounding whitespace is part of the secret.
fn password(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(AppError::Validation("Password cannot be empty".to_string()));
    }
    Ok(value.to_string())
}

fn email(value: &str) -> Result<String> {
    let value = value.trim();
    if is_valid_email(value) {
        Ok(value.to_string())
    } else {
        Err(AppError::Validation("Invalid Email Address".to_string()))
    }
}

fn age(value: &str) -> Result<u32> {
    let age: i64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Age must be a whole number".to_string()))?;

    if age < i64::from(MINIMUM_AGE) {
        return Err(AppError::Validation(
            "You must be above 18 years of age to register.".to_string(),
        ));
    }

    u32::try_from(age).map_err(|_| AppError::Validation("Age is out of range".to_string()))
}

/// Structural email check: `local@domain.tld`, no whitespace, sane labels.
pub fn is_valid_email(value: &str) -> bool {
    if value.len() > 254 || value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || local.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let valid_labels = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    valid_labels && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use rstest::rstest;

    fn image() -> ImageUpload {
        ImageUpload {
            bytes: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"),
            file_name: Some("me.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
        }
    }

    fn registration_form() -> ProfileForm {
        let mut form = ProfileForm::new();
        for (name, value) in [
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("password", "analytical-engine"),
            ("gender", "Female"),
            ("age", "36"),
            ("address", "12 St James's Square"),
            ("city", "London"),
            ("state", "Greater London"),
            ("zip", "SW1Y 4JH"),
        ] {
            form.insert_field(name, value);
        }
        form.set_image(image());
        form
    }

    fn validation_message(result: Result<impl std::fmt::Debug>) -> String {
        match result {
            Err(AppError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_registration() {
        let registration = registration_form().into_registration().unwrap();

        assert_eq!(registration.profile.name, "Ada Lovelace");
        assert_eq!(registration.profile.gender, Gender::Female);
        assert_eq!(registration.profile.age, 36);
        assert_eq!(registration.password, "analytical-engine");
        assert_eq!(registration.image.file_name.as_deref(), Some("me.jpg"));
    }

    #[test]
    fn test_gender_defaults_to_male() {
        let mut form = registration_form();
        form.insert_field("gender", "");

        let registration = form.into_registration().unwrap();

        assert_eq!(registration.profile.gender, Gender::Male);
    }

    #[rstest]
    #[case("name", "", "Name cannot be empty")]
    #[case("name", "   ", "Name cannot be empty")]
    #[case("email", "not-an-email", "Invalid Email Address")]
    #[case("password", "", "Password cannot be empty")]
    #[case("age", "17", "You must be above 18 years of age to register.")]
    #[case("age", "-4", "You must be above 18 years of age to register.")]
    #[case("age", "eighteen", "Age must be a whole number")]
    #[case("address", "", "Address cannot be empty")]
    #[case("city", "", "City cannot be empty")]
    #[case("state", "", "State cannot be empty")]
    #[case("zip", "", "ZIP cannot be empty")]
    fn test_registration_field_errors(
        #[case] field: &str,
        #[case] value: &str,
        #[case] expected: &str,
    ) {
        let mut form = registration_form();
        form.insert_field(field, value);

        assert_eq!(validation_message(form.into_registration()), expected);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let mut form = ProfileForm::new();
        form.insert_field("email", "a@b.co");

        assert_eq!(
            validation_message(form.into_registration()),
            "Name cannot be empty"
        );
    }

    #[test]
    fn test_age_eighteen_accepted() {
        let mut form = registration_form();
        form.insert_field("age", "18");

        assert_eq!(form.into_registration().unwrap().profile.age, 18);
    }

    #[test]
    fn test_unknown_gender_rejected() {
        let mut form = registration_form();
        form.insert_field("gender", "Robot");

        assert!(matches!(
            form.into_registration(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_registration_requires_image() {
        let mut form = ProfileForm::new();
        for (name, value) in registration_form().fields {
            form.insert_field(name, value);
        }

        assert_eq!(
            validation_message(form.into_registration()),
            "Image cannot be empty"
        );
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut form = registration_form();
        form.set_image(ImageUpload {
            bytes: Bytes::new(),
            file_name: Some("empty.png".to_string()),
            content_type: None,
        });

        assert_eq!(
            validation_message(form.into_registration()),
            "Image cannot be empty"
        );
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("first.last+tag@sub.example.org", true)]
    #[case("user@localhost", false)]
    #[case("@example.com", false)]
    #[case("user@", false)]
    #[case("user@@example.com", false)]
    #[case("us er@example.com", false)]
    #[case("user@exa_mple.com", false)]
    #[case("user@example.c", false)]
    #[case(".user@example.com", false)]
    #[case("user@-example.com", false)]
    fn test_email_shapes(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(value), valid, "email: {}", value);
    }

    #[test]
    fn test_changes_only_include_present_fields() {
        let mut form = ProfileForm::new();
        form.insert_field("city", " Paris ");
        form.insert_field("age", "40");

        let changes = form.into_changes().unwrap();

        assert_eq!(changes.update.city.as_deref(), Some("Paris"));
        assert_eq!(changes.update.age, Some(40));
        assert!(changes.update.name.is_none());
        assert!(changes.update.email.is_none());
        assert!(changes.password.is_none());
        assert!(changes.image.is_none());
    }

    #[test]
    fn test_changes_validate_present_fields() {
        let mut form = ProfileForm::new();
        form.insert_field("email", "broken");

        assert_eq!(
            validation_message(form.into_changes()),
            "Invalid Email Address"
        );
    }

    #[test]
    fn test_changes_carry_password_and_image() {
        let mut form = ProfileForm::new();
        form.insert_field("password", "new-secret");
        form.insert_field("imageUpdate", "true");
        form.set_image(image());

        let changes = form.into_changes().unwrap();

        assert_eq!(changes.password.as_deref(), Some("new-secret"));
        assert!(changes.image.is_some());
        assert!(changes.update.is_empty());
    }

    #[test]
    fn test_image_update_flag_requires_image() {
        let mut form = ProfileForm::new();
        form.insert_field("imageUpdate", "true");

        assert_eq!(
            validation_message(form.into_changes()),
            "Image cannot be empty"
        );
    }
}
