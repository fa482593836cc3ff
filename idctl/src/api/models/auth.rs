//! Request/response models for signup, login, and profile-image operations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use utoipa::{IntoParams, ToSchema};

use super::users::PublicUser;
use crate::config::PasswordConfig;
use crate::errors::Error;
use crate::images;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Shape check only; addresses are stored as given, never canonicalized
    RE.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static regex"))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Optional inline `data:image/...;base64,` profile image
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl SignupRequest {
    /// Validate request shape, collecting one message per offending field
    pub fn validate(&self, password_config: &PasswordConfig) -> Result<(), Error> {
        let mut errors = BTreeMap::new();

        if self.email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        } else if !email_regex().is_match(&self.email) {
            errors.insert("email".to_string(), "Email is invalid".to_string());
        }

        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        } else if self.password.len() < password_config.min_length {
            errors.insert(
                "password".to_string(),
                format!("Password must be at least {} characters", password_config.min_length),
            );
        } else if self.password.len() > password_config.max_length {
            errors.insert(
                "password".to_string(),
                format!("Password must be no more than {} characters", password_config.max_length),
            );
        }

        if self.name.is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        } else if self.name.trim().len() < 2 {
            errors.insert("name".to_string(), "Name must be at least 2 characters".to_string());
        }

        if let Some(image) = &self.profile_image {
            if !images::is_image_data_uri(image) {
                errors.insert("profile_image".to_string(), "Invalid image format".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = BTreeMap::new();

        if self.email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        }
        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProfileImageRequest {
    /// Inline `data:image/...;base64,` payload
    pub profile_image: String,
}

impl ProfileImageRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = BTreeMap::new();

        if self.profile_image.is_empty() {
            errors.insert("profile_image".to_string(), "Image is required".to_string());
        } else if !images::is_image_data_uri(&self.profile_image) {
            errors.insert("profile_image".to_string(), "Invalid image format".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileImageResponse {
    pub message: String,
    pub profile_image: String,
}

/// Query parameters for minting an upload grant
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct UploadUrlQuery {
    /// Content type of the image to upload (image/jpeg, image/png, image/gif)
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommitUploadRequest {
    /// Object key returned by the upload grant
    pub object_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupRequest {
        SignupRequest {
            email: "a@b.com".to_string(),
            password: "longenough1".to_string(),
            name: "Ann".to_string(),
            profile_image: None,
        }
    }

    fn field_errors(result: Result<(), Error>) -> BTreeMap<String, String> {
        match result {
            Err(Error::Validation { errors }) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(valid_signup().validate(&PasswordConfig::default()).is_ok());
    }

    #[test]
    fn test_signup_collects_all_field_errors() {
        let request = SignupRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: " a ".to_string(),
            profile_image: None,
        };

        let errors = field_errors(request.validate(&PasswordConfig::default()));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["email"], "Email is invalid");
        assert_eq!(errors["password"], "Password must be at least 8 characters");
        assert_eq!(errors["name"], "Name must be at least 2 characters");
    }

    #[test]
    fn test_signup_requires_fields() {
        let request = SignupRequest {
            email: String::new(),
            password: String::new(),
            name: String::new(),
            profile_image: None,
        };

        let errors = field_errors(request.validate(&PasswordConfig::default()));
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["password"], "Password is required");
        assert_eq!(errors["name"], "Name is required");
    }

    #[test]
    fn test_signup_name_trimmed_length() {
        let mut request = valid_signup();
        request.name = "  Jo  ".to_string();
        assert!(request.validate(&PasswordConfig::default()).is_ok());
    }

    #[test]
    fn test_signup_rejects_non_image_payload() {
        let mut request = valid_signup();
        request.profile_image = Some("data:text/plain;base64,aGVsbG8=".to_string());

        let errors = field_errors(request.validate(&PasswordConfig::default()));
        assert_eq!(errors["profile_image"], "Invalid image format");
    }

    #[test]
    fn test_email_shape_is_checked_not_canonicalized() {
        let mut request = valid_signup();
        request.email = "Mixed.Case@Example.COM".to_string();
        assert!(request.validate(&PasswordConfig::default()).is_ok());

        request.email = "missing-at-sign.com".to_string();
        assert!(request.validate(&PasswordConfig::default()).is_err());

        request.email = "no-dot@domain".to_string();
        assert!(request.validate(&PasswordConfig::default()).is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let request = LoginRequest {
            email: String::new(),
            password: String::new(),
        };
        let errors = field_errors(request.validate());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_profile_image_request_shape() {
        let request = ProfileImageRequest {
            profile_image: "data:image/jpeg;base64,AAAA".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = ProfileImageRequest {
            profile_image: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
