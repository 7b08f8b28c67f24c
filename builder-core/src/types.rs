//! Domain types shared by the API client, the store and the web workflows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest origin name the builder API accepts.
pub const ORIGIN_NAME_MAX_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed origin name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginName(pub String);

impl OriginName {
    /// Runs the local (non-network) checks on a proposed origin name.
    ///
    /// Order matters for the message shown to the user: an empty field
    /// reports `Required` before anything else.
    pub fn validate(candidate: &str) -> Result<(), ValidationError> {
        if candidate.is_empty() {
            return Err(ValidationError::Required);
        }
        if candidate.chars().count() > ORIGIN_NAME_MAX_LEN {
            return Err(ValidationError::TooLong {
                max: ORIGIN_NAME_MAX_LEN,
            });
        }
        let mut chars = candidate.chars();
        let leading_ok = chars
            .next()
            .map(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .unwrap_or(false);
        let rest_ok = chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
        });
        if leading_ok && rest_ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OriginName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OriginName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// An origin as returned by the builder API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default)]
    pub id: String,
    pub name: OriginName,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_package_visibility: Option<String>,
}

impl Origin {
    /// Minimal origin, as the store sees one right after creation.
    pub fn named(name: impl Into<OriginName>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            owner_id: String::new(),
            private_key_name: None,
            default_package_visibility: None,
        }
    }
}

/// The signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub auth_token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth_token: auth_token.into(),
        }
    }
}

// Tokens end up in logs through `{:?}` far too easily.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Danger,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Danger => write!(f, "danger"),
        }
    }
}

/// A transient message surfaced by the application shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn danger(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind: NotificationKind::Danger,
        }
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind: NotificationKind::Success,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(OriginName::from("core").to_string(), "core");
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = Session::new("bob", "tok123");
        let rendered = format!("{session:?}");
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("tok123"));
    }

    #[test]
    fn validate_accepts_typical_names() {
        for name in ["core", "my-origin", "a_b", "0rigin", "x"] {
            assert_eq!(OriginName::validate(name), Ok(()), "{name}");
        }
    }

    #[test]
    fn validate_reports_required_before_pattern() {
        assert_eq!(OriginName::validate(""), Err(ValidationError::Required));
    }

    #[test]
    fn validate_rejects_leading_separator_and_uppercase() {
        assert_eq!(
            OriginName::validate("-core"),
            Err(ValidationError::InvalidCharacters)
        );
        assert_eq!(
            OriginName::validate("Core"),
            Err(ValidationError::InvalidCharacters)
        );
        assert_eq!(
            OriginName::validate("my origin"),
            Err(ValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn validate_enforces_max_length() {
        let at_limit = "a".repeat(ORIGIN_NAME_MAX_LEN);
        let over = "a".repeat(ORIGIN_NAME_MAX_LEN + 1);
        assert_eq!(OriginName::validate(&at_limit), Ok(()));
        assert_eq!(
            OriginName::validate(&over),
            Err(ValidationError::TooLong {
                max: ORIGIN_NAME_MAX_LEN
            })
        );
    }

    #[test]
    fn origin_deserializes_with_missing_optional_fields() {
        let origin: Origin = serde_yaml::from_str("name: core\n").expect("parse");
        assert_eq!(origin, Origin::named("core"));
    }
}
