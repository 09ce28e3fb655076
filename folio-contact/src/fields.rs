use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// The "valid e-mail address" production browsers apply to `type=email` inputs.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Wire name, as posted to the relay.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == raw)
            .ok_or_else(|| ValidationError::UnknownField(raw.to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(Field),

    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),

    #[error("unknown form field: {0}")]
    UnknownField(String),
}

/// The four contact form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Same checks a browser runs before firing `submit`: every field is
    /// required, and the email (whitespace-stripped) must look like one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in Field::ALL {
            let value = match field {
                Field::Email => self.email.trim(),
                _ => self.get(field),
            };
            if value.is_empty() {
                return Err(ValidationError::Missing(field));
            }
        }
        let email = self.email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    /// `(wire name, value)` pairs in form order. The email is sent trimmed.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            (Field::Name.as_str(), self.name.as_str()),
            (Field::Email.as_str(), self.email.trim()),
            (Field::Subject.as_str(), self.subject.as_str()),
            (Field::Message.as_str(), self.message.as_str()),
        ]
    }
}
