use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Individual,
    Business,
}

impl UserType {
    pub const ALL: [UserType; 2] = [UserType::Individual, UserType::Business];

    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Individual => "individual",
            UserType::Business => "business",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user type '{0}', expected 'individual' or 'business'")]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        UserType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownUserType(raw.to_string()))
    }
}

/// Raw form draft as typed by the user. Nothing here is trimmed or checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitlistFields {
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

impl WaitlistFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>, user_type: UserType) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            user_type,
        }
    }

    /// Checks the draft and builds the normalized record that is sent to the store.
    ///
    /// The email shape is checked before the name, so a draft failing both
    /// reports [`ValidationError::InvalidEmail`].
    pub fn validate(&self) -> Result<WaitlistEntry, ValidationError> {
        if !looks_like_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        Ok(WaitlistEntry {
            name: name.to_string(),
            email: self.email.trim().to_lowercase(),
            user_type: self.user_type,
        })
    }
}

/// Record persisted remotely. Only constructible through [`WaitlistFields::validate`]
/// or deserialization of a record the store already accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    name: String,
    email: String,
    user_type: UserType,
}

impl WaitlistEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }
}

/// Permissive email shape check: `\S+@\S+\.\S+` anywhere in the input.
///
/// Not RFC validation. Surrounding text and whitespace are allowed as long as
/// some whitespace-free `local@domain.tld` run is present.
pub fn looks_like_email(raw: &str) -> bool {
    let chars: Vec<char> = raw.chars().collect();

    chars.iter().enumerate().any(|(at, c)| {
        if *c != '@' || at == 0 || chars[at - 1].is_whitespace() {
            return false;
        }

        let domain: Vec<char> = chars[at + 1..]
            .iter()
            .take_while(|c| !c.is_whitespace())
            .copied()
            .collect();

        // The dot needs at least one character on either side within the run.
        domain
            .iter()
            .enumerate()
            .any(|(idx, c)| *c == '.' && idx > 0 && idx + 1 < domain.len())
    })
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
