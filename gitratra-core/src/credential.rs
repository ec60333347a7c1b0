//! Credential string parsing
//!
//! The CLI takes a single credential argument of the form `token:<value>`
//! (a personal access token) or `username:<value>` (basic auth; the
//! password comes from the `GITRATRA_PASSWORD` environment variable when
//! the client is built). Anything else is a configuration error reported
//! before the core runs.

use crate::error::{Error, Result};

/// Parsed form of the CLI credential argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Personal access token, sent as `Authorization: token <value>`
    Token(String),
    /// Account name for basic auth
    Username(String),
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (scheme, value) = s.split_once(':').ok_or_else(|| {
            Error::Config(format!(
                "credential {:?} must be \"token:<value>\" or \"username:<value>\"",
                s
            ))
        })?;
        if value.is_empty() {
            return Err(Error::Config(format!("credential {:?} has an empty value", s)));
        }
        match scheme {
            "token" => Ok(Credential::Token(value.to_string())),
            "username" => Ok(Credential::Username(value.to_string())),
            _ => Err(Error::Config(format!(
                "unknown credential scheme {:?}, expected \"token\" or \"username\"",
                scheme
            ))),
        }
    }
}
