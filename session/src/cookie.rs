use attendance_core::Person;
use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The cookie handed to a visitor on login.
///
/// It carries the person's details in the clear plus a hash over them keyed by the
/// server's secret. There is no cryptographic signature: the hash only lets the server
/// recognize a cookie it minted, it does not protect the cookie from tampering by a
/// party who also knows the secret. That matches the trust model of a single
/// self-hosted deployment rather than a multi-party protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCookie {
    pub person: Person,
    pub hash: String,
}

impl UserCookie {
    /// Create a cookie for a person, with the hash keyed by `secret`.
    pub fn new(person: Person, secret: &str) -> Result<Self, Error> {
        let hash = attendance_core::hash::hash(&person, secret).map_err(Error::Hash)?;
        Ok(Self { person, hash })
    }

    /// Check that the embedded hash matches what `secret` would produce for this person.
    pub fn is_valid(&self, secret: &str) -> bool {
        match attendance_core::hash::hash(&self.person, secret) {
            Ok(expected) => expected == self.hash,
            Err(_) => false,
        }
    }

    /// The key used to look up this person's open session: the hash itself, since it is
    /// already a stable, collision-resistant stand-in for the person's identity.
    pub fn session_key(&self) -> &str {
        &self.hash
    }

    /// Encode as the base64 string stored in the cookie's value.
    pub fn encode(&self) -> Result<String, Error> {
        let json = serde_json::to_vec(self).map_err(Error::Json)?;
        Ok(BASE64_STANDARD.encode(json))
    }

    /// Decode a cookie value previously produced by [`UserCookie::encode`].
    pub fn decode(value: &str) -> Result<Self, Error> {
        let json = BASE64_STANDARD.decode(value).map_err(Error::Base64)?;
        serde_json::from_slice(&json).map_err(Error::Json)
    }
}

#[derive(Debug)]
pub enum Error {
    Base64(base64::DecodeError),
    Json(serde_json::Error),
    Hash(attendance_core::hash::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(source) => write!(f, "cookie was not valid base64: {source}"),
            Self::Json(source) => write!(f, "cookie did not contain valid JSON: {source}"),
            Self::Hash(source) => write!(f, "failed to hash person for cookie: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(source) => Some(source),
            Self::Json(source) => Some(source),
            Self::Hash(source) => Some(source),
        }
    }
}
