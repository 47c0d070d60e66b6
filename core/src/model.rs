use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A physical location people check into, identified by its name.
///
/// Equality is byte-identity on the name: the registry loads a flat list of names
/// from XML, and nothing in the system compares locations any other way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(pub String);

impl Location {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A street address, kept as its own type since it appears both on locations and on people.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    pub city: String,
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {}",
            self.street, self.number, self.zip_code, self.city
        )
    }
}

/// The person attending a location, as entered on the login form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub address: Address,
}

impl Person {
    /// The six fields a person-query on the analyzer CLI may match against.
    pub fn matches_token(&self, token: &str) -> bool {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.address.street.as_str(),
            self.address.number.as_str(),
            self.address.zip_code.as_str(),
            self.address.city.as_str(),
        ]
        .iter()
        .any(|field| *field == token)
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.first_name, self.last_name, self.address)
    }
}
