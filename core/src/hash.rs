use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

/// A hex-encoded SHA-256 digest, 64 characters long.
pub type Digest64 = String;

/// Hash an arbitrary serializable value together with a secret, producing a 64-character
/// hex digest that is unguessable without the secret but reproducible with it.
///
/// The value and secret are folded into a single JSON envelope, `{"value": v, "key":
/// secret}`, before hashing, rather than concatenated as strings, so that the digest
/// cannot be confused by values containing the secret's own bytes.
pub fn hash<T: Serialize>(value: &T, secret: &str) -> Result<Digest64, Error> {
    let envelope = serde_json::json!({ "value": value, "key": secret });
    let bytes = serde_json::to_vec(&envelope).map_err(Error::Unserializable)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug)]
pub enum Error {
    /// The value could not be serialized into the hashing envelope.
    Unserializable(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unserializable(source) => write!(f, "value could not be hashed: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unserializable(source) => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_for_the_same_value_and_secret() {
        let a = hash(&"jane.doe", "s3cr3t").unwrap();
        let b = hash(&"jane.doe", "s3cr3t").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_with_a_different_secret() {
        let a = hash(&"jane.doe", "s3cr3t").unwrap();
        let b = hash(&"jane.doe", "different").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_differs_with_a_different_value() {
        let a = hash(&"jane.doe", "s3cr3t").unwrap();
        let b = hash(&"john.doe", "s3cr3t").unwrap();
        assert_ne!(a, b);
    }
}
