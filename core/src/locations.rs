use crate::model::Location;
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// An immutable set of known locations, loaded once from an XML registry file at startup.
///
/// There is no mechanism to add or remove a location while the service is running;
/// operators change the registry file and restart.
#[derive(Debug)]
pub struct Locations {
    all: Vec<Location>,
}

impl Locations {
    /// Load the registry from an XML file on disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Io {
                path: path.display().to_string(),
                source,
            })?;

        Self::parse(&content)
    }

    /// Parse the registry from XML text directly, mainly for tests.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let document: Document = quick_xml::de::from_str(content)?;
        let all = document.location.into_iter().map(Location).collect();

        Ok(Self { all })
    }

    /// Whether `location` is a known, registered location.
    pub fn contains(&self, location: &Location) -> bool {
        self.all.contains(location)
    }

    /// Look up a registered location by name.
    pub fn get(&self, name: &str) -> Option<&Location> {
        self.all.iter().find(|location| location.as_str() == name)
    }

    /// Iterate over every known location, in the order the registry file listed them.
    pub fn all(&self) -> impl Iterator<Item = &Location> {
        self.all.iter()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Locations")]
struct Document {
    #[serde(rename = "Location", default)]
    location: Vec<String>,
}

#[derive(Debug)]
pub enum Error {
    Io {
        path: String,
        source: std::io::Error,
    },
    Xml(quick_xml::de::DeError),
}

impl From<quick_xml::de::DeError> for Error {
    fn from(source: quick_xml::de::DeError) -> Self {
        Self::Xml(source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read locations file {path:?}: {source}"),
            Self::Xml(source) => write!(f, "failed to parse locations registry: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Xml(source) => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"
        <Locations>
            <Location>DHBW Mosbach</Location>
            <Location>Alte Mälzerei</Location>
        </Locations>
    "#;

    #[test]
    fn parses_every_location_in_the_registry() {
        let locations = Locations::parse(REGISTRY).unwrap();
        assert_eq!(locations.len(), 2);
        assert!(locations.contains(&Location::from("DHBW Mosbach")));
        assert!(!locations.contains(&Location::from("Unknown Place")));
    }

    #[test]
    fn preserves_registry_order() {
        let locations = Locations::parse(REGISTRY).unwrap();
        let names: Vec<&str> = locations.all().map(Location::as_str).collect();
        assert_eq!(names, vec!["DHBW Mosbach", "Alte Mälzerei"]);
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(Locations::parse("<Locations><Location>").is_err());
    }
}
