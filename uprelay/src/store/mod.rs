//! Remote object store types and client.
//!
//! Uploads target a single fixed repository in a version-controlled file
//! hosting service (the GitHub contents API). [`ObjectPath`] addresses one
//! object as `{brand}/{file}`, [`VersionMarker`] is the store's identifier
//! for the object's current version (required to overwrite safely), and
//! [`GitHubStore`] is the HTTP client performing the read and conditional
//! write.

pub mod github;

pub use github::GitHubStore;

use std::fmt;

use url::Url;

use crate::errors::Error;

/// Target object in the remote store, addressed by brand namespace and file
/// name under the fixed repository. Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    brand: String,
    file: String,
}

impl ObjectPath {
    pub fn new(brand: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            file: file.into(),
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Derive the public URL for this object: `{base}/{brand}/{file}`.
    ///
    /// Segments are appended with percent-encoding, so file names with spaces
    /// or unicode produce valid URLs.
    pub fn public_url(&self, base: &Url) -> Result<Url, Error> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Other(anyhow::anyhow!("public base URL cannot be a base: {base}")))?
            .pop_if_empty()
            .extend([self.brand.as_str(), self.file.as_str()]);
        Ok(url)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.brand, self.file)
    }
}

/// Opaque token identifying the current version of an object in the remote
/// store. Fetched immediately before a write and passed through to it; absent
/// when the object does not exist yet. Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker(String);

impl VersionMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let base = Url::parse("https://static.thegreekdirectory.org").unwrap();
        let path = ObjectPath::new("acme", "logo.png");
        assert_eq!(
            path.public_url(&base).unwrap().as_str(),
            "https://static.thegreekdirectory.org/acme/logo.png"
        );
    }

    #[test]
    fn test_public_url_with_trailing_slash_base() {
        let base = Url::parse("https://static.example.org/").unwrap();
        let path = ObjectPath::new("acme", "logo.png");
        assert_eq!(path.public_url(&base).unwrap().as_str(), "https://static.example.org/acme/logo.png");
    }

    #[test]
    fn test_public_url_encodes_file_name() {
        let base = Url::parse("https://static.example.org").unwrap();
        let path = ObjectPath::new("acme", "brand logo.png");
        assert_eq!(
            path.public_url(&base).unwrap().as_str(),
            "https://static.example.org/acme/brand%20logo.png"
        );
    }

    #[test]
    fn test_display() {
        let path = ObjectPath::new("acme", "logo.png");
        assert_eq!(path.to_string(), "acme/logo.png");
    }
}
