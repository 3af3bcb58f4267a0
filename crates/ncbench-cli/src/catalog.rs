//! Verified bench-task catalog.
//!
//! The catalog is a local JSON file listing the pre-registered verified
//! instances a user can pick from (the `pullRequests` document the web UI
//! ships as `requestOptions.json`).

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "pullRequests")]
    pub pull_requests: Vec<CatalogEntry>,
}

/// One verified bench instance.
#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub instance_id: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("cannot read catalog {}: {}", path.display(), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("cannot parse catalog {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_document() {
        let doc = r#"{
            "pullRequests": [
                {
                    "instance_id": "astropy__astropy-12345",
                    "repo": "astropy/astropy",
                    "title": "Add unit-aware percentile",
                    "html_url": "https://github.com/astropy/astropy/pull/12345"
                },
                { "instance_id": "django__django-999" }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(doc).unwrap();
        assert_eq!(catalog.pull_requests.len(), 2);
        assert_eq!(catalog.pull_requests[0].instance_id, "astropy__astropy-12345");
        assert_eq!(catalog.pull_requests[1].repo, None);
    }

    #[test]
    fn test_empty_document_is_empty_catalog() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.pull_requests.is_empty());
    }
}
