//! Element-set retrieval: CelesTrak with an on-disk cache, or a local TLE file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::element_set::{parse_element_text, ElementSet};
use crate::error::{ElementSetError, RetrievalError};

/// CelesTrak general-perturbations query endpoint
pub const DEFAULT_SOURCE_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

/// Anything that can turn a catalog identifier into a usable element set.
pub trait ElementSource {
    fn fetch(&self, catalog_id: u32) -> Result<ElementSet, RetrievalError>;
}

/// Fetches element sets over HTTP and keeps the raw text in a cache directory.
///
/// A cached file is reused as-is on later runs; delete it to force a refresh.
pub struct CelestrakSource {
    base_url: String,
    cache_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl CelestrakSource {
    pub fn new(
        base_url: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("collision-risk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(RetrievalError::Client)?;

        Ok(Self {
            base_url: base_url.into(),
            cache_dir: cache_dir.into(),
            client,
        })
    }

    /// Cache file for one catalog identifier
    pub fn cache_path(&self, catalog_id: u32) -> PathBuf {
        self.cache_dir.join(format!("tle-CATNR-{}.txt", catalog_id))
    }

    fn read_cached(&self, catalog_id: u32) -> Option<ElementSet> {
        let path = self.cache_path(catalog_id);
        let text = fs::read_to_string(&path).ok()?;

        match select(&text, catalog_id) {
            Ok(set) => {
                log::debug!("Using cached element set {:?}", path);
                Some(set)
            }
            Err(e) => {
                log::warn!("Ignoring unusable element cache {:?}: {}", path, e);
                None
            }
        }
    }

    fn download(&self, catalog_id: u32) -> Result<String, RetrievalError> {
        let catnr = catalog_id.to_string();
        log::info!("Fetching element set for catalog {} from {}", catalog_id, self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("CATNR", catnr.as_str()), ("FORMAT", "TLE")])
            .send()
            .map_err(|source| RetrievalError::Network {
                id: catalog_id,
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RetrievalError::NotFound(catalog_id));
        }
        if !status.is_success() {
            return Err(RetrievalError::Http {
                id: catalog_id,
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| RetrievalError::Network {
            id: catalog_id,
            source,
        })
    }

    fn store(&self, catalog_id: u32, text: &str) -> Result<(), RetrievalError> {
        let path = self.cache_path(catalog_id);
        fs::create_dir_all(&self.cache_dir)
            .and_then(|_| fs::write(&path, text))
            .map_err(|source| RetrievalError::Cache { path, source })
    }
}

impl ElementSource for CelestrakSource {
    fn fetch(&self, catalog_id: u32) -> Result<ElementSet, RetrievalError> {
        if let Some(set) = self.read_cached(catalog_id) {
            return Ok(set);
        }

        let text = self.download(catalog_id)?;
        let set = select(&text, catalog_id)?;

        // Only text that parsed is worth caching.
        if let Err(e) = self.store(catalog_id, &text) {
            log::warn!("{}", e);
        }

        Ok(set)
    }
}

/// Serves element sets from a local 2-line or 3-line file.
#[derive(Debug, Default)]
pub struct TleFileSource {
    sets: HashMap<u32, ElementSet>,
}

impl TleFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        log::info!("Loading element sets from {:?}", path);

        let text = fs::read_to_string(path).map_err(|source| RetrievalError::Cache {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text).map_err(|source| RetrievalError::File {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_text(text: &str) -> Result<Self, ElementSetError> {
        let parsed = parse_element_text(text)?;

        let mut sets = HashMap::with_capacity(parsed.len());
        for set in parsed {
            // First occurrence wins, matching the order of the file.
            sets.entry(set.catalog_id).or_insert(set);
        }
        Ok(Self { sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl ElementSource for TleFileSource {
    fn fetch(&self, catalog_id: u32) -> Result<ElementSet, RetrievalError> {
        self.sets
            .get(&catalog_id)
            .cloned()
            .ok_or(RetrievalError::NotFound(catalog_id))
    }
}

/// Pick the element set for `catalog_id` out of fetched text.
fn select(text: &str, catalog_id: u32) -> Result<ElementSet, RetrievalError> {
    let sets = parse_element_text(text).map_err(|source| RetrievalError::Parse {
        id: catalog_id,
        source,
    })?;

    sets.into_iter()
        .find(|s| s.catalog_id == catalog_id)
        .ok_or(RetrievalError::NotFound(catalog_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::element_set::fixtures::*;

    fn two_sets() -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            SAT_A_LINE1, SAT_A_LINE2, SAT_B_LINE1, SAT_B_LINE2
        )
    }

    #[test]
    fn test_file_source_lookup() {
        let source = TleFileSource::from_text(&two_sets()).unwrap();

        assert_eq!(source.len(), 2);
        assert_eq!(source.fetch(2828).unwrap().catalog_id, 2828);
        assert!(matches!(
            source.fetch(25544),
            Err(RetrievalError::NotFound(25544))
        ));
    }

    #[test]
    fn test_file_source_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TleFileSource::open(dir.path().join("absent.txt"));
        assert!(matches!(result, Err(RetrievalError::Cache { .. })));
    }

    #[test]
    fn test_celestrak_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        // Unroutable URL: any network access would fail the test.
        let source = CelestrakSource::new("http://127.0.0.1:9/gp.php", dir.path()).unwrap();

        let text = format!("SAT A\n{}\n{}\n", SAT_A_LINE1, SAT_A_LINE2);
        fs::write(source.cache_path(13777), text).unwrap();

        let set = source.fetch(13777).unwrap();
        assert_eq!(set.catalog_id, 13777);
        assert_eq!(set.name.as_deref(), Some("SAT A"));
    }

    #[test]
    fn test_file_source_names_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tle");
        fs::write(&path, format!("{}\n", SAT_A_LINE1)).unwrap();

        match TleFileSource::open(&path) {
            Err(RetrievalError::File { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a file error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_celestrak_unreachable_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("tle");
        // Nothing listens on the discard port.
        let source = CelestrakSource::new("http://127.0.0.1:9/gp.php", &cache_dir).unwrap();

        assert!(matches!(
            source.fetch(13777),
            Err(RetrievalError::Network { id: 13777, .. })
        ));
        assert!(!source.cache_path(13777).exists());
        assert!(!cache_dir.exists());
    }

    #[test]
    fn test_cache_path_naming() {
        let source = CelestrakSource::new(DEFAULT_SOURCE_URL, "cache").unwrap();
        assert_eq!(
            source.cache_path(2828),
            PathBuf::from("cache").join("tle-CATNR-2828.txt")
        );
    }

    #[test]
    fn test_select_wrong_object_is_not_found() {
        let text = format!("{}\n{}\n", SAT_A_LINE1, SAT_A_LINE2);
        assert!(matches!(
            select(&text, 2828),
            Err(RetrievalError::NotFound(2828))
        ));
    }
}
