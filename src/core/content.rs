//! Narrative content tables
//!
//! The narrative renderer reads its text from a JSON document keyed by
//! element symbol. This module owns that document's schema, the
//! [`ContentSource`] seam it is fetched through, and the load state machine.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --begin_loading--> Loading --ok--> Ready
//!                                          \--err--> Failed
//! ```
//!
//! Any state may be reloaded. Rendering never waits on a load: callers pass
//! the current [`ContentState`] and get placeholders until it is `Ready`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{Result, SajuError};
use super::models::Element;

#[cfg(test)]
use mockall::automock;

/// Built-in content shipped with the crate
pub const EMBEDDED_CONTENT: &str = include_str!("../../assets/patterns.json");

// =============================================================================
// Schema
// =============================================================================

/// One topic's text for one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub core: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weakness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suitable: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeStages {
    pub early: String,
    pub youth: String,
    pub middle: String,
    pub mature: String,
    pub elder: String,
}

/// All narrative text for one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContent {
    pub personality: Fragment,
    pub career: Fragment,
    pub health: Fragment,
    pub relationships: Fragment,
    pub wealth: Fragment,
    pub luck: Fragment,
    pub advice: Fragment,
    pub life_stages: LifeStages,
}

/// Content for all five elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTable {
    entries: BTreeMap<Element, ElementContent>,
}

impl ContentTable {
    /// Parse and check that every element has an entry
    pub fn parse(raw: &str) -> Result<Self> {
        let table: ContentTable = serde_json::from_str(raw)?;
        if let Some(missing) = Element::ALL
            .into_iter()
            .find(|e| !table.entries.contains_key(e))
        {
            return Err(SajuError::Json(serde::de::Error::custom(format!(
                "content table has no entry for {}",
                missing
            ))));
        }
        Ok(table)
    }

    /// The content shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_CONTENT)
    }

    pub fn get(&self, element: Element) -> Option<&ElementContent> {
        self.entries.get(&element)
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Where content JSON is fetched from
#[cfg_attr(test, automock)]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw JSON document
    fn fetch(&self) -> Result<String>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

/// Content from a JSON file on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for FileSource {
    fn fetch(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| SajuError::Io(e).with_context(format!("reading {}", self.path.display())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The built-in content
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

impl ContentSource for EmbeddedSource {
    fn fetch(&self) -> Result<String> {
        Ok(EMBEDDED_CONTENT.to_string())
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}

/// Content served over HTTP (e.g. the backend's static patterns.json)
#[cfg(feature = "remote")]
pub struct RemoteSource {
    url: String,
    timeout: std::time::Duration,
}

#[cfg(feature = "remote")]
impl RemoteSource {
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[cfg(feature = "remote")]
impl ContentSource for RemoteSource {
    fn fetch(&self) -> Result<String> {
        let response = ureq::get(&self.url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| SajuError::network(format!("GET {}: {}", self.url, e)))?;
        response
            .into_string()
            .map_err(|e| SajuError::network(format!("reading body of {}: {}", self.url, e)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// =============================================================================
// State
// =============================================================================

/// Load state of the content table
#[derive(Debug, Clone, Default)]
pub enum ContentState {
    #[default]
    Uninitialized,
    Loading,
    Ready(Arc<ContentTable>),
    Failed(String),
}

impl ContentState {
    pub fn label(&self) -> &'static str {
        match self {
            ContentState::Uninitialized => "uninitialized",
            ContentState::Loading => "loading",
            ContentState::Ready(_) => "ready",
            ContentState::Failed(_) => "failed",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ContentState::Ready(_))
    }

    pub fn table(&self) -> Option<&ContentTable> {
        match self {
            ContentState::Ready(table) => Some(table),
            _ => None,
        }
    }
}

/// Owns the content state and its transitions
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    state: ContentState,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding the embedded content
    pub fn embedded() -> Result<Self> {
        let mut store = Self::new();
        store.load_from(&EmbeddedSource)?;
        Ok(store)
    }

    pub fn state(&self) -> &ContentState {
        &self.state
    }

    pub fn begin_loading(&mut self) {
        self.state = ContentState::Loading;
    }

    /// Fetch and parse from a source. On failure the store is left `Failed`
    /// and the error is returned.
    pub fn load_from(&mut self, source: &dyn ContentSource) -> Result<()> {
        self.begin_loading();
        let origin = source.describe();
        let result = source.fetch().and_then(|raw| ContentTable::parse(&raw));
        self.finish(&origin, result)
    }

    /// Parse an already-fetched document
    pub fn load_json(&mut self, raw: &str) -> Result<()> {
        self.begin_loading();
        let result = ContentTable::parse(raw);
        self.finish("inline", result)
    }

    fn finish(&mut self, origin: &str, result: Result<ContentTable>) -> Result<()> {
        match result {
            Ok(table) => {
                tracing::info!(source = origin, "Loaded narrative content");
                self.state = ContentState::Ready(Arc::new(table));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = origin, error = %e, "Failed to load narrative content");
                self.state = ContentState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// The loaded table, or `MissingContent` in any other state
    pub fn require(&self) -> Result<&ContentTable> {
        self.state.table().ok_or_else(|| SajuError::MissingContent {
            state: self.state.label().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_content_covers_all_elements() {
        let table = ContentTable::embedded().unwrap();
        for element in Element::ALL {
            let content = table.get(element).unwrap();
            assert!(!content.personality.core.is_empty());
            assert!(!content.career.suitable.is_empty());
            assert!(!content.life_stages.elder.is_empty());
        }
    }

    #[test]
    fn test_parse_rejects_incomplete_table() {
        let table = ContentTable::embedded().unwrap();
        let mut value = serde_json::to_value(&table).unwrap();
        value.as_object_mut().unwrap().remove("水");
        let err = ContentTable::parse(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("水"));
    }

    #[test]
    fn test_store_transitions() {
        let mut store = ContentStore::new();
        assert_eq!(store.state().label(), "uninitialized");
        store.begin_loading();
        assert_eq!(store.state().label(), "loading");
        store.load_from(&EmbeddedSource).unwrap();
        assert!(store.state().is_ready());
    }

    #[test]
    fn test_require_reports_state() {
        let mut store = ContentStore::new();
        store.begin_loading();
        match store.require() {
            Err(SajuError::MissingContent { state }) => assert_eq!(state, "loading"),
            other => panic!("expected MissingContent, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_failed_fetch_leaves_store_failed() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch()
            .returning(|| Err(SajuError::network("connection refused")));
        source
            .expect_describe()
            .returning(|| "mock".to_string());

        let mut store = ContentStore::new();
        assert!(store.load_from(&source).is_err());
        match store.state() {
            ContentState::Failed(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Failed, got {}", other.label()),
        }
    }

    #[test]
    fn test_malformed_json_fails() {
        let mut source = MockContentSource::new();
        source.expect_fetch().returning(|| Ok("{ not json".to_string()));
        source.expect_describe().returning(|| "mock".to_string());

        let mut store = ContentStore::new();
        assert!(matches!(store.load_from(&source), Err(SajuError::Json(_))));
        assert_eq!(store.state().label(), "failed");
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EMBEDDED_CONTENT.as_bytes()).unwrap();
        let mut store = ContentStore::new();
        store.load_from(&FileSource::new(file.path())).unwrap();
        assert!(store.require().is_ok());
    }

    #[test]
    fn test_missing_file_source() {
        let mut store = ContentStore::new();
        let err = store
            .load_from(&FileSource::new("/nonexistent/patterns.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/patterns.json"));
        assert_eq!(store.state().label(), "failed");
    }
}
