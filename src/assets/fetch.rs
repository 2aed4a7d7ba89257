use std::path::PathBuf;
use std::time::Duration;

use crate::assets::resolve::ResolveError;
use crate::config::FetchConfig;

/// Where a photo's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceLocator {
    Http(String),
    File(PathBuf),
}

impl SourceLocator {
    pub fn parse(locator: &str) -> Result<Self, ResolveError> {
        let s = locator.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Http(s.to_string()));
        }
        if let Some(path) = s.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(ResolveError::UnsupportedScheme(scheme.to_string()));
        }
        if s.is_empty() {
            return Err(ResolveError::UnsupportedScheme(String::new()));
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}

/// Single-attempt byte fetcher for photo sources.
///
/// HTTP requests share one `ureq` agent with a global per-request timeout; redirects are followed
/// by the agent and non-2xx statuses are failures. Bodies larger than `max_bytes` are rejected.
#[derive(Clone, Debug)]
pub struct SourceFetcher {
    agent: ureq::Agent,
    user_agent: String,
    max_bytes: u64,
}

impl SourceFetcher {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self::with_settings(cfg.timeout(), cfg.user_agent.clone(), cfg.max_bytes)
    }

    pub fn with_settings(timeout: Duration, user_agent: String, max_bytes: u64) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
            user_agent,
            max_bytes,
        }
    }

    pub fn fetch(&self, locator: &SourceLocator) -> Result<Vec<u8>, ResolveError> {
        match locator {
            SourceLocator::Http(url) => self.fetch_http(url),
            SourceLocator::File(path) => self.fetch_file(path),
        }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "image/*")
            .call()
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ResolveError::Fetch("empty response body".to_string()));
        }
        Ok(bytes)
    }

    fn fetch_file(&self, path: &std::path::Path) -> Result<Vec<u8>, ResolveError> {
        let meta = std::fs::metadata(path)
            .map_err(|e| ResolveError::Fetch(format!("'{}': {e}", path.display())))?;
        if meta.len() > self.max_bytes {
            return Err(ResolveError::TooLarge {
                bytes: meta.len(),
                limit: self.max_bytes,
            });
        }
        std::fs::read(path).map_err(|e| ResolveError::Fetch(format!("'{}': {e}", path.display())))
    }
}
