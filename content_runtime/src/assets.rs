//! Asset loader - idempotent, cached loading of script and style resources.
//!
//! Requests go out through an [`AssetFetcher`] and return immediately. The
//! host reports each finished fetch with [`AssetLoader::complete`], which
//! runs the callbacks of every batch that is now fully loaded. A URL is
//! fetched at most once per session, whatever its outcome.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::AssetLoadError;
use crate::integration::AssetRoots;
use crate::library::LibraryReference;

/// Kind of resource being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Script,
    Style,
}

/// Fires network (or equivalent) requests on behalf of the loader.
pub trait AssetFetcher {
    /// Start fetching `url`. Must not block; completion is reported later
    /// through [`AssetLoader::complete`].
    fn request(&mut self, url: &str, kind: AssetKind);
}

/// Fetcher that only records requests. The log is shared so it can be
/// inspected after the fetcher has been boxed into a loader.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    log: Rc<RefCell<Vec<(String, AssetKind)>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<(String, AssetKind)> {
        self.log.borrow().clone()
    }

    /// Number of requests made for `url`.
    pub fn count(&self, url: &str) -> usize {
        self.log.borrow().iter().filter(|(u, _)| u == url).count()
    }
}

impl AssetFetcher for MemoryFetcher {
    fn request(&mut self, url: &str, kind: AssetKind) {
        self.log.borrow_mut().push((url.to_string(), kind));
    }
}

/// Load state of a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    Loading,
    Loaded,
    Failed(String),
}

/// Outcome of one [`AssetLoader::load_scripts`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Resolved URLs, in request order.
    pub urls: Vec<String>,
    /// One entry per path that failed to resolve or load.
    pub failures: Vec<AssetLoadError>,
}

impl LoadReport {
    /// Check if every path loaded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of one [`AssetLoader::complete`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Script batches finished by this completion.
    pub batches: usize,
    /// Failed style fetches. Script failures travel in the batch reports.
    pub failures: Vec<AssetLoadError>,
}

/// Callback run once a batch has completed.
pub type LoadCallback = Box<dyn FnOnce(LoadReport)>;

struct Batch {
    remaining: usize,
    report: LoadReport,
    callback: LoadCallback,
}

/// Default prefixes marking a path as absolute and external.
pub const DEFAULT_EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "//"];

/// Session-wide asset cache.
pub struct AssetLoader {
    fetcher: Box<dyn AssetFetcher>,
    roots: Box<dyn AssetRoots>,
    external_prefixes: Vec<String>,
    scripts: HashMap<String, AssetState>,
    styles: HashMap<String, AssetState>,
    /// Script URL -> batches waiting on it (one entry per occurrence).
    waiting: HashMap<String, Vec<u64>>,
    batches: HashMap<u64, Batch>,
    next_batch: u64,
}

impl AssetLoader {
    /// Create an empty loader.
    pub fn new(fetcher: Box<dyn AssetFetcher>, roots: Box<dyn AssetRoots>) -> Self {
        Self {
            fetcher,
            roots,
            external_prefixes: DEFAULT_EXTERNAL_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            scripts: HashMap::new(),
            styles: HashMap::new(),
            waiting: HashMap::new(),
            batches: HashMap::new(),
            next_batch: 0,
        }
    }

    /// Replace the prefixes that mark a path as external.
    pub fn with_external_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.external_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve a path against the library root, or the global root without a library.
    pub fn resolve(
        &self,
        path: &str,
        library: Option<&LibraryReference>,
    ) -> Result<String, AssetLoadError> {
        if self.external_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return Ok(path.to_string());
        }

        match library {
            Some(library) => self
                .roots
                .library_root(library)
                .map(|root| format!("{}/{}", root.trim_end_matches('/'), path))
                .ok_or_else(|| AssetLoadError::UnresolvedRoot {
                    library: library.to_string(),
                    path: path.to_string(),
                }),
            None => Ok(format!(
                "{}/{}",
                self.roots.global_root().trim_end_matches('/'),
                path
            )),
        }
    }

    /// Load scripts, then run `on_all_loaded` exactly once.
    ///
    /// The callback runs after every listed path has completed, successfully
    /// or not; failures are listed in the [`LoadReport`]. With nothing left
    /// to wait for (empty list, everything cached) it runs before returning.
    pub fn load_scripts<F>(
        &mut self,
        paths: &[String],
        on_all_loaded: F,
        library: Option<&LibraryReference>,
    ) where
        F: FnOnce(LoadReport) + 'static,
    {
        let batch_id = self.next_batch;
        self.next_batch += 1;

        let mut remaining = paths.len();
        let mut report = LoadReport::default();

        for path in paths {
            let url = match self.resolve(path, library) {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(error = %err, "script path could not be resolved");
                    report.failures.push(err);
                    remaining -= 1;
                    continue;
                }
            };
            report.urls.push(url.clone());

            match self.scripts.get(&url) {
                Some(AssetState::Loaded) => remaining -= 1,
                Some(AssetState::Failed(reason)) => {
                    report.failures.push(AssetLoadError::Failed {
                        url: url.clone(),
                        reason: reason.clone(),
                    });
                    remaining -= 1;
                }
                Some(AssetState::Loading) => {
                    self.waiting.entry(url).or_default().push(batch_id);
                }
                None => {
                    tracing::debug!(url = %url, "requesting script");
                    self.scripts.insert(url.clone(), AssetState::Loading);
                    self.waiting.entry(url.clone()).or_default().push(batch_id);
                    self.fetcher.request(&url, AssetKind::Script);
                }
            }
        }

        if remaining == 0 {
            on_all_loaded(report);
        } else {
            self.batches.insert(
                batch_id,
                Batch {
                    remaining,
                    report,
                    callback: Box::new(on_all_loaded),
                },
            );
        }
    }

    /// Load styles. Fire and forget; returns the paths that could not be
    /// resolved or are known to have failed. Failures of fetches still in
    /// flight come back from [`Self::complete`].
    pub fn load_styles(
        &mut self,
        paths: &[String],
        library: Option<&LibraryReference>,
    ) -> Vec<AssetLoadError> {
        let mut failures = Vec::new();
        for path in paths {
            match self.resolve(path, library) {
                Ok(url) => match self.styles.get(&url) {
                    Some(AssetState::Failed(reason)) => failures.push(AssetLoadError::Failed {
                        url: url.clone(),
                        reason: reason.clone(),
                    }),
                    Some(_) => {}
                    None => {
                        tracing::debug!(url = %url, "requesting style");
                        self.styles.insert(url.clone(), AssetState::Loading);
                        self.fetcher.request(&url, AssetKind::Style);
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "style path could not be resolved");
                    failures.push(err);
                }
            }
        }
        failures
    }

    /// Report that a fetch finished.
    ///
    /// Completion callbacks run after the cache has been updated. A failed
    /// style is returned in [`Completion::failures`].
    pub fn complete(&mut self, url: &str, result: Result<(), String>) -> Completion {
        let mut completion = Completion::default();
        let state = match &result {
            Ok(()) => AssetState::Loaded,
            Err(reason) => {
                tracing::warn!(url, reason = %reason, "asset failed to load");
                AssetState::Failed(reason.clone())
            }
        };

        if let Some(entry) = self.styles.get_mut(url) {
            *entry = state.clone();
            if let Err(reason) = &result {
                completion.failures.push(AssetLoadError::Failed {
                    url: url.to_string(),
                    reason: reason.clone(),
                });
            }
        }
        match self.scripts.get_mut(url) {
            Some(entry) => *entry = state,
            None => {
                if !self.styles.contains_key(url) {
                    tracing::warn!(url, "completion reported for an unrequested asset");
                }
                return completion;
            }
        }

        let mut finished = Vec::new();
        for batch_id in self.waiting.remove(url).unwrap_or_default() {
            let Some(batch) = self.batches.get_mut(&batch_id) else {
                continue;
            };
            if let Err(reason) = &result {
                batch.report.failures.push(AssetLoadError::Failed {
                    url: url.to_string(),
                    reason: reason.clone(),
                });
            }
            batch.remaining -= 1;
            if batch.remaining == 0 {
                if let Some(batch) = self.batches.remove(&batch_id) {
                    finished.push(batch);
                }
            }
        }

        completion.batches = finished.len();
        for batch in finished {
            (batch.callback)(batch.report);
        }
        completion
    }

    /// Current state of a script or style URL.
    pub fn state(&self, url: &str) -> Option<&AssetState> {
        self.scripts.get(url).or_else(|| self.styles.get(url))
    }

    /// Number of batches still waiting for completions.
    pub fn pending_batches(&self) -> usize {
        self.batches.len()
    }

    /// Forget everything. Pending callbacks are dropped without running.
    pub fn clear(&mut self) {
        self.scripts.clear();
        self.styles.clear();
        self.waiting.clear();
        self.batches.clear();
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("scripts", &self.scripts)
            .field("styles", &self.styles)
            .field("pending_batches", &self.batches.len())
            .finish_non_exhaustive()
    }
}
