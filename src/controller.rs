//! Owner of the current display configuration and the loaded presentation.
//!
//! The analysis functions are pure; this is the one place that holds
//! state between them. Loads move through `Empty -> Loading -> Ready | Failed`
//! and the previous session is dropped as soon as a new load starts, so a
//! failed reload can never leave the old results on screen.

use std::sync::Arc;

use crate::analysis::{
    AnalysisSession, CategoryRow, DisplayConfig, FileRecord, aggregate, category_rows, parse_limit,
    select_visible,
};
use crate::error::{LoadError, PreviewError};
use crate::io::{self, ReadAt};
use crate::zip::ArchiveReader;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Ready,
    Failed,
}

/// Identifies one load attempt; only the newest attempt may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

/// The visibility toggles of [`DisplayConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Images,
    Slides,
    Other,
}

/// A successfully read archive together with its analysis
pub struct LoadedArchive {
    pub archive: ArchiveReader<dyn ReadAt>,
    pub session: AnalysisSession,
}

/// Read the archive behind `reader` and aggregate its listing.
pub async fn read_archive(
    reader: Arc<dyn ReadAt>,
    label: &str,
) -> Result<LoadedArchive, LoadError> {
    let archive = ArchiveReader::open(reader)
        .await
        .map_err(|source| LoadError::Parse {
            label: label.to_string(),
            source,
        })?;
    let session = aggregate(label, archive.entries());
    tracing::debug!(
        label,
        files = session.files.len(),
        total = session.total_uncompressed_size,
        "aggregated archive"
    );
    Ok(LoadedArchive { archive, session })
}

/// Open `input` (path or URL) and read it as an archive.
pub async fn open_archive(input: &str) -> Result<LoadedArchive, LoadError> {
    let label = io::source_label(input);
    let reader = io::open_source(input)
        .await
        .map_err(|err| LoadError::Open {
            label: label.clone(),
            source: err.into(),
        })?;
    read_archive(reader, &label).await
}

pub struct Controller {
    config: DisplayConfig,
    state: LoadState,
    generation: u64,
    loaded: Option<LoadedArchive>,
    error: Option<&'static str>,
}

impl Controller {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            state: LoadState::Empty,
            generation: 0,
            loaded: None,
            error: None,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    pub fn archive(&self) -> Option<&ArchiveReader<dyn ReadAt>> {
        self.loaded.as_ref().map(|l| &l.archive)
    }

    /// The message to show for the last failed load, if it failed.
    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    /// Start a load: previous results and errors are cleared right away.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loaded = None;
        self.error = None;
        self.state = LoadState::Loading;
        tracing::info!(generation = self.generation, "load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Finish the load identified by `ticket`.
    ///
    /// Returns false, changing nothing, when a newer load has started since.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedArchive, LoadError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "dropping superseded load"
            );
            return false;
        }

        match result {
            Ok(loaded) => {
                tracing::info!(
                    label = %loaded.session.filename_label,
                    files = loaded.session.files.len(),
                    "load ready"
                );
                self.loaded = Some(loaded);
                self.state = LoadState::Ready;
            }
            Err(err) => {
                tracing::error!(error = ?err, "load failed");
                self.loaded = None;
                self.error = Some(LoadError::USER_MESSAGE);
                self.state = LoadState::Failed;
            }
        }
        true
    }

    /// Load `input` as the current presentation and return the final state.
    pub async fn load(&mut self, input: &str) -> LoadState {
        let ticket = self.begin_load();
        let result = open_archive(input).await;
        self.complete_load(ticket, result);
        self.state
    }

    /// Load from an already opened source.
    pub async fn load_reader(&mut self, reader: Arc<dyn ReadAt>, label: &str) -> LoadState {
        let ticket = self.begin_load();
        let result = read_archive(reader, label).await;
        self.complete_load(ticket, result);
        self.state
    }

    /// Apply a typed file-count limit. Non-numeric input is ignored.
    pub fn set_limit_input(&mut self, input: &str) -> bool {
        match parse_limit(input) {
            Some(value) => {
                self.config.set_limit(value);
                tracing::debug!(limit = self.config.max_files_shown, "limit changed");
                true
            }
            None => {
                tracing::warn!(input, "ignoring non-numeric file limit");
                false
            }
        }
    }

    pub fn set_toggle(&mut self, toggle: Toggle, on: bool) {
        match toggle {
            Toggle::Images => self.config.show_images = on,
            Toggle::Slides => self.config.show_slides = on,
            Toggle::Other => self.config.show_other_categories = on,
        }
    }

    /// Files to display under the current configuration.
    pub fn visible(&self) -> Vec<&FileRecord> {
        self.session()
            .map(|s| select_visible(&s.files, &self.config))
            .unwrap_or_default()
    }

    pub fn category_rows(&self) -> Vec<CategoryRow> {
        self.session().map(category_rows).unwrap_or_default()
    }

    pub async fn fetch_content(&self, path: &str) -> Result<Vec<u8>, PreviewError> {
        let loaded = self.loaded.as_ref().ok_or(PreviewError::NoSession)?;
        Ok(loaded.archive.fetch(path).await?)
    }

    /// Content for a preview; failures are logged and yield `None`.
    pub async fn preview(&self, path: &str) -> Option<Vec<u8>> {
        match self.fetch_content(path).await {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::warn!(path, error = %err, "preview unavailable");
                None
            }
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(DisplayConfig::default())
    }
}
