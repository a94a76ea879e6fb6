//! The transform history engine: one session at a time, strictly serialized
//! edits, optional background recompute.

mod checkpoints;
mod document;
mod job;
mod session;


pub use document::Document;
pub use session::Session;

use std::path::Path;

use job::{JobKind, PendingJob, Recompute};

use crate::config::{AppConfig, HistoryConfig};
use crate::error::{EditError, EditResult};
use crate::export::{self, ExportFormat, ExportOptions};
use crate::raster::{ImageMeta, PixelBuffer, PixelLayout};
use crate::transform::{RasterOp, Transform, TransformSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Busy,
}

/// An edit the UI can hand to [`Engine::execute`] or [`Engine::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditRequest {
    Apply(TransformSpec),
    Undo,
    Redo,
    RevertTo(usize),
}

/// What a committed edit did, for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(String),
    Undone(String),
    Redone(String),
    Reverted(usize),
}

impl EditOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Applied(label) => label.clone(),
            Self::Undone(label) => format!("Undo: {label}"),
            Self::Redone(label) => format!("Redo: {label}"),
            Self::Reverted(0) => "Reverted to the original image".to_string(),
            Self::Reverted(position) => format!("Reverted to step {position}"),
        }
    }
}

/// One row of the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Position reached by reverting to this entry.
    pub position: usize,
    pub label: String,
    pub applied: bool,
}

#[derive(Debug)]
pub struct Engine {
    history_config: HistoryConfig,
    export_options: ExportOptions,
    default_format: ExportFormat,
    background_min_pixels: u64,
    session: Option<Session>,
    pending: Option<PendingJob>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Engine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            history_config: config.effective_history(),
            export_options: config.export_options(),
            default_format: config.export.default_format,
            background_min_pixels: config.worker.background_min_pixels,
            session: None,
            pending: None,
        }
    }

    pub const fn state(&self) -> SessionState {
        if self.pending.is_some() {
            SessionState::Busy
        } else if self.session.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Empty
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub const fn default_export_format(&self) -> ExportFormat {
        self.default_format
    }

    /// Start a fresh session, replacing any previous one.
    pub fn load_image(&mut self, buffer: PixelBuffer, meta: Option<ImageMeta>) -> EditResult<()> {
        if self.is_busy() {
            return Err(EditError::EngineBusy);
        }
        log::info!(
            "Loaded {}x{} {} image{}",
            buffer.width(),
            buffer.height(),
            buffer.layout().label(),
            meta.as_ref()
                .map(|m| format!(" ({})", m.display_name()))
                .unwrap_or_default()
        );
        self.session = Some(Session::new(buffer, meta, &self.history_config));
        Ok(())
    }

    /// Like [`Self::load_image`] for raw pixels; malformed input is a decode error.
    pub fn load_raw(
        &mut self,
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
        meta: Option<ImageMeta>,
    ) -> EditResult<()> {
        if self.is_busy() {
            return Err(EditError::EngineBusy);
        }
        let buffer = PixelBuffer::new(width, height, layout, data)
            .map_err(|err| EditError::Decode(err.to_string()))?;
        self.load_image(buffer, meta)
    }

    pub fn apply(&mut self, spec: TransformSpec) -> EditResult<EditOutcome> {
        self.execute(EditRequest::Apply(spec))
    }

    pub fn undo(&mut self) -> EditResult<EditOutcome> {
        self.execute(EditRequest::Undo)
    }

    pub fn redo(&mut self) -> EditResult<EditOutcome> {
        self.execute(EditRequest::Redo)
    }

    /// Undo or redo until exactly `position` transforms are applied.
    pub fn revert_to(&mut self, position: usize) -> EditResult<EditOutcome> {
        self.execute(EditRequest::RevertTo(position))
    }

    /// Run an edit on the calling thread.
    pub fn execute(&mut self, request: EditRequest) -> EditResult<EditOutcome> {
        let (kind, recompute) = self.prepare(request)?;
        let output = recompute.run();
        self.commit(kind, output)
    }

    /// Run an edit on a worker thread. The engine stays busy until
    /// [`Self::poll`] or [`Self::wait`] hands back the result.
    pub fn submit(&mut self, request: EditRequest) -> EditResult<()> {
        let (kind, recompute) = self.prepare(request)?;
        log::debug!(
            "Recomputing {} step(s) in the background for {kind:?}",
            recompute.steps.len()
        );
        self.pending = Some(PendingJob::spawn(kind, recompute));
        Ok(())
    }

    /// Commit the background edit if it finished; `None` while it runs or
    /// when nothing was submitted.
    pub fn poll(&mut self) -> Option<EditResult<EditOutcome>> {
        let pending = self.pending.take()?;
        match pending.try_take() {
            Ok(Some(output)) => Some(self.commit(pending.kind, output)),
            Ok(None) => {
                self.pending = Some(pending);
                None
            }
            Err(err) => {
                log::error!("Background edit {:?} failed: {err}", pending.kind);
                Some(Err(err))
            }
        }
    }

    /// Block until the background edit finishes and commit it.
    pub fn wait(&mut self) -> Option<EditResult<EditOutcome>> {
        let pending = self.pending.take()?;
        match pending.join() {
            Ok(output) => Some(self.commit(pending.kind, output)),
            Err(err) => {
                log::error!("Background edit {:?} failed: {err}", pending.kind);
                Some(Err(err))
            }
        }
    }

    /// Whether the current image is large enough to edit off the UI thread.
    pub fn prefers_background(&self) -> bool {
        self.session.as_ref().is_some_and(|session| {
            session.document().buffer().pixel_count() as u64 >= self.background_min_pixels
        })
    }

    pub fn can_undo(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.history().can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.history().can_redo())
    }

    /// Number of applied transforms.
    pub fn position(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.history().position())
    }

    pub fn applied_transforms(&self) -> Vec<Transform> {
        self.session
            .as_ref()
            .map(|session| session.applied_transforms().cloned().collect())
            .unwrap_or_default()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let applied = session.history().position();
        session
            .history()
            .timeline()
            .enumerate()
            .map(|(idx, transform)| HistoryEntry {
                position: idx + 1,
                label: transform.describe(),
                applied: idx < applied,
            })
            .collect()
    }

    /// Snapshot of the current pixels; shares storage with the document.
    pub fn current_buffer(&self) -> EditResult<PixelBuffer> {
        self.session
            .as_ref()
            .map(|session| session.document().buffer().clone())
            .ok_or(EditError::NoActiveSession)
    }

    pub fn export(&self, format: ExportFormat) -> EditResult<Vec<u8>> {
        let buffer = self.current_buffer()?;
        export::encode(&buffer, format, &self.export_options)
    }

    pub fn export_to_path(&self, path: &Path, format: ExportFormat) -> anyhow::Result<()> {
        let buffer = self.current_buffer()?;
        export::export_to_path(path, &buffer, format, &self.export_options)?;
        log::info!("Exported {} to {}", format.label(), path.display());
        Ok(())
    }

    /// Drop the session and abandon any background edit.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Abandoned a background edit on reset");
        }
        self.session = None;
    }

    fn prepare(&self, request: EditRequest) -> EditResult<(JobKind, Recompute)> {
        if self.is_busy() {
            return Err(EditError::EngineBusy);
        }
        let session = self.session.as_ref().ok_or(EditError::NoActiveSession)?;
        let kind = match request {
            EditRequest::Apply(spec) => JobKind::Apply(Transform::try_from(spec)?),
            EditRequest::Undo => JobKind::Undo,
            EditRequest::Redo => JobKind::Redo,
            EditRequest::RevertTo(position) => JobKind::Seek(position),
        };
        let recompute = session.plan(&kind)?;
        Ok((kind, recompute))
    }

    fn commit(&mut self, kind: JobKind, output: PixelBuffer) -> EditResult<EditOutcome> {
        let session = self.session.as_mut().ok_or(EditError::NoActiveSession)?;
        let outcome = session.commit(kind, output)?;
        log::debug!(
            "{} (position {}/{})",
            outcome.message(),
            session.history().position(),
            session.history().len()
        );
        Ok(outcome)
    }
}
