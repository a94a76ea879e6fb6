use super::EditOutcome;
use super::checkpoints::CheckpointCache;
use super::document::Document;
use super::job::{JobKind, Recompute};
use crate::config::{HistoryConfig, RecomputePolicy};
use crate::error::{EditError, EditResult};
use crate::history::HistoryStack;
use crate::raster::{ImageMeta, PixelBuffer};
use crate::transform::{RasterOp, Transform};

/// One loaded image together with its edit history.
#[derive(Debug, Clone)]
pub struct Session {
    document: Document,
    history: HistoryStack<Transform>,
    checkpoints: Option<CheckpointCache>,
}

impl Session {
    pub(super) fn new(source: PixelBuffer, meta: Option<ImageMeta>, config: &HistoryConfig) -> Self {
        let checkpoints = match config.recompute {
            RecomputePolicy::Replay => None,
            RecomputePolicy::Checkpoints => {
                Some(CheckpointCache::new(config.checkpoint_budget_bytes))
            }
        };
        Self {
            document: Document::new(source, meta),
            history: HistoryStack::new(config.depth_limit()),
            checkpoints,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn history(&self) -> &HistoryStack<Transform> {
        &self.history
    }

    /// Transforms that produced the current buffer from the source, oldest first.
    pub fn applied_transforms(&self) -> impl ExactSizeIterator<Item = &Transform> {
        self.history.past()
    }

    pub const fn recompute_policy(&self) -> RecomputePolicy {
        if self.checkpoints.is_some() {
            RecomputePolicy::Checkpoints
        } else {
            RecomputePolicy::Replay
        }
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.as_ref().map_or(0, CheckpointCache::len)
    }

    /// Bytes held by cached checkpoints.
    pub fn checkpoint_bytes(&self) -> u64 {
        self.checkpoints
            .as_ref()
            .map_or(0, CheckpointCache::used_bytes)
    }

    /// Work needed to reach the state `kind` describes. Nothing is mutated.
    pub(super) fn plan(&self, kind: &JobKind) -> EditResult<Recompute> {
        let position = self.history.position();
        let target = match kind {
            JobKind::Apply(transform) => {
                return Ok(Recompute {
                    base: self.document.buffer().clone(),
                    steps: vec![transform.clone()],
                });
            }
            JobKind::Undo => position.checked_sub(1).ok_or(EditError::EmptyHistory)?,
            JobKind::Redo => {
                if !self.history.can_redo() {
                    return Err(EditError::EmptyHistory);
                }
                position + 1
            }
            JobKind::Seek(target) => {
                if *target > self.history.len() {
                    return Err(EditError::HistoryOutOfRange {
                        target: *target,
                        len: self.history.len(),
                    });
                }
                *target
            }
        };
        Ok(self.plan_position(target))
    }

    fn plan_position(&self, target: usize) -> Recompute {
        let (start, base) = self.nearest_base(target);
        let steps = self
            .history
            .timeline()
            .skip(start)
            .take(target - start)
            .cloned()
            .collect();
        Recompute {
            base: base.clone(),
            steps,
        }
    }

    fn nearest_base(&self, target: usize) -> (usize, &PixelBuffer) {
        let mut best = (0, self.document.source());
        let Some(cache) = &self.checkpoints else {
            return best;
        };
        if let Some((key, buffer)) = cache.nearest_at_or_below(target) {
            best = (key, buffer);
        }
        let current = self.history.position();
        if current <= target && current >= best.0 {
            best = (current, self.document.buffer());
        }
        best
    }

    /// Swap in a finished recompute and move the history to match.
    pub(super) fn commit(&mut self, kind: JobKind, output: PixelBuffer) -> EditResult<EditOutcome> {
        let before = self.history.position();
        let (outcome, outgoing_position) = match kind {
            JobKind::Apply(transform) => {
                let label = transform.describe();
                if let Some(cache) = &mut self.checkpoints {
                    cache.truncate_from(before + 1);
                }
                if let Some(evicted) = self.history.record(transform) {
                    self.fold_into_source(&evicted);
                }
                (EditOutcome::Applied(label), self.history.position() - 1)
            }
            JobKind::Undo => (EditOutcome::Undone(self.history.undo()?.describe()), before),
            JobKind::Redo => (EditOutcome::Redone(self.history.redo()?.describe()), before),
            JobKind::Seek(target) => {
                self.history.seek(target)?;
                (EditOutcome::Reverted(target), before)
            }
        };
        let outgoing = self.document.swap_buffer(output);
        if let Some(cache) = &mut self.checkpoints {
            cache.store(outgoing_position, &outgoing, self.history.position());
        }
        Ok(outcome)
    }

    fn fold_into_source(&mut self, evicted: &Transform) {
        let promoted = self
            .checkpoints
            .as_mut()
            .and_then(CheckpointCache::shift_down);
        let source = promoted.unwrap_or_else(|| evicted.apply(self.document.source()));
        self.document.rebase(source);
        log::debug!(
            "History limit reached; folded '{}' into the source image",
            evicted.describe()
        );
    }
}
