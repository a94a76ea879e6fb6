use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::{EditError, EditResult};
use crate::raster::PixelBuffer;
use crate::transform::{Transform, replay};

/// What a finished recompute will be committed as.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum JobKind {
    Apply(Transform),
    Undo,
    Redo,
    Seek(usize),
}

/// A planned recompute: fold `steps` over `base`.
#[derive(Debug, Clone)]
pub(super) struct Recompute {
    pub(super) base: PixelBuffer,
    pub(super) steps: Vec<Transform>,
}

impl Recompute {
    pub(super) fn run(self) -> PixelBuffer {
        replay(&self.base, &self.steps)
    }
}

/// A recompute running on a worker thread.
pub(super) struct PendingJob {
    pub(super) kind: JobKind,
    rx: Receiver<PixelBuffer>,
}

impl PendingJob {
    pub(super) fn spawn(kind: JobKind, recompute: Recompute) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(recompute.run());
        });
        Self { kind, rx }
    }

    /// `Ok(None)` while the worker is still running.
    pub(super) fn try_take(&self) -> EditResult<Option<PixelBuffer>> {
        match self.rx.try_recv() {
            Ok(buffer) => Ok(Some(buffer)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EditError::WorkerDisconnected),
        }
    }

    pub(super) fn join(&self) -> EditResult<PixelBuffer> {
        self.rx.recv().map_err(|_| EditError::WorkerDisconnected)
    }
}

impl std::fmt::Debug for PendingJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingJob").field("kind", &self.kind).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelLayout;

    #[test]
    fn dropped_worker_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<PixelBuffer>();
        drop(tx);
        let job = PendingJob {
            kind: JobKind::Undo,
            rx,
        };
        assert!(matches!(job.try_take(), Err(EditError::WorkerDisconnected)));
        assert!(matches!(job.join(), Err(EditError::WorkerDisconnected)));
    }

    #[test]
    fn spawned_job_delivers_replayed_buffer() {
        let base = PixelBuffer::new(1, 2, PixelLayout::Rgb8, vec![1, 2, 3, 4, 5, 6]).expect("valid");
        let rotate = Transform::try_from(crate::transform::TransformSpec::rotate(90)).expect("valid");
        let expected = replay(&base, [&rotate]);
        let job = PendingJob::spawn(
            JobKind::Apply(rotate.clone()),
            Recompute {
                base,
                steps: vec![rotate],
            },
        );
        assert_eq!(job.join().expect("worker result"), expected);
    }
}
