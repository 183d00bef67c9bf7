use log::trace;
use tokio_util::sync::CancellationToken;

use crate::{AudioTrimError, Phase, ProgressEvent, ProgressReporter};

/// Suspension point shared by the trim and encode loops.
///
/// Every `yield_every` chunks the loop hands control back to the executor,
/// checks for cancellation once it is resumed and reports how far it got.
pub(crate) struct Checkpoint<'a, R: ProgressReporter + ?Sized> {
    phase: Phase,
    total: usize,
    yield_every: usize,
    cancel: &'a CancellationToken,
    progress: &'a mut R,
}

impl<'a, R: ProgressReporter + ?Sized> Checkpoint<'a, R> {
    pub(crate) fn new(
        phase: Phase,
        total: usize,
        yield_every: usize,
        cancel: &'a CancellationToken,
        progress: &'a mut R,
    ) -> Self {
        Self {
            phase,
            total,
            yield_every: yield_every.max(1),
            cancel,
            progress,
        }
    }

    /// Called after chunk `chunk_index` (zero-based) has been processed, with
    /// `done` units of `total` complete.
    ///
    /// The first chunk is always followed by a suspension point.
    pub(crate) async fn after_chunk(
        &mut self,
        chunk_index: usize,
        done: usize,
    ) -> Result<(), AudioTrimError> {
        if chunk_index % self.yield_every != 0 {
            return Ok(());
        }

        tokio::task::yield_now().await;

        if self.cancel.is_cancelled() {
            trace!("{} cancelled after chunk {chunk_index}", self.phase);
            return Err(AudioTrimError::Cancelled);
        }

        let percent = percent(done, self.total);
        trace!("{} resumed after chunk {chunk_index} at {percent}%", self.phase);
        self.emit(percent);
        Ok(())
    }

    /// Report completion of the phase.
    pub(crate) fn finish(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        self.progress.report(ProgressEvent {
            phase: self.phase,
            percent,
        });
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u128;
    let total = total as u128;
    ((done * 100 + total / 2) / total) as u8
}
