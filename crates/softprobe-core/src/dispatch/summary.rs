use crate::resolver::ResolutionOutcome;

/// Per-run counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub resolved: usize,
    pub skipped: usize,
    pub unresolved: usize,
    pub invalid: usize,
    pub write_failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ResolutionOutcome) {
        match outcome {
            ResolutionOutcome::Resolved { .. } => self.resolved += 1,
            ResolutionOutcome::Skipped { .. } => self.skipped += 1,
            ResolutionOutcome::Unresolved => self.unresolved += 1,
            ResolutionOutcome::Invalid { .. } => self.invalid += 1,
            ResolutionOutcome::WriteFailed { .. } => self.write_failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.resolved + self.skipped + self.unresolved + self.invalid + self.write_failed
    }

    /// Links that ended up in the miss log.
    pub fn misses(&self) -> usize {
        self.unresolved + self.invalid + self.write_failed
    }
}
