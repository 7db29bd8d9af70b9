//! Per-call protocol stages
//!
//! Every create/restore/verify call walks
//! `Start -> Validating -> Deriving -> (Codec, Ciphering) -> Done`, and a
//! failure in any stage ends the call. Nothing here outlives a call.

use std::fmt;

use tracing::{debug, trace};

use crate::error::VaultResult;

/// A step of the backup protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Validating,
    Deriving,
    Ciphering,
    Codec,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Validating => "validating",
            Stage::Deriving => "deriving",
            Stage::Ciphering => "ciphering",
            Stage::Codec => "codec",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Tracks the current stage of one operation and traces transitions
#[derive(Debug)]
pub(crate) struct Progress {
    operation: &'static str,
    stage: Stage,
}

impl Progress {
    pub(crate) fn start(operation: &'static str) -> Self {
        trace!(operation, stage = %Stage::Start, "backup stage");
        Self {
            operation,
            stage: Stage::Start,
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        trace!(operation = self.operation, stage = %stage, "backup stage");
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    /// Close the operation, logging where it failed if it did
    pub(crate) fn finish<T>(mut self, result: VaultResult<T>) -> VaultResult<T> {
        match &result {
            Ok(_) => self.enter(Stage::Done),
            Err(e) => debug!(
                operation = self.operation,
                stage = %self.stage(),
                error = %e,
                "backup operation failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;

    #[test]
    fn test_progress_tracks_stage() {
        let mut progress = Progress::start("test");
        assert_eq!(progress.stage(), Stage::Start);

        progress.enter(Stage::Deriving);
        assert_eq!(progress.stage(), Stage::Deriving);
    }

    #[test]
    fn test_finish_passes_result_through() {
        let progress = Progress::start("test");
        assert_eq!(progress.finish(Ok(5)).unwrap(), 5);

        let progress = Progress::start("test");
        let result: VaultResult<()> = progress.finish(Err(VaultError::MalformedPayload));
        assert!(matches!(result, Err(VaultError::MalformedPayload)));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Ciphering.to_string(), "ciphering");
        assert_eq!(Stage::Done.to_string(), "done");
    }
}
