//! Mapping from a finished run to the process exit status.

use datfetch_core::RunSummary;

use crate::ProcessExit;

/// `0` with no failures, `2` when something also completed, `1` otherwise.
pub(crate) fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

/// An interrupted run always fails, whatever was completed before it.
pub(crate) fn exit_for_summary(summary: &RunSummary) -> ProcessExit {
    if summary.interrupted {
        return ProcessExit::Failure;
    }
    determine_exit_outcome(summary.completed(), summary.failed.len())
}
