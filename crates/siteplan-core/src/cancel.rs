use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a caller and a running plan.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    raised: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Anything the planner can poll between candidates to learn whether the
/// caller gave up. Closures returning `bool` qualify, which lets async
/// callers poll their own token types.
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        CancellationFlag::is_cancelled(self)
    }
}

impl<F> CancelSignal for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// The caller abandoned the plan; no result is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("planning aborted by caller after {evaluated} candidate(s)")]
pub struct PlanningAborted {
    pub evaluated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancellationFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());
        flag.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn closures_act_as_signals() {
        fn poll(signal: &dyn CancelSignal) -> bool {
            signal.is_cancelled()
        }
        let flag = CancellationFlag::new();
        assert!(!poll(&flag));
        assert!(poll(&|| true));
        flag.cancel();
        assert!(poll(&|| flag.is_cancelled()));
    }
}
