//! Process-wide single-flight gating for automation runs.
//!
//! Each automation type owns one [`Gate`]. A run enters before allocating any
//! browser resources; a second concurrent attempt is rejected immediately
//! rather than queued. The pass releases on drop, so success, failure, and
//! unwind all reset the flag through the same path.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// One boolean flag guarding a logical automation type.
#[derive(Debug, Clone)]
pub struct Gate {
    label: &'static str,
    busy: Arc<Mutex<bool>>,
}

impl Gate {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            busy: Arc::new(Mutex::new(false)),
        }
    }

    /// Atomically checks-and-sets the flag.
    ///
    /// Returns `None` when a run is already active; the caller must fail its
    /// operation without touching the browser engine.
    pub fn try_enter(&self) -> Option<GatePass> {
        let mut busy = self.busy.lock();
        if *busy {
            debug!(target = "crosspost.guard", label = self.label, "gate busy; rejecting");
            return None;
        }
        *busy = true;
        Some(GatePass {
            label: self.label,
            busy: Arc::clone(&self.busy),
        })
    }

    /// Pure read for external liveness polling.
    pub fn is_running(&self) -> bool {
        *self.busy.lock()
    }
}

/// Held for the duration of a run; releases the gate on drop.
#[derive(Debug)]
pub struct GatePass {
    label: &'static str,
    busy: Arc<Mutex<bool>>,
}

impl Drop for GatePass {
    fn drop(&mut self) {
        *self.busy.lock() = false;
        debug!(target = "crosspost.guard", label = self.label, "gate released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enter_is_rejected_until_release() {
        let gate = Gate::new("post");
        assert!(!gate.is_running());

        let pass = gate.try_enter().expect("gate should be free");
        assert!(gate.is_running());
        assert!(gate.try_enter().is_none());

        drop(pass);
        assert!(!gate.is_running());
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn release_runs_on_unwind() {
        let gate = Gate::new("post");
        let cloned = gate.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _pass = cloned.try_enter().expect("gate should be free");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!gate.is_running());
    }

    #[test]
    fn independent_gates_do_not_interfere() {
        let post = Gate::new("post");
        let login = Gate::new("login");
        let _pass = post.try_enter().unwrap();
        assert!(login.try_enter().is_some());
    }
}
