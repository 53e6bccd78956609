//! Configurable fault injection for simulated mutations.
//!
//! The demo APIs this replaces rolled the dice inline
//! (`Math.random() < 0.3`). Here the failure policy is an explicit plan
//! handed to whoever simulates the server, so tests can force either
//! outcome.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::RngExt;

/// When simulated mutations should fail.
#[derive(Debug, Clone)]
pub enum FaultPlan {
    Never,
    Always,
    /// Fail with the given probability.
    Random(f64),
    /// Replay a fixed sequence, one entry per mutation; `true` means fail.
    /// Mutations past the end of the script succeed.
    Script(Vec<bool>),
}

/// Rolls outcomes from a plan. Owns the script cursor, so a shared injector
/// hands out each scripted outcome exactly once.
#[derive(Debug)]
pub struct FaultInjector {
    plan: FaultPlan,
    cursor: AtomicUsize,
}

impl FaultInjector {
    pub fn new(plan: FaultPlan) -> Self {
        Self {
            plan,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn never() -> Self {
        Self::new(FaultPlan::Never)
    }

    /// Decide the fate of the next mutation.
    pub fn should_fail(&self) -> bool {
        match &self.plan {
            FaultPlan::Never => false,
            FaultPlan::Always => true,
            FaultPlan::Random(p) => {
                let mut rng = rand::rng();
                rng.random::<f64>() < *p
            }
            FaultPlan::Script(outcomes) => {
                let i = self.cursor.fetch_add(1, Ordering::SeqCst);
                outcomes.get(i).copied().unwrap_or(false)
            }
        }
    }
}
