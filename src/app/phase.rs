//! Lifecycle phases
//!
//! A phase is a one-shot callable that receives the [`AppContext`] and
//! reports success or failure. It may be plain (runs to completion when
//! invoked) or suspending (an async block that may yield while it waits).
//! The runner treats both forms the same way.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

use super::AppContext;

/// Error returned by a failing phase
pub type PhaseError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running a phase
pub type PhaseResult = Result<(), PhaseError>;

type PhaseFn = Box<dyn FnOnce(AppContext) -> BoxFuture<'static, PhaseResult> + Send>;

/// Position of a phase in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Before,
    Run,
    After,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::Run => write!(f, "run"),
            Self::After => write!(f, "after"),
        }
    }
}

/// A single lifecycle phase
pub struct Phase {
    body: PhaseFn,
}

impl Phase {
    /// A phase that runs to completion as soon as it is invoked
    pub fn plain<F>(body: F) -> Self
    where
        F: FnOnce(&AppContext) -> PhaseResult + Send + 'static,
    {
        Self {
            body: Box::new(move |ctx| future::ready(body(&ctx)).boxed()),
        }
    }

    /// A phase that may suspend between steps
    pub fn suspending<F, Fut>(body: F) -> Self
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: Future<Output = PhaseResult> + Send + 'static,
    {
        Self {
            body: Box::new(move |ctx| body(ctx).boxed()),
        }
    }

    pub(crate) fn invoke(self, ctx: AppContext) -> BoxFuture<'static, PhaseResult> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase").finish_non_exhaustive()
    }
}
