//! Application lifecycle
//!
//! An [`App`] runs up to three phases in a fixed order:
//! 1. `before` (optional)
//! 2. `run` (required)
//! 3. `after` (optional)
//!
//! Each phase runs exactly once and only after the previous one finished.
//! The first failing (or panicking) phase skips the rest and is routed to
//! `die`, which by default logs a `[FATAL ERROR]` line and exits the
//! process with status 1.
//!
//! `start()` drives the sequence on the calling thread until a phase first
//! suspends, so plain phases have completed by the time it returns. A
//! suspended sequence is finished on a dedicated background thread.
//!
//! ```ignore
//! use launchpad::{App, Phase};
//!
//! let handle = App::builder()
//!     .debugging(true)
//!     .run(Phase::plain(|ctx| {
//!         launchpad::log!(ctx, "hello world");
//!         Ok(())
//!     }))
//!     .start()?;
//! handle.join();
//! ```

mod error;
mod logger;
mod options;
mod phase;

pub use error::AppError;
pub use logger::{format_line, render, to_log_value, LogTag, Logger};
pub use options::{default_options, AppOptions, IS_DEBUGGING};
pub use phase::{Phase, PhaseError, PhaseResult, Stage};

use futures::executor::block_on;
use futures::future::FutureExt;
use futures::task::noop_waker_ref;
use serde_json::{Map, Value};
use std::any::Any;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::process;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};

/// Exit status used by the default `die`
pub const EXIT_CODE_FATAL: i32 = 1;

/// Name of the thread that finishes suspended phase sequences
pub const PHASE_THREAD_NAME: &str = "launchpad-phases";

/// Replacement for the default `die`
pub type DieHandler = Arc<dyn Fn(&AppContext, &[Value]) + Send + Sync>;

/// Entry point for building an application
pub struct App;

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }
}

/// Collects options and phases, then starts the sequence
#[derive(Default)]
pub struct AppBuilder {
    options: Map<String, Value>,
    invalid_options: Option<Value>,
    before: Option<Phase>,
    run: Option<Phase>,
    after: Option<Phase>,
    on_die: Option<DieHandler>,
    logger: Option<Logger>,
}

impl AppBuilder {
    /// Merge an option object into the options supplied so far
    pub fn options(mut self, options: Value) -> Self {
        match options {
            Value::Null => {}
            Value::Object(map) => launchpad_config::merge_maps(&mut self.options, map),
            other => self.invalid_options = Some(other),
        }
        self
    }

    /// Set a single option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `isDebugging` option
    pub fn debugging(self, enabled: bool) -> Self {
        self.option(IS_DEBUGGING, enabled)
    }

    pub fn before(mut self, phase: Phase) -> Self {
        self.before = Some(phase);
        self
    }

    pub fn run(mut self, phase: Phase) -> Self {
        self.run = Some(phase);
        self
    }

    pub fn after(mut self, phase: Phase) -> Self {
        self.after = Some(phase);
        self
    }

    /// Replace the default `die`
    pub fn on_die<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AppContext, &[Value]) + Send + Sync + 'static,
    {
        self.on_die = Some(Arc::new(handler));
        self
    }

    /// Send log lines to `writer` instead of stdout
    pub fn output<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.logger = Some(Logger::to_writer(writer));
        self
    }

    /// Resolve options, validate the entry point and start the phases.
    ///
    /// Errors here are construction errors. Failures inside a phase never
    /// come back through this call; they go to `die`.
    pub fn start(self) -> Result<AppHandle, AppError> {
        if let Some(invalid) = self.invalid_options {
            return Err(AppError::InvalidOptions(format!(
                "expected an object, got {}",
                invalid
            )));
        }
        let options = AppOptions::resolve(self.options);
        let run = self.run.ok_or(AppError::MissingEntryPoint)?;

        let ctx = AppContext {
            inner: Arc::new(ContextInner {
                options,
                logger: self.logger.unwrap_or_default(),
                on_die: self.on_die,
            }),
        };

        let mut sequence = run_sequence(ctx, self.before, run, self.after).boxed();

        let mut cx = Context::from_waker(noop_waker_ref());
        if let Poll::Ready(outcome) = sequence.poll_unpin(&mut cx) {
            return Ok(AppHandle {
                state: HandleState::Finished(outcome),
            });
        }

        let thread = thread::Builder::new()
            .name(PHASE_THREAD_NAME.to_string())
            .spawn(move || block_on(sequence))
            .map_err(|e| AppError::Spawn(e.to_string()))?;

        Ok(AppHandle {
            state: HandleState::Running(thread),
        })
    }
}

async fn run_sequence(
    ctx: AppContext,
    before: Option<Phase>,
    run: Phase,
    after: Option<Phase>,
) -> Outcome {
    let phases = [
        (Stage::Before, before),
        (Stage::Run, Some(run)),
        (Stage::After, after),
    ];

    for (stage, phase) in phases {
        let Some(phase) = phase else {
            continue;
        };
        let phase_ctx = ctx.clone();
        let result = AssertUnwindSafe(async move { phase.invoke(phase_ctx).await })
            .catch_unwind()
            .await;

        let failure = match result {
            Ok(Ok(())) => continue,
            Ok(Err(error)) => error.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(&*payload)),
        };
        ctx.die(&[Value::String(format!("{} phase failed: {}", stage, failure))]);
        return Outcome::Failed(stage);
    }

    Outcome::Completed
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// How a phase sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every supplied phase succeeded
    Completed,
    /// The given stage failed and `die` was called (and returned)
    Failed(Stage),
    /// The phase thread panicked outside a phase (e.g. in a `die` override)
    Aborted,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Handle on a started application.
///
/// Dropping the handle does not stop the phases.
#[derive(Debug)]
pub struct AppHandle {
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Finished(Outcome),
    Running(JoinHandle<Outcome>),
}

impl AppHandle {
    /// Whether the sequence has ended
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Finished(_) => true,
            HandleState::Running(thread) => thread.is_finished(),
        }
    }

    /// Block until the sequence has ended
    pub fn join(self) -> Outcome {
        match self.state {
            HandleState::Finished(outcome) => outcome,
            HandleState::Running(thread) => thread.join().unwrap_or(Outcome::Aborted),
        }
    }
}

/// What a phase sees of its application
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    options: AppOptions,
    logger: Logger,
    on_die: Option<DieHandler>,
}

impl AppContext {
    pub fn options(&self) -> &AppOptions {
        &self.inner.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.inner.options.get(key)
    }

    pub fn is_debugging(&self) -> bool {
        self.inner.options.is_debugging()
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    /// Log one line prefixed with `[HH:MM:SS]`
    pub fn log(&self, values: &[Value]) {
        self.inner.logger.line(None, values);
    }

    /// Log with a `[DEBUG]` tag, only when `isDebugging` is set
    pub fn debug(&self, values: &[Value]) {
        if !self.is_debugging() {
            return;
        }
        self.inner.logger.line(Some(LogTag::Debug), values);
    }

    /// Report a fatal error.
    ///
    /// Calls the handler given to [`AppBuilder::on_die`] when there is one.
    /// Otherwise logs with a `[FATAL ERROR]` tag and exits the process with
    /// [`EXIT_CODE_FATAL`].
    pub fn die(&self, values: &[Value]) {
        if let Some(handler) = &self.inner.on_die {
            handler(self, values);
            return;
        }
        self.inner.logger.line(Some(LogTag::Fatal), values);
        process::exit(EXIT_CODE_FATAL);
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
