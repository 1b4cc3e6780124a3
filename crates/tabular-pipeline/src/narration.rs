//! Human-readable narration of cleaning and reporting activity.
//!
//! Every operation describes what it did ("3 duplicate row(s) removed") or why
//! it did nothing ("Column 'email' not found"). Those lines are incidental to
//! the results, so they go to an injectable [`Narrator`] instead of stdout.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_pipeline::{CollectingNarrator, TableCleaner};
//! use std::sync::Arc;
//!
//! let narrator = CollectingNarrator::default();
//! let mut cleaner = TableCleaner::with_narrator(df, Arc::new(narrator.clone()));
//! cleaner.normalize("missing", NormalizeMethod::Minmax)?;
//!
//! assert_eq!(narrator.warnings().len(), 1);
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Severity of a narration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationLevel {
    /// An operation completed
    Info,
    /// An operation degraded to a no-op
    Warning,
    /// An operation failed for one item but the call continued
    Error,
}

/// One narration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    pub level: NarrationLevel,
    pub message: String,
}

impl Narration {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NarrationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NarrationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NarrationLevel::Error,
            message: message.into(),
        }
    }
}

/// Receiver of narration lines.
///
/// Implementations must be `Send + Sync` so a cleaner can be handed to a
/// worker thread by a web view.
pub trait Narrator: Send + Sync {
    fn narrate(&self, narration: Narration);
}

/// Default narrator: forwards every line to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn narrate(&self, narration: Narration) {
        match narration.level {
            NarrationLevel::Info => info!("{}", narration.message),
            NarrationLevel::Warning => warn!("{}", narration.message),
            NarrationLevel::Error => error!("{}", narration.message),
        }
    }
}

/// Narrator that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn narrate(&self, _narration: Narration) {}
}

/// Append-only collector, for headless callers and tests.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingNarrator {
    entries: Arc<Mutex<Vec<Narration>>>,
}

impl CollectingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything narrated so far.
    pub fn entries(&self) -> Vec<Narration> {
        self.entries.lock().clone()
    }

    /// Messages of every level, in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|n| n.message.clone()).collect()
    }

    /// Messages at warning level.
    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(NarrationLevel::Warning)
    }

    /// Messages at error level.
    pub fn errors(&self) -> Vec<String> {
        self.messages_at(NarrationLevel::Error)
    }

    fn messages_at(&self, level: NarrationLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Narrator for CollectingNarrator {
    fn narrate(&self, narration: Narration) {
        self.entries.lock().push(narration);
    }
}

/// Wrapper that implements [`Narrator`] using a closure.
pub struct ClosureNarrator<F>
where
    F: Fn(Narration) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureNarrator<F>
where
    F: Fn(Narration) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Narrator for ClosureNarrator<F>
where
    F: Fn(Narration) + Send + Sync,
{
    fn narrate(&self, narration: Narration) {
        (self.callback)(narration);
    }
}

static_assertions::assert_impl_all!(CollectingNarrator: Send, Sync);
static_assertions::assert_impl_all!(Narration: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_collecting_narrator_shares_buffer() {
        let narrator = CollectingNarrator::new();
        let clone = narrator.clone();

        clone.narrate(Narration::info("done"));
        clone.narrate(Narration::warning("column missing"));
        clone.narrate(Narration::error("conversion failed"));

        assert_eq!(narrator.entries().len(), 3);
        assert_eq!(narrator.messages()[0], "done");
        assert_eq!(narrator.warnings(), vec!["column missing".to_string()]);
        assert_eq!(narrator.errors(), vec!["conversion failed".to_string()]);
    }

    #[test]
    fn test_closure_narrator() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let narrator = ClosureNarrator::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        narrator.narrate(Narration::info("a"));
        narrator.narrate(Narration::info("b"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_narration_serialization() {
        let json = serde_json::to_string(&Narration::warning("skip")).unwrap();
        assert!(json.contains("\"warning\""));
    }
}
