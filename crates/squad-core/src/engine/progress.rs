use crate::core::models::ids::{BuildId, PlayerId};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::time::Duration;

/// One player's place in an incumbent solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub player: PlayerId,
    pub build: BuildId,
    pub group: usize,
}

/// A decoded copy of an improving solution found during search.
#[derive(Debug, Clone, PartialEq)]
pub struct IncumbentSnapshot {
    pub elapsed: Duration,
    pub objective: i64,
    pub score: f64,
    pub slots: Vec<SlotSnapshot>,
}

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    StatusUpdate { text: String },
    /// Fired from inside the solver's search threads; handlers must not block.
    Incumbent(IncumbentSnapshot),

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// Forwards events into a bounded channel without ever blocking the reporting thread.
///
/// Events are dropped when the channel is full or the receiver is gone.
pub fn channel_callback(sender: SyncSender<Progress>) -> ProgressCallback<'static> {
    Box::new(move |event| match sender.try_send(event) {
        Ok(()) | Err(TrySendError::Disconnected(_)) => {}
        Err(TrySendError::Full(_)) => {
            tracing::trace!("Progress channel full; dropping event.");
        }
    })
}
