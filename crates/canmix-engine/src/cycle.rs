//! Cycle timer: an explicit two-state machine for the sender's periodic
//! firing.
//!
//! `Idle` means no firing is scheduled; `Armed` holds the next deadline.
//! Re-arming measures the period from the firing instant, not the
//! original schedule instant, so each inter-cycle gap is exactly the
//! configured period while cumulative drift is accepted.

use std::time::Duration;

use tokio::time::Instant;

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No firing scheduled.
    Idle,
    /// Counting down to the next firing.
    Armed,
}

/// Single owned timer handle driving the transmission cycle.
#[derive(Debug)]
pub struct CycleTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl CycleTimer {
    /// Create a stopped timer with the given period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> CycleState {
        match self.deadline {
            Some(_) => CycleState::Armed,
            None => CycleState::Idle,
        }
    }

    /// Whether the timer is armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm (or re-arm) for one period from now.
    ///
    /// Called on engine start and again at the end of every firing, so
    /// the gap is measured from the firing instant.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.period);
    }

    /// Cancel without rescheduling.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }
}

/// Sleep until the deadline, or forever when there is none.
///
/// Lets the engine's select loop treat a disarmed timer as a branch that
/// never completes.
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
