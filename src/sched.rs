//! Explicit scheduled-task handles
//!
//! Replacement for interval-timer control flow: every countdown, ramp, or
//! phase timeout is a task owned by the phase machine. The host drives
//! `poll(now_ms)` from its frame callback; fired tasks come back as plain
//! events in due order. Cancellation is idempotent and synchronous, so a
//! reset can never leave a stale timer mutating a superseded attempt.

use serde::{Deserialize, Serialize};

/// What a timer means to the game that scheduled it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Pre-game 3-2-1 countdown tick
    CountdownTick,
    /// Sensitivity ramp increment (balance)
    SensitivityRamp,
    /// Coarse per-stage clock (memory seconds, typing tenths)
    StageTick,
    /// One-shot phase timeout (memorize end, evaluating reveal)
    PhaseTimeout,
}

/// Opaque handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle(u64);

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub handle: TaskHandle,
    pub kind: TimerKind,
    /// Wall-clock time the task was due (not the poll time)
    pub due_ms: f64,
}

#[derive(Debug, Clone)]
struct Task {
    id: u64,
    kind: TimerKind,
    due_ms: f64,
    period_ms: Option<f64>,
}

/// Single-threaded polled timer set
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot task
    pub fn schedule(&mut self, kind: TimerKind, delay_ms: f64, now_ms: f64) -> TaskHandle {
        self.push_task(kind, now_ms + delay_ms.max(0.0), None)
    }

    /// Schedule a repeating task; first fire is one period from now
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        period_ms: f64,
        now_ms: f64,
    ) -> TaskHandle {
        let period = period_ms.max(1.0);
        self.push_task(kind, now_ms + period, Some(period))
    }

    fn push_task(&mut self, kind: TimerKind, due_ms: f64, period_ms: Option<f64>) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            due_ms,
            period_ms,
        });
        TaskHandle(id)
    }

    /// Cancel a task. Safe to call repeatedly or with a handle that already
    /// fired; unknown handles are a no-op.
    pub fn cancel(&mut self, handle: TaskHandle) {
        self.tasks.retain(|t| t.id != handle.0);
    }

    /// Drop every pending task (attempt teardown)
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Collect every task due at or before `now_ms`, in due order.
    /// Repeating tasks fire at most once per poll and are re-armed relative
    /// to their own due time so cadence does not drift with poll jitter.
    pub fn poll(&mut self, now_ms: f64) -> Vec<Fired> {
        let mut fired = Vec::new();
        for task in &mut self.tasks {
            if task.due_ms <= now_ms {
                fired.push(Fired {
                    handle: TaskHandle(task.id),
                    kind: task.kind,
                    due_ms: task.due_ms,
                });
                if let Some(period) = task.period_ms {
                    task.due_ms += period;
                }
            }
        }
        self.tasks.retain(|t| t.period_ms.is_some() || t.due_ms > now_ms);
        fired.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        fired
    }
}
