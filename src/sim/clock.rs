//! Fixed-step loop driver
//!
//! The host's per-frame rendering callback calls [`LoopDriver::tick`] with
//! the current wall-clock time; the driver hands back the fixed simulation
//! step regardless of the real interval between frames, so physics results
//! are frame-rate independent. One invocation performs exactly one physics
//! step (no sub-stepping or backlog accumulation).

use crate::consts::SIM_DT;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopDriver {
    running: bool,
    ticks: u64,
    last_tick_ms: f64,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept tick invocations
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop processing ticks. Idempotent; safe from any phase.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One frame callback. Returns the fixed step to integrate, or `None`
    /// when the driver is cancelled.
    pub fn tick(&mut self, now_ms: f64) -> Option<f32> {
        if !self.running {
            return None;
        }
        self.ticks += 1;
        self.last_tick_ms = now_ms;
        Some(SIM_DT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_regardless_of_wall_delta() {
        let mut driver = LoopDriver::new();
        driver.start();
        // Wildly different frame gaps all map to the same logical step
        assert_eq!(driver.tick(0.0), Some(SIM_DT));
        assert_eq!(driver.tick(8.0), Some(SIM_DT));
        assert_eq!(driver.tick(500.0), Some(SIM_DT));
        assert_eq!(driver.ticks(), 3);
    }

    #[test]
    fn test_cancel_idempotent() {
        let mut driver = LoopDriver::new();
        driver.start();
        driver.tick(0.0);
        driver.cancel();
        driver.cancel();
        assert_eq!(driver.tick(16.0), None);
        assert_eq!(driver.ticks(), 1);
    }
}
