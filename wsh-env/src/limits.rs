//! Execution limits and the counters checked against them
//! (`spec.md` §5 "Cancellation / timeouts", §6 "Execution limits").

use thiserror::Error;

/// Caller-settable bounds on one interpreter invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    pub max_recursion_depth: u32,
    pub max_total_commands: u64,
    pub max_loop_iterations: u64,
    /// Milliseconds; `None` means no deadline.
    pub wall_clock_timeout_ms: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_recursion_depth: 1000,
            max_total_commands: 100_000,
            max_loop_iterations: 1_000_000,
            wall_clock_timeout_ms: None,
        }
    }
}

/// Which bound was exceeded.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum LimitError {
    #[error("maximum recursion depth exceeded")]
    RecursionDepth,
    #[error("maximum total command count exceeded")]
    TotalCommands,
    #[error("maximum loop iteration count exceeded")]
    LoopIterations,
    #[error("wall-clock timeout exceeded")]
    Timeout,
}

/// Running counters checked against [`Limits`] at the points `spec.md` §5
/// names: recursion on function/subshell entry, commands on each simple
/// command, loop iterations on each pass of a loop body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    pub recursion_depth: u32,
    pub total_commands: u64,
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_call(&mut self, limits: &Limits) -> Result<(), LimitError> {
        self.recursion_depth += 1;
        if self.recursion_depth > limits.max_recursion_depth {
            return Err(LimitError::RecursionDepth);
        }
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    pub fn count_command(&mut self, limits: &Limits) -> Result<(), LimitError> {
        self.total_commands += 1;
        if self.total_commands > limits.max_total_commands {
            return Err(LimitError::TotalCommands);
        }
        Ok(())
    }

    /// Checks one loop iteration against `limits.max_loop_iterations`. Loop
    /// iteration counts are scoped to a single loop (reset when the loop is
    /// entered), unlike `total_commands`, which accumulates for the whole
    /// invocation — so the caller passes the per-loop counter in directly
    /// rather than this struct tracking it.
    pub fn count_loop_iteration(iterations: &mut u64, limits: &Limits) -> Result<(), LimitError> {
        *iterations += 1;
        if *iterations > limits.max_loop_iterations {
            return Err(LimitError::LoopIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursion_depth_is_bounded() {
        let limits = Limits {
            max_recursion_depth: 2,
            ..Default::default()
        };
        let mut counters = Counters::new();
        counters.enter_call(&limits).unwrap();
        counters.enter_call(&limits).unwrap();
        assert_eq!(counters.enter_call(&limits), Err(LimitError::RecursionDepth));
    }

    #[test]
    fn exit_call_restores_depth() {
        let limits = Limits::default();
        let mut counters = Counters::new();
        counters.enter_call(&limits).unwrap();
        counters.exit_call();
        assert_eq!(counters.recursion_depth, 0);
    }

    #[test]
    fn loop_iterations_are_bounded_per_loop() {
        let limits = Limits {
            max_loop_iterations: 1,
            ..Default::default()
        };
        let mut iterations = 0;
        Counters::count_loop_iteration(&mut iterations, &limits).unwrap();
        assert_eq!(Counters::count_loop_iteration(&mut iterations, &limits), Err(LimitError::LoopIterations));
    }
}
