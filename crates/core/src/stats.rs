//! Simulation statistics collection and reporting.
//!
//! Tracks the figures the out-of-order core accumulates for free as
//! part of normal operation: elapsed cycles, retired instructions, a
//! per-functional-unit-kind retirement breakdown, and the number of
//! cycles fetch spent stalled waiting on an unresolved branch (§2 of
//! `SPEC_FULL.md`, grounded in the original's `Core::showStats()`).
//!
//! Grounded in `examples/willmccallion-rvsim/.../stats.rs`'s
//! `SimStats` struct-plus-formatted-report style, trimmed to the much
//! smaller counter set this design tracks.

use crate::isa::instr::FuKind;

/// Performance counters gathered over a simulation run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerfStats {
    /// Total processor cycles elapsed.
    pub cycles: u64,
    /// Total instructions retired (committed).
    pub instrs: u64,
    /// Instructions retired per functional-unit kind.
    pub retired_alu: u64,
    pub retired_bru: u64,
    pub retired_lsu: u64,
    pub retired_sfu: u64,
    /// Cycles the fetch stage declined to advance because it was
    /// waiting on an unresolved branch/jump.
    pub fetch_stall_cycles: u64,
}

impl PerfStats {
    /// Records one committed instruction's functional-unit kind.
    pub fn record_retired(&mut self, kind: FuKind) {
        match kind {
            FuKind::Alu => self.retired_alu += 1,
            FuKind::Bru => self.retired_bru += 1,
            FuKind::Lsu => self.retired_lsu += 1,
            FuKind::Sfu => self.retired_sfu += 1,
        }
    }

    /// Instructions retired per cycle, `0.0` if no cycles have elapsed.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instrs as f64 / self.cycles as f64
        }
    }

    /// A human-readable multi-line report, in the original's
    /// `showStats()` spirit: cycle/instruction totals, IPC, the
    /// per-kind retirement breakdown, and the fetch-stall count.
    pub fn report(&self) -> String {
        format!(
            "cycles            = {}\n\
             instructions      = {}\n\
             IPC               = {:.4}\n\
             retired (alu)     = {}\n\
             retired (bru)     = {}\n\
             retired (lsu)     = {}\n\
             retired (sfu)     = {}\n\
             fetch stall cycles = {}\n",
            self.cycles,
            self.instrs,
            self.ipc(),
            self.retired_alu,
            self.retired_bru,
            self.retired_lsu,
            self.retired_sfu,
            self.fetch_stall_cycles,
        )
    }
}
