//! A cycle-accurate, out-of-order RISC-V-subset (RV32I) pipeline
//! simulator built around Tomasulo's algorithm: register renaming via
//! a Register Alias Table, a circular Reorder Buffer for in-order
//! commit, a Reservation Station pool with an LSU issue-order ticket
//! barrier, and a single-slot Common Data Bus broadcasting one
//! functional-unit result per cycle.
//!
//! This design carries no speculative execution: branches and jumps
//! stall fetch until resolved, so there is no flush/recovery path to
//! implement (see `DESIGN.md`). gshare and gshare+/TAGE-lite branch
//! predictors are implemented as standalone, independently testable
//! components rather than wired into the stall-based fetch stage.

/// Common types shared across the simulator: the fatal-abort error
/// taxonomy.
pub mod common;
/// Simulator configuration (ROB/RS capacities, FU latencies, predictor
/// sizing, memory layout, cycle watchdog).
pub mod config;
/// The out-of-order core: Tomasulo machinery and the driver.
pub mod core;
/// Instruction set support: the decoded-instruction record and decoder.
pub mod isa;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize
/// from a JSON config file.
pub use crate::config::Config;
/// The out-of-order core driver; construct with `Core::new(&config)`.
pub use crate::core::Core;
/// Performance counters gathered over a simulation run.
pub use crate::stats::PerfStats;
