//! Configuration for the out-of-order core.
//!
//! Every knob the core needs that spec.md leaves as an implementation
//! parameter (ROB/RS capacities, FU latencies, predictor sizing, memory
//! layout, the cycle watchdog) lives here. Loaded from an optional JSON
//! file via `serde_json`; any field absent from the file falls back to
//! `defaults`.
//!
//! Grounded in `examples/willmccallion-rvsim/.../config.rs`'s
//! `mod defaults { pub const ... }` plus `#[derive(Deserialize)]`
//! struct-of-sections pattern, trimmed to the much smaller surface this
//! subset needs (no MMU/cache/SoC sections).

use serde::Deserialize;

/// Baseline values used when a field is absent from a loaded config file.
pub mod defaults {
    pub const ROB_CAPACITY: usize = 32;
    pub const RS_CAPACITY_ALU: usize = 8;
    pub const RS_CAPACITY_BRU: usize = 4;
    pub const RS_CAPACITY_LSU: usize = 8;
    pub const RS_CAPACITY_SFU: usize = 2;
    pub const LATENCY_ALU: u32 = 1;
    pub const LATENCY_BRU: u32 = 1;
    pub const LATENCY_LSU: u32 = 2;
    pub const LATENCY_SFU: u32 = 1;
    pub const DECODE_FIFO_CAPACITY: usize = 2;
    pub const ISSUE_FIFO_CAPACITY: usize = 2;
    pub const BTB_SIZE: usize = 1024;
    pub const BHR_SIZE: u32 = 12;
    pub const GSHARE_PLUS_NUM_TABLES: usize = 4;
    pub const GSHARE_PLUS_TBL_SIZE: usize = 1024;
    pub const MAX_CYCLES: u64 = 10_000_000;
    pub const RAM_SIZE: usize = 16 * 1024 * 1024;
    pub const IO_COUT_ADDR: u32 = 0xFFFF_0000;
    pub const IO_COUT_SIZE: u32 = 8;
}

/// Which branch predictor the CLI should exercise (§4.8/§4.9). Neither
/// predictor is wired into fetch (see `DESIGN.md`'s Open Question 6);
/// this selects which one stats/benchmarks are run against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    #[default]
    Gshare,
    GsharePlus,
}

/// Reservation-station capacity, broken out per functional-unit kind to
/// match spec.md's config surface; the reservation station itself is a
/// single unified pool (`core::rs::Rs`), sized as the sum of these four.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RsCapacities {
    pub alu: usize,
    pub bru: usize,
    pub lsu: usize,
    pub sfu: usize,
}

impl Default for RsCapacities {
    fn default() -> Self {
        Self {
            alu: defaults::RS_CAPACITY_ALU,
            bru: defaults::RS_CAPACITY_BRU,
            lsu: defaults::RS_CAPACITY_LSU,
            sfu: defaults::RS_CAPACITY_SFU,
        }
    }
}

impl RsCapacities {
    /// Total pool size passed to `Rs::new`.
    pub fn total(&self) -> usize {
        self.alu + self.bru + self.lsu + self.sfu
    }
}

/// Per-functional-unit-kind latency, in cycles.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct FuLatencies {
    pub alu: u32,
    pub bru: u32,
    pub lsu: u32,
    pub sfu: u32,
}

impl Default for FuLatencies {
    fn default() -> Self {
        Self {
            alu: defaults::LATENCY_ALU,
            bru: defaults::LATENCY_BRU,
            lsu: defaults::LATENCY_LSU,
            sfu: defaults::LATENCY_SFU,
        }
    }
}

/// gshare+ (TAGE-lite) tagged-table geometry (§4.9).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GsharePlusGeometry {
    pub num_tables: usize,
    /// Authoritative per-tagged-table entry count (spec's explicit
    /// correction of the surrounding prose's `NUM_TBLS` naming typo).
    pub tbl_size: usize,
}

impl Default for GsharePlusGeometry {
    fn default() -> Self {
        Self {
            num_tables: defaults::GSHARE_PLUS_NUM_TABLES,
            tbl_size: defaults::GSHARE_PLUS_TBL_SIZE,
        }
    }
}

/// Root configuration for one simulated core.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rob_capacity: usize,
    pub rs_capacity: RsCapacities,
    pub fu_latency: FuLatencies,
    pub decode_fifo_capacity: usize,
    pub issue_fifo_capacity: usize,
    pub btb_size: usize,
    pub bhr_size: u32,
    pub predictor: PredictorKind,
    pub gshare_plus: GsharePlusGeometry,
    pub max_cycles: u64,
    pub ram_size: usize,
    pub io_cout_addr: u32,
    pub io_cout_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rob_capacity: defaults::ROB_CAPACITY,
            rs_capacity: RsCapacities::default(),
            fu_latency: FuLatencies::default(),
            decode_fifo_capacity: defaults::DECODE_FIFO_CAPACITY,
            issue_fifo_capacity: defaults::ISSUE_FIFO_CAPACITY,
            btb_size: defaults::BTB_SIZE,
            bhr_size: defaults::BHR_SIZE,
            predictor: PredictorKind::default(),
            gshare_plus: GsharePlusGeometry::default(),
            max_cycles: defaults::MAX_CYCLES,
            ram_size: defaults::RAM_SIZE,
            io_cout_addr: defaults::IO_COUT_ADDR,
            io_cout_size: defaults::IO_COUT_SIZE,
        }
    }
}

impl Config {
    /// Parses a config from JSON text, falling back to `defaults` for
    /// any absent field.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
