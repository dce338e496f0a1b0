//! Reservation Station.
//!
//! A fixed-capacity pool of dispatched-but-unexecuted instructions,
//! tracking operand readiness via back-references to the RS index that
//! will eventually produce each pending operand. LSU entries are
//! additionally subject to a ticket barrier that forces memory
//! operations to dispatch to the LSU in the order they were issued,
//! regardless of how quickly their operands become ready — this is the
//! mechanism behind the design's "LSU dispatches in issue order"
//! guarantee.
//!
//! Grounded in `examples/original_source/project_3/src/RS.h`/`RS.cpp`:
//! the free-list pool and the `lsu_barrier_.tick()`/`.tock()`/`.ready()`
//! ticket scheme are carried over directly.

use crate::core::cdb::CdbMessage;
use crate::isa::instr::{FuKind, Instr};

/// One entry in the reservation station.
#[derive(Clone, Copy, Debug)]
pub struct RsEntry {
    /// Whether this slot is occupied.
    pub valid: bool,
    /// Whether this entry has already been dispatched to a functional unit.
    pub running: bool,
    /// The ROB index this entry will eventually produce a result for.
    pub rob_index: usize,
    /// RS index of the producer of `rs1`, or `None` if `rs1_data` is ready.
    pub rs1_index: Option<usize>,
    /// RS index of the producer of `rs2`, or `None` if `rs2_data` is ready.
    pub rs2_index: Option<usize>,
    /// `rs1` value, valid once `rs1_index` is `None`.
    pub rs1_data: u32,
    /// `rs2` value, valid once `rs2_index` is `None`.
    pub rs2_data: u32,
    /// LSU issue-order ticket, `None` for non-LSU entries.
    pub barrier_id: Option<u64>,
    /// The instruction this entry is executing.
    pub instr: Instr,
}

impl RsEntry {
    fn vacant() -> Self {
        Self {
            valid: false,
            running: false,
            rob_index: 0,
            rs1_index: None,
            rs2_index: None,
            rs1_data: 0,
            rs2_data: 0,
            barrier_id: None,
            instr: crate::isa::decode::decode(0, 0, 0),
        }
    }
}

/// The reservation station: a free-list pool of [`RsEntry`] plus the LSU
/// ticket barrier.
#[derive(Debug)]
pub struct Rs {
    entries: Vec<RsEntry>,
    free_list: Vec<usize>,
    lsu_tick: u64,
    lsu_tock: u64,
}

impl Rs {
    /// Creates an RS with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![RsEntry::vacant(); capacity],
            free_list: (0..capacity).rev().collect(),
            lsu_tick: 0,
            lsu_tock: 0,
        }
    }

    /// True if no free slot remains.
    pub fn full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// True if no slot is occupied.
    pub fn empty(&self) -> bool {
        self.free_list.len() == self.entries.len()
    }

    /// Reads an entry by index.
    pub fn get(&self, index: usize) -> &RsEntry {
        &self.entries[index]
    }

    /// Number of entries in the pool (for iteration by callers).
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Dispatches a new entry, taking an LSU ticket if `instr.fu_kind`
    /// is `FuKind::Lsu`. Caller must ensure `!full()`.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &mut self,
        rob_index: usize,
        rs1_index: Option<usize>,
        rs2_index: Option<usize>,
        rs1_data: u32,
        rs2_data: u32,
        instr: Instr,
    ) -> usize {
        let index = self
            .free_list
            .pop()
            .expect("issue called on a full reservation station");

        let barrier_id = if instr.fu_kind == FuKind::Lsu {
            let ticket = self.lsu_tick;
            self.lsu_tick += 1;
            Some(ticket)
        } else {
            None
        };

        self.entries[index] = RsEntry {
            valid: true,
            running: false,
            rob_index,
            rs1_index,
            rs2_index,
            rs1_data,
            rs2_data,
            barrier_id,
            instr,
        };
        index
    }

    /// Releases `index` back to the free list; advances the LSU barrier
    /// if it was an LSU entry.
    pub fn release(&mut self, index: usize) {
        let was_lsu = self.entries[index].barrier_id.is_some();
        self.entries[index] = RsEntry::vacant();
        self.free_list.push(index);
        if was_lsu {
            self.lsu_tock += 1;
        }
    }

    /// True iff `index` is a valid LSU entry whose ticket has not yet
    /// come up — it must wait regardless of operand readiness.
    pub fn locked(&self, index: usize) -> bool {
        match self.entries[index].barrier_id {
            Some(ticket) => self.entries[index].valid && ticket != self.lsu_tock,
            None => false,
        }
    }

    /// True if both operands of `index` are ready.
    pub fn operands_ready(&self, index: usize) -> bool {
        let e = &self.entries[index];
        e.rs1_index.is_none() && e.rs2_index.is_none()
    }

    /// Resolves any pending operand in every live entry that matches
    /// `msg.rs_index`'s result. A CDB broadcast can resolve at most one
    /// pending reference per side per entry, since RS indices are
    /// unique among live producers.
    pub fn update_operands(&mut self, msg: CdbMessage) {
        for entry in &mut self.entries {
            if !entry.valid {
                continue;
            }
            if entry.rs1_index == Some(msg.rs_index) {
                entry.rs1_data = msg.result;
                entry.rs1_index = None;
            }
            if entry.rs2_index == Some(msg.rs_index) {
                entry.rs2_data = msg.result;
                entry.rs2_index = None;
            }
        }
    }

    /// Marks `index` as dispatched to a functional unit.
    pub fn set_running(&mut self, index: usize) {
        self.entries[index].running = true;
    }
}
