//! Reorder Buffer.
//!
//! A fixed-capacity circular buffer of in-flight instructions. Entries
//! are allocated at the tail in issue order and retired from the head in
//! the same order, giving the core its in-order-commit guarantee despite
//! out-of-order execution. This design carries no flush/speculation
//! machinery — mis-speculation recovery is out of scope (see
//! `DESIGN.md`), so an entry, once allocated, is always eventually
//! completed and committed.

use crate::common::error::SimError;
use crate::isa::instr::Instr;

/// One entry in the reorder buffer.
#[derive(Clone, Copy, Debug)]
pub struct RobEntry {
    /// Whether this slot is currently occupied.
    pub valid: bool,
    /// Whether the result has been produced (via a CDB broadcast).
    pub ready: bool,
    /// The computed result, valid only once `ready`.
    pub result: u32,
    /// The instruction this entry tracks.
    pub instr: Instr,
}

impl Default for RobEntry {
    fn default() -> Self {
        Self {
            valid: false,
            ready: false,
            result: 0,
            instr: crate::isa::decode::decode(0, 0, 0),
        }
    }
}

/// The reorder buffer: a circular queue of [`RobEntry`].
pub struct Rob {
    entries: Vec<RobEntry>,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
}

impl Rob {
    /// Creates an empty ROB with room for `capacity` in-flight instructions.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![RobEntry::default(); capacity],
            capacity,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// True if no free slot remains.
    pub fn full(&self) -> bool {
        self.count == self.capacity
    }

    /// True if there is no in-flight instruction.
    pub fn empty(&self) -> bool {
        self.count == 0
    }

    /// Number of in-flight instructions.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reads an entry by index (for RAT/RST consultation at issue, and
    /// for tests verifying invariants).
    pub fn get_entry(&self, index: usize) -> &RobEntry {
        &self.entries[index]
    }

    /// The index commit will next consider.
    pub fn head_index(&self) -> usize {
        self.head
    }

    /// Allocates a new entry at the tail for `instr`, returning its index.
    ///
    /// Caller must ensure `!full()`.
    pub fn allocate(&mut self, instr: Instr) -> usize {
        debug_assert!(!self.full(), "allocate called on a full ROB");
        let index = self.tail;
        self.entries[index] = RobEntry {
            valid: true,
            ready: false,
            result: 0,
            instr,
        };
        self.tail = (self.tail + 1) % self.capacity;
        self.count += 1;
        index
    }

    /// Records a CDB-delivered result for `rob_index`.
    ///
    /// Fatal if the entry is not valid-and-not-yet-ready: that can only
    /// happen if something upstream (RS/RST bookkeeping) is broken.
    pub fn update(&mut self, rob_index: usize, result: u32) -> Result<(), SimError> {
        let entry = &mut self.entries[rob_index];
        if !entry.valid || entry.ready {
            return Err(SimError::Invariant(format!(
                "ROB::update on entry {rob_index} that is not valid-and-pending (valid={}, ready={})",
                entry.valid, entry.ready
            )));
        }
        entry.result = result;
        entry.ready = true;
        Ok(())
    }

    /// Retires the head entry.
    ///
    /// Fatal if the head is not valid-and-ready: callers must check
    /// `can_commit_head` first — this only happens if the core commits
    /// when it shouldn't.
    pub fn pop(&mut self) -> Result<RobEntry, SimError> {
        let head = self.entries[self.head];
        if !head.valid || !head.ready {
            return Err(SimError::Invariant(format!(
                "ROB::pop on head {} that is not valid-and-ready",
                self.head
            )));
        }
        self.entries[self.head].valid = false;
        self.head = (self.head + 1) % self.capacity;
        self.count -= 1;
        Ok(head)
    }

    /// True if the head entry is valid and ready to commit.
    pub fn can_commit_head(&self) -> bool {
        !self.empty() && {
            let head = &self.entries[self.head];
            head.valid && head.ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::instr::{AluOp, ExeFlags, FuKind};

    fn dummy_instr(rd: usize) -> Instr {
        Instr {
            id: 0,
            pc: 0,
            fu_kind: FuKind::Alu,
            alu_op: AluOp::Add,
            br_op: crate::isa::instr::BrOp::None,
            rs1: 0,
            rs2: 0,
            rd,
            imm: 0,
            func3: 0,
            exe_flags: ExeFlags {
                use_rd: true,
                ..ExeFlags::default()
            },
        }
    }

    #[test]
    fn allocate_fills_tail_and_advances() {
        let mut rob = Rob::new(4);
        let i0 = rob.allocate(dummy_instr(1));
        let i1 = rob.allocate(dummy_instr(2));
        assert_eq!(i0, 0);
        assert_eq!(i1, 1);
        assert_eq!(rob.count(), 2);
        assert!(!rob.full());
    }

    #[test]
    fn full_when_capacity_reached() {
        let mut rob = Rob::new(2);
        rob.allocate(dummy_instr(1));
        rob.allocate(dummy_instr(2));
        assert!(rob.full());
    }

    #[test]
    fn update_then_pop_in_order() {
        let mut rob = Rob::new(4);
        let i0 = rob.allocate(dummy_instr(1));
        let i1 = rob.allocate(dummy_instr(2));
        assert!(!rob.can_commit_head());

        rob.update(i0, 100).unwrap();
        assert!(rob.can_commit_head());
        let entry = rob.pop().unwrap();
        assert_eq!(entry.result, 100);
        assert_eq!(rob.count(), 1);

        assert!(!rob.can_commit_head(), "i1 not ready yet");
        rob.update(i1, 200).unwrap();
        let entry = rob.pop().unwrap();
        assert_eq!(entry.result, 200);
        assert!(rob.empty());
    }

    #[test]
    fn update_on_already_ready_entry_is_invariant_error() {
        let mut rob = Rob::new(2);
        let i0 = rob.allocate(dummy_instr(1));
        rob.update(i0, 1).unwrap();
        assert!(rob.update(i0, 2).is_err());
    }

    #[test]
    fn pop_on_not_ready_is_invariant_error() {
        let mut rob = Rob::new(2);
        rob.allocate(dummy_instr(1));
        assert!(rob.pop().is_err());
    }

    #[test]
    fn wraps_around_circular_buffer() {
        let mut rob = Rob::new(2);
        let a = rob.allocate(dummy_instr(1));
        rob.update(a, 1).unwrap();
        rob.pop().unwrap();
        let b = rob.allocate(dummy_instr(2));
        assert_eq!(b, 0, "tail should have wrapped back to slot 0");
    }

    use proptest::prelude::*;
    use std::collections::VecDeque;

    proptest! {
        // Drives a random sequence of allocate/pop calls (each only
        // attempted when legal) and checks that count() never exceeds
        // capacity and that pop() always returns entries in the same
        // order they were allocated, regardless of how the sequence is
        // shuffled.
        #[test]
        fn count_bounded_and_pop_order_matches_allocate_order(
            try_allocate in prop::collection::vec(any::<bool>(), 0..200),
        ) {
            let capacity = 8;
            let mut rob = Rob::new(capacity);
            let mut expected: VecDeque<u32> = VecDeque::new();
            let mut next_rd: usize = 0;

            for allocate in try_allocate {
                if allocate {
                    if !rob.full() {
                        let rd = (next_rd % 32) as u32;
                        next_rd += 1;
                        let idx = rob.allocate(dummy_instr(rd as usize));
                        rob.update(idx, rd).unwrap();
                        expected.push_back(rd);
                    }
                } else if !rob.empty() && rob.can_commit_head() {
                    let entry = rob.pop().unwrap();
                    prop_assert_eq!(Some(entry.result), expected.pop_front());
                }
                prop_assert!(rob.count() <= capacity);
            }
        }
    }
}
