//! Register Alias Table.
//!
//! A partial mapping from architectural register index to the ROB index
//! of its in-flight producer. `x0` is hardwired to zero and is never
//! mapped, matching the architectural register file's own treatment of
//! `x0`.
//!
//! Grounded in the teacher's scoreboard (`core/pipeline/scoreboard.rs`):
//! a fixed-size array of `Option<RobIndex>`, with `clear` only taking
//! effect when the stored mapping still names the entry being cleared
//! (later writers shadow earlier ones and must not be undone by a
//! stale commit).

const NUM_REGS: usize = 32;

/// Architectural register → producing ROB index.
#[derive(Debug)]
pub struct Rat {
    producer: [Option<usize>; NUM_REGS],
}

impl Default for Rat {
    fn default() -> Self {
        Self::new()
    }
}

impl Rat {
    /// Creates an empty RAT (no register has an in-flight producer).
    pub fn new() -> Self {
        Self {
            producer: [None; NUM_REGS],
        }
    }

    /// True if `reg` currently has an in-flight producer.
    pub fn exists(&self, reg: usize) -> bool {
        reg != 0 && self.producer[reg].is_some()
    }

    /// The ROB index producing `reg`, if any.
    pub fn get(&self, reg: usize) -> Option<usize> {
        if reg == 0 {
            None
        } else {
            self.producer[reg]
        }
    }

    /// Installs `rob_index` as the producer of `reg`, overwriting any
    /// prior mapping. A no-op for `x0`.
    pub fn set(&mut self, reg: usize, rob_index: usize) {
        if reg != 0 {
            self.producer[reg] = Some(rob_index);
        }
    }

    /// Removes `reg`'s mapping only if it still points at `rob_index`
    /// (i.e. no later instruction has since overwritten it).
    pub fn clear_if_match(&mut self, reg: usize, rob_index: usize) {
        if reg != 0 && self.producer[reg] == Some(rob_index) {
            self.producer[reg] = None;
        }
    }
}
