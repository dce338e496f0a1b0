//! gshare+ (TAGE-style) predictor.
//!
//! A base table of 2-bit counters plus `NUM_TBLS` tagged tables with
//! geometrically-decreasing history lengths (16, 12, 8, ... in steps of
//! 4), each holding a tagged 2-bit saturating counter and a 2-bit
//! useful counter. Prediction walks tables from longest to shortest
//! history, taking the first tag-matching entry as the provider; with
//! no provider, falls back to the base table. Per §9's REDESIGN FLAGS
//! note, `TBL_SIZE` (not `NUM_TBLS`) sizes every table.
//!
//! Grounded in `examples/willmccallion-rvsim/.../core/units/bru/tage.rs`
//! for the tagged-bank/provider/useful-counter shape, narrowed to
//! exactly the index/tag formulas and allocate-on-no-provider policy
//! §4.9 specifies (that file's loop predictor and periodic useful-bit
//! reset are its own elaborations, not part of this design).

use super::btb::Btb;

const GOLDEN_RATIO_32: u32 = 0x9e37_79b9;
const TAKEN_THRESHOLD: u8 = 2;

#[derive(Clone, Copy, Default)]
struct TaggedEntry {
    valid: bool,
    tag: u8,
    counter: u8,
    useful: u8,
}

/// A gshare+ predictor with `num_tbls` tagged tables of `tbl_size`
/// entries each (history lengths `16, 12, 8, ...` for as many tables
/// as fit above zero), a `base_size`-entry base table, and a
/// `btb_size`-entry branch target buffer.
pub struct GsharePlusPredictor {
    tables: Vec<Vec<TaggedEntry>>,
    hist_lengths: Vec<u32>,
    tbl_size: usize,
    base: Vec<u8>,
    base_size: usize,
    ghr: u64,
    btb: Btb,
}

impl GsharePlusPredictor {
    /// Creates a gshare+ predictor.
    pub fn new(btb_size: usize, base_size: usize, num_tbls: usize, tbl_size: usize) -> Self {
        let hist_lengths: Vec<u32> = (0..num_tbls)
            .map(|i| 16u32.saturating_sub(4 * i as u32))
            .filter(|&l| l > 0)
            .collect();
        Self {
            tables: vec![vec![TaggedEntry::default(); tbl_size]; hist_lengths.len()],
            hist_lengths,
            tbl_size,
            base: vec![1; base_size],
            base_size,
            ghr: 0,
            btb: Btb::new(btb_size),
        }
    }

    fn index(&self, pc: u32, hist_len: u32) -> usize {
        let mask = (1u64 << hist_len) - 1;
        let ghr_masked = (self.ghr & mask) as u32;
        let len_hash = (hist_len).wrapping_mul(GOLDEN_RATIO_32);
        ((pc ^ ghr_masked ^ len_hash) as usize) % self.tbl_size
    }

    fn tag(&self, pc: u32, hist_len: u32) -> u8 {
        let shifted = (self.ghr >> hist_len) as u32;
        ((pc ^ shifted) & 0xFF) as u8
    }

    fn base_index(&self, pc: u32) -> usize {
        (pc as usize) % self.base_size
    }

    /// Returns the index of the provider table (longest matching
    /// history), searched from longest to shortest, or `None` if no
    /// tagged table has a matching entry.
    fn provider(&self, pc: u32) -> Option<usize> {
        for i in 0..self.hist_lengths.len() {
            let len = self.hist_lengths[i];
            let idx = self.index(pc, len);
            let tag = self.tag(pc, len);
            let e = &self.tables[i][idx];
            if e.valid && e.tag == tag {
                return Some(i);
            }
        }
        None
    }

    /// Predicts the next program counter after `pc`.
    pub fn predict(&self, pc: u32) -> u32 {
        let taken = if let Some(bank) = self.provider(pc) {
            let len = self.hist_lengths[bank];
            let idx = self.index(pc, len);
            self.tables[bank][idx].counter >= TAKEN_THRESHOLD
        } else {
            self.base[self.base_index(pc)] >= TAKEN_THRESHOLD
        };

        if taken {
            self.btb.lookup(pc).unwrap_or(pc.wrapping_add(4))
        } else {
            pc.wrapping_add(4)
        }
    }

    /// Trains the predictor with the actual outcome of the branch at
    /// `pc`.
    pub fn update(&mut self, pc: u32, next_pc: u32, taken: bool) {
        let base_idx = self.base_index(pc);
        saturating_update(&mut self.base[base_idx], taken);

        if let Some(bank) = self.provider(pc) {
            let len = self.hist_lengths[bank];
            let idx = self.index(pc, len);
            let old_prediction = self.tables[bank][idx].counter >= TAKEN_THRESHOLD;
            saturating_update(&mut self.tables[bank][idx].counter, taken);
            let new_prediction = self.tables[bank][idx].counter >= TAKEN_THRESHOLD;

            let useful = &mut self.tables[bank][idx].useful;
            if old_prediction == new_prediction {
                *useful = useful.saturating_add(1).min(3);
            } else if *useful > 0 {
                *useful -= 1;
            }
        } else {
            self.allocate(pc, taken);
        }

        if taken {
            self.btb.update(pc, next_pc);
        }
        self.ghr = (self.ghr << 1) | u64::from(taken);
    }

    /// Allocates a fresh tagged entry for a mispredicted branch with no
    /// provider, scanning longest-to-shortest for an invalid or
    /// zero-useful slot.
    fn allocate(&mut self, pc: u32, taken: bool) {
        for i in 0..self.hist_lengths.len() {
            let len = self.hist_lengths[i];
            let idx = self.index(pc, len);
            let tag = self.tag(pc, len);
            let e = &mut self.tables[i][idx];
            if !e.valid || e.useful == 0 {
                e.valid = true;
                e.tag = tag;
                e.counter = if taken {
                    TAKEN_THRESHOLD
                } else {
                    TAKEN_THRESHOLD - 1
                };
                e.useful = 0;
                return;
            }
        }
    }
}

fn saturating_update(counter: &mut u8, taken: bool) {
    if taken {
        *counter = counter.saturating_add(1).min(3);
    } else if *counter > 0 {
        *counter -= 1;
    }
}
