//! Branch predictors: gshare, gshare+ (TAGE-style), and the branch
//! target buffer they both consult.
//!
//! Neither predictor is wired into the fetch stage (see `DESIGN.md`'s
//! resolution of the fetch/predictor open question): the core has no
//! speculative execution or squash/recovery path, so fetch keeps the
//! literal stall/unstall contract of §4.7 and these predictors exist as
//! standalone, independently-testable components. A future design that
//! adds misprediction recovery would wire `predict`'s result into
//! fetch and `update` into the BRU's completion.

/// Branch target buffer shared by gshare and gshare+.
pub mod btb;

/// The two-bit-saturating-counter, PC-XOR-history direction predictor.
pub mod gshare;

/// The TAGE-style tagged-table predictor.
pub mod gshare_plus;
