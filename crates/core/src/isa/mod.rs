//! Instruction set support for the simulated RV32I subset.
//!
//! This module is deliberately thin: per the design's scope, instruction
//! decoding is an external collaborator — the core only consumes the
//! immutable [`instr::Instr`] record a decoder produces. [`decode`]
//! implements one such decoder for a pragmatic RV32I subset (integer
//! arithmetic, branches, loads/stores, and a CSR/system class used as the
//! SFU's input) sufficient to drive the Tomasulo core end to end.

/// The immutable decoded-instruction record and its constituent enums.
pub mod instr;

/// A from-scratch RV32I-subset decoder producing [`instr::Instr`] records.
pub mod decode;
