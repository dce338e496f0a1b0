//! Whole-program integration tests driving `Core` purely through its
//! public API: load a flat image, run to completion, inspect committed
//! architectural state. These are the concrete scenarios the pipeline's
//! hazard handling is judged against — renaming across a RAW hazard, a
//! WAW hazard resolved by commit order rather than completion order,
//! store-then-load memory ordering, and branch resolution stalling and
//! then redirecting fetch.

use pretty_assertions::assert_eq;
use tomasulo_core::{Config, Core};

const EBREAK: u32 = 0x0010_0073;

fn i_type(imm: i32, rs1: u8, f3: u8, rd: u8, opc: u32) -> u32 {
    (((imm as u32) & 0xFFF) << 20) | ((rs1 as u32) << 15) | ((f3 as u32) << 12) | ((rd as u32) << 7) | opc
}

fn r_type(f7: u8, rs2: u8, rs1: u8, f3: u8, rd: u8, opc: u32) -> u32 {
    ((f7 as u32) << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | ((f3 as u32) << 12)
        | ((rd as u32) << 7)
        | opc
}

fn s_type(imm: i32, rs2: u8, rs1: u8, f3: u8, opc: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7F) << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | ((f3 as u32) << 12)
        | ((imm & 0x1F) << 7)
        | opc
}

fn b_type(imm: i32, rs2: u8, rs1: u8, f3: u8, opc: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 12) & 0x1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | ((f3 as u32) << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 0x1) << 7)
        | opc
}

fn assemble(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn run_to_exit(program: &[u8]) -> Core {
    let mut core = Core::new(&Config::default());
    core.load_image(program);
    let ran = core.run(10_000).expect("no fatal abort");
    assert!(core.has_exited(), "program did not exit within {ran} cycles");
    core
}

/// Scenario 1: straight-line arithmetic with no hazards.
#[test]
fn scenario_1_basic_arithmetic_and_exit() {
    let program = assemble(&[
        i_type(5, 0, 0, 1, 0x13), // addi x1, x0, 5
        i_type(7, 0, 0, 2, 0x13), // addi x2, x0, 7
        r_type(0, 2, 1, 0, 3, 0x33), // add x3, x1, x2
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(1), 5);
    assert_eq!(core.read_reg(2), 7);
    assert_eq!(core.read_reg(3), 12);
    assert_eq!(core.stats().instrs, 4);
}

/// Scenario 2: a RAW hazard resolved entirely through renaming — the
/// second `addi` must see the first's result via the ROB/CDB, not the
/// stale architectural register.
#[test]
fn scenario_2_raw_hazard_across_renaming() {
    let program = assemble(&[
        i_type(1, 0, 0, 1, 0x13), // addi x1, x0, 1
        i_type(1, 1, 0, 1, 0x13), // addi x1, x1, 1
        i_type(1, 1, 0, 2, 0x13), // addi x2, x1, 1
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(1), 2);
    assert_eq!(core.read_reg(2), 3);
}

/// Scenario 3: a WAW hazard on x1 — the RAT must end up pointing at
/// whichever producer committed last, not whichever completed first.
#[test]
fn scenario_3_waw_hazard_last_writer_wins() {
    let program = assemble(&[
        i_type(1, 0, 0, 1, 0x13), // addi x1, x0, 1
        i_type(2, 0, 0, 1, 0x13), // addi x1, x0, 2
        i_type(0, 1, 0, 2, 0x13), // addi x2, x1, 0
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(1), 2);
    assert_eq!(core.read_reg(2), 2);
}

/// Scenario 4: a store followed immediately by a load of the same
/// address must observe the stored value regardless of functional-unit
/// latency, since the LSU dispatches memory operations in issue order.
#[test]
fn scenario_4_memory_ordering_store_then_load() {
    let program = assemble(&[
        i_type(0x7FF, 0, 0, 1, 0x13), // addi x1, x0, 0x7FF
        i_type(0, 0, 0, 2, 0x13),     // addi x2, x0, 0  (base address)
        s_type(0, 1, 2, 2, 0x23),     // sw x1, 0(x2)
        i_type(0, 2, 2, 3, 0x03),     // lw x3, 0(x2)
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(3), 0x7FF);
}

/// Scenario 5: a forward-taken branch must redirect fetch before the
/// skipped instruction on the not-taken path ever commits.
#[test]
fn scenario_5_branch_resolution_redirects_pc() {
    let program = assemble(&[
        i_type(1, 0, 0, 1, 0x13),        // addi x1, x0, 1
        i_type(1, 0, 0, 2, 0x13),        // addi x2, x0, 1
        b_type(8, 2, 1, 0, 0x63),        // beq x1, x2, +8 (skip one instruction)
        i_type(99, 0, 0, 5, 0x13),       // addi x5, x0, 99 (must not commit)
        i_type(42, 0, 0, 5, 0x13),       // addi x5, x0, 42
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(5), 42, "skipped instruction must not commit");
}

/// A non-taken branch falls through normally; both `addi`s on the
/// fallthrough path commit in order.
#[test]
fn not_taken_branch_falls_through() {
    let program = assemble(&[
        i_type(1, 0, 0, 1, 0x13),  // addi x1, x0, 1
        i_type(2, 0, 0, 2, 0x13),  // addi x2, x0, 2
        b_type(8, 2, 1, 0, 0x63),  // beq x1, x2, +8 (not taken: 1 != 2)
        i_type(7, 0, 0, 5, 0x13),  // addi x5, x0, 7
        EBREAK,
    ]);
    let core = run_to_exit(&program);

    assert_eq!(core.read_reg(5), 7);
}
