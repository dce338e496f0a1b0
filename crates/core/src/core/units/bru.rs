//! Branch resolution unit semantics.
//!
//! Resolves the taken/not-taken decision and the target address for
//! branches and jumps, unconditionally redirects the program counter and
//! releases the fetch stall once resolved (§4.7: no speculative
//! execution — fetch simply waits), and writes back the link value
//! (`pc + 4`) for `JAL`/`JALR`.
//!
//! Grounded in `examples/original_source/project_3/src/FU.cpp`'s branch
//! arm of `execute`, and `examples/willmccallion-rvsim/.../core/units/bru/mod.rs`
//! for the idiomatic split between condition evaluation and target
//! computation.

use super::alu;
use super::CoreServices;
use crate::common::error::SimError;
use crate::isa::instr::{BrOp, Instr};

/// True if the branch/jump in `instr` is taken, given its resolved
/// register operands.
fn taken(instr: &Instr, rs1_value: u32, rs2_value: u32) -> bool {
    match instr.br_op {
        BrOp::None => false,
        BrOp::Jal | BrOp::Jalr => true,
        BrOp::Beq => rs1_value == rs2_value,
        BrOp::Bne => rs1_value != rs2_value,
        BrOp::Blt => (rs1_value as i32) < (rs2_value as i32),
        BrOp::Bge => (rs1_value as i32) >= (rs2_value as i32),
        BrOp::Bltu => rs1_value < rs2_value,
        BrOp::Bgeu => rs1_value >= rs2_value,
    }
}

/// Resolves a branch/jump, redirects the core's PC, and returns the
/// link-register value (`pc + 4`) written back for `JAL`/`JALR`
/// (ignored by the ROB for plain conditional branches, which don't
/// set `use_rd`).
pub fn do_execute(
    instr: &Instr,
    rs1_value: u32,
    rs2_value: u32,
    services: &mut dyn CoreServices,
) -> Result<u32, SimError> {
    if instr.br_op == BrOp::None {
        return Err(SimError::UnsupportedBrOp(instr.br_op));
    }

    let is_taken = taken(instr, rs1_value, rs2_value);
    let next_pc = if is_taken {
        // Target is always PC-relative (branches, JAL) or
        // register-relative (JALR): the shared ALU operand machinery
        // already encodes which, via alu_s1_pc / alu_s1_rs1.
        let op1 = alu::alu_operand1(instr, rs1_value);
        let op2 = alu::alu_operand2(instr, rs2_value);
        op1.wrapping_add(op2)
    } else {
        instr.pc.wrapping_add(4)
    };

    services.set_pc(next_pc);
    services.release_fetch_stall();

    Ok(instr.pc.wrapping_add(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode::decode;

    struct RecordingServices {
        pc: Option<u32>,
        stall_released: bool,
    }
    impl CoreServices for RecordingServices {
        fn dmem_read(&mut self, _addr: u32, _size: u8) -> u32 {
            0
        }
        fn dmem_write(&mut self, _addr: u32, _size: u8, _data: u32) {}
        fn set_pc(&mut self, pc: u32) {
            self.pc = Some(pc);
        }
        fn get_csr(&mut self, _addr: u32) -> Result<u32, SimError> {
            Ok(0)
        }
        fn set_csr(&mut self, _addr: u32, _val: u32) -> Result<(), SimError> {
            Ok(())
        }
        fn release_fetch_stall(&mut self) {
            self.stall_released = true;
        }
    }

    #[test]
    fn beq_taken_redirects_to_branch_target() {
        // beq x1, x2, +8
        let w = (0u32 << 25) | (2u32 << 20) | (1u32 << 15) | (0 << 12) | (4u32 << 8) | 0x63;
        let instr = decode(w, 100, 0);
        let mut svc = RecordingServices {
            pc: None,
            stall_released: false,
        };
        let _ = do_execute(&instr, 5, 5, &mut svc);
        assert_eq!(svc.pc, Some(108));
        assert!(svc.stall_released);
    }

    #[test]
    fn beq_not_taken_falls_through() {
        let w = (0u32 << 25) | (2u32 << 20) | (1u32 << 15) | (0 << 12) | (4u32 << 8) | 0x63;
        let instr = decode(w, 100, 0);
        let mut svc = RecordingServices {
            pc: None,
            stall_released: false,
        };
        let _ = do_execute(&instr, 1, 2, &mut svc);
        assert_eq!(svc.pc, Some(104));
        assert!(svc.stall_released);
    }

    #[test]
    fn jalr_targets_unmasked_alu_result() {
        // jalr x1, x2, 1
        let w = ((1u32) << 20) | (2u32 << 15) | (0 << 12) | (1 << 7) | 0x67;
        let instr = decode(w, 0, 0);
        let mut svc = RecordingServices {
            pc: None,
            stall_released: false,
        };
        let link = do_execute(&instr, 0x2000, 0, &mut svc).unwrap();
        assert_eq!(svc.pc, Some(0x2001));
        assert_eq!(link, 4);
    }
}
