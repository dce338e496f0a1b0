//! CSR (system) functional unit semantics.
//!
//! Reads the addressed CSR's current value, computes the new value via
//! the shared ALU operand machinery with the *old* CSR value forced as
//! operand 2, conditionally writes it back, and returns the *old* value
//! as the instruction's result (the architectural "read old, write new"
//! contract every CSR instruction shares). `ebreak` is handled upstream
//! by the core's exit check and never reaches this routine.
//!
//! Grounded in `examples/original_source/project_3/src/FU.cpp`'s CSR arm
//! of `execute` and `examples/willmccallion-rvsim/.../core/arch/csr.rs`
//! for the read-old/write-new convention.

use super::alu;
use super::CoreServices;
use crate::common::error::SimError;
use crate::isa::instr::{AluOp, Instr};

/// Executes a CSR instruction, returning the CSR's value *before* the
/// write (the value written back to `rd`).
pub fn do_execute(
    instr: &Instr,
    rs1_value: u32,
    _rs2_value: u32,
    services: &mut dyn CoreServices,
) -> Result<u32, SimError> {
    if instr.exe_flags.is_exit {
        // The program-termination encoding carries no CSR address;
        // it completes trivially and the core's commit stage reads
        // `is_exit` directly off the instruction.
        return Ok(0);
    }

    let csr_addr = instr.imm as u32;
    let old = services.get_csr(csr_addr)?;

    let op1 = alu::alu_operand1(instr, rs1_value);
    // CSRRW(I) discards the old value entirely rather than combining
    // with it; every other form folds the old value in as operand 2.
    let op2 = if instr.alu_op == AluOp::Add && !instr.exe_flags.use_rs2 {
        0
    } else {
        old
    };
    let new = alu::apply(instr.alu_op, op1, op2)?;

    services.set_csr(csr_addr, new)?;

    Ok(old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode::decode;

    struct FakeCsr {
        value: u32,
    }
    impl CoreServices for FakeCsr {
        fn dmem_read(&mut self, _addr: u32, _size: u8) -> u32 {
            0
        }
        fn dmem_write(&mut self, _addr: u32, _size: u8, _data: u32) {}
        fn set_pc(&mut self, _pc: u32) {}
        fn get_csr(&mut self, _addr: u32) -> Result<u32, SimError> {
            Ok(self.value)
        }
        fn set_csr(&mut self, _addr: u32, val: u32) -> Result<(), SimError> {
            self.value = val;
            Ok(())
        }
        fn release_fetch_stall(&mut self) {}
    }

    fn csrrw(rd_: u8, rs1_: u8, csr: u16) -> u32 {
        ((csr as u32) << 20) | ((rs1_ as u32) << 15) | (1 << 12) | ((rd_ as u32) << 7) | 0x73
    }
    fn csrrs(rd_: u8, rs1_: u8, csr: u16) -> u32 {
        ((csr as u32) << 20) | ((rs1_ as u32) << 15) | (2 << 12) | ((rd_ as u32) << 7) | 0x73
    }
    fn csrrci(rd_: u8, imm5: u8, csr: u16) -> u32 {
        ((csr as u32) << 20) | ((imm5 as u32) << 15) | (7 << 12) | ((rd_ as u32) << 7) | 0x73
    }

    #[test]
    fn csrrw_discards_old_value_and_returns_it() {
        let instr = decode(csrrw(1, 2, 0x300), 0, 0);
        let mut csr = FakeCsr { value: 0xAAAA };
        let old = do_execute(&instr, 0x5555, 0, &mut csr).unwrap();
        assert_eq!(old, 0xAAAA);
        assert_eq!(csr.value, 0x5555);
    }

    #[test]
    fn csrrs_ors_rs1_into_old_value() {
        let instr = decode(csrrs(1, 2, 0x300), 0, 0);
        let mut csr = FakeCsr { value: 0b0001 };
        let old = do_execute(&instr, 0b0010, 0, &mut csr).unwrap();
        assert_eq!(old, 0b0001);
        assert_eq!(csr.value, 0b0011);
    }

    #[test]
    fn csrrci_clears_bits_named_by_immediate() {
        let instr = decode(csrrci(1, 0b0011, 0x300), 0, 0);
        let mut csr = FakeCsr { value: 0b1111 };
        let old = do_execute(&instr, 0, 0, &mut csr).unwrap();
        assert_eq!(old, 0b1111);
        assert_eq!(csr.value, 0b1100);
    }
}
