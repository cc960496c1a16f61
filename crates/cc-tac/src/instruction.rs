//! The fixed-size TAC instruction record: `{ u8 opcode; u8 flags; operand
//! result; operand operand1; operand operand2; }`, 1 + 1 + 5*3 = 17 bytes,
//! matching spec.md §6's on-disk layout exactly.

use crate::opcode::Opcode;
use crate::operand::Operand;

pub const RECORD_LEN: u64 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub flags: u8,
    pub result: Operand,
    pub operand1: Operand,
    pub operand2: Operand,
}

impl Instruction {
    pub fn new(opcode: Opcode, result: Operand, operand1: Operand, operand2: Operand) -> Self {
        Self { opcode, flags: 0, result, operand1, operand2 }
    }

    pub fn label(id: u16) -> Self {
        Self::new(Opcode::Label, Operand::label(id), Operand::NONE, Operand::NONE)
    }

    pub(crate) fn to_bytes(self) -> [u8; RECORD_LEN as usize] {
        let mut out = [0u8; RECORD_LEN as usize];
        out[0] = self.opcode as u8;
        out[1] = self.flags;
        out[2..7].copy_from_slice(&self.result.to_bytes());
        out[7..12].copy_from_slice(&self.operand1.to_bytes());
        out[12..17].copy_from_slice(&self.operand2.to_bytes());
        out
    }

    pub(crate) fn from_bytes(bytes: [u8; RECORD_LEN as usize]) -> Option<Self> {
        let opcode = Opcode::from_u8(bytes[0])?;
        let flags = bytes[1];
        let result = Operand::from_bytes(bytes[2..7].try_into().unwrap())?;
        let operand1 = Operand::from_bytes(bytes[7..12].try_into().unwrap())?;
        let operand2 = Operand::from_bytes(bytes[12..17].try_into().unwrap())?;
        Some(Self { opcode, flags, result, operand1, operand2 })
    }

    /// The label id this instruction's result/operand1 is tagged with, per
    /// spec.md §4.J's resolution order: result first, then operand1. No
    /// position-derived fallback — a `LABEL` instruction with neither is
    /// malformed and rejected at load time (see REDESIGN FLAGS).
    pub fn label_id(self) -> Option<u16> {
        self.result.as_label().or_else(|| self.operand1.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let instr = Instruction::new(Opcode::Add, Operand::temp(2), Operand::temp(0), Operand::temp(1));
        let bytes = instr.to_bytes();
        assert_eq!(Instruction::from_bytes(bytes), Some(instr));
    }

    #[test]
    fn label_id_prefers_result_over_operand1() {
        let instr = Instruction::new(Opcode::Label, Operand::label(7), Operand::label(99), Operand::NONE);
        assert_eq!(instr.label_id(), Some(7));
    }

    #[test]
    fn label_id_falls_back_to_operand1() {
        let instr = Instruction::new(Opcode::Label, Operand::NONE, Operand::label(3), Operand::NONE);
        assert_eq!(instr.label_id(), Some(3));
    }

    #[test]
    fn label_id_absent_when_neither_operand_is_a_label() {
        let instr = Instruction::new(Opcode::Label, Operand::NONE, Operand::NONE, Operand::NONE);
        assert_eq!(instr.label_id(), None);
    }

    #[test]
    fn unknown_opcode_byte_fails_to_decode() {
        let mut bytes = Instruction::new(Opcode::Nop, Operand::NONE, Operand::NONE, Operand::NONE).to_bytes();
        bytes[0] = 0xFF;
        assert_eq!(Instruction::from_bytes(bytes), None);
    }
}
