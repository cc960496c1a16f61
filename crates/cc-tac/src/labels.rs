//! Label table: built once per `load`, by scanning every instruction for
//! `LABEL` opcodes and recording (label id -> instruction address) in a
//! 256-bucket chained hash, per spec.md §4.J. A `LABEL` instruction whose
//! operands don't decode to a label id is rejected outright — no
//! position-derived fallback (see REDESIGN FLAGS in spec.md §9).

use crate::error::LoadError;
use crate::instruction::Instruction;
use crate::opcode::Opcode;

const BUCKET_COUNT: usize = 256;

pub struct LabelTable {
    buckets: Vec<Vec<(u16, u32)>>,
}

impl LabelTable {
    fn bucket_index(id: u16) -> usize {
        (id as usize) % BUCKET_COUNT
    }

    pub fn build(code: &[Instruction]) -> Result<Self, LoadError> {
        let mut buckets: Vec<Vec<(u16, u32)>> = vec![Vec::new(); BUCKET_COUNT];
        for (addr, instr) in code.iter().enumerate() {
            if instr.opcode != Opcode::Label {
                continue;
            }
            let id = instr.label_id().ok_or(LoadError::MalformedLabel(addr as u32))?;
            let bucket = &mut buckets[Self::bucket_index(id)];
            if !bucket.iter().any(|&(existing, _)| existing == id) {
                bucket.push((id, addr as u32));
            }
        }
        Ok(Self { buckets })
    }

    pub fn resolve(&self, id: u16) -> Option<u32> {
        self.buckets[Self::bucket_index(id)].iter().find(|&&(existing, _)| existing == id).map(|&(_, addr)| addr)
    }
}
