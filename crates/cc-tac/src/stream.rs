//! Component J — the TAC instruction stream.
//!
//! An append-only file pool of fixed-size instruction records, the same
//! `init/open/close/len/append/get` shape `cc-store`'s `TStore` uses for
//! tokens. Reading the whole stream back (`read_all`) is how `Vm::load`
//! gets the `Vec<Instruction>` it copies into engine memory.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::instruction::{Instruction, RECORD_LEN};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: u32, len: u32 },

    #[error("corrupt TAC record at index {0}")]
    Corrupt(u32),

    #[error("store is read-only")]
    ReadOnly,
}

pub struct TacStream {
    file: File,
    read_only: bool,
    len: u32,
}

impl TacStream {
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        Ok(Self { file, read_only: false, len: 0 })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let byte_len = file.seek(SeekFrom::End(0))?;
        Ok(Self { file, read_only: false, len: (byte_len / RECORD_LEN) as u32 })
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let mut file = OpenOptions::new().read(true).open(path)?;
        let byte_len = file.seek(SeekFrom::End(0))?;
        Ok(Self { file, read_only: true, len: (byte_len / RECORD_LEN) as u32 })
    }

    pub fn close(self) -> Result<(), StreamError> {
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn append(&mut self, instr: Instruction) -> Result<u32, StreamError> {
        if self.read_only {
            return Err(StreamError::ReadOnly);
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&instr.to_bytes())?;
        let index = self.len;
        self.len += 1;
        Ok(index)
    }

    pub fn get(&mut self, index: u32) -> Result<Instruction, StreamError> {
        if index >= self.len {
            return Err(StreamError::IndexOutOfRange { index, len: self.len });
        }
        self.file.seek(SeekFrom::Start(index as u64 * RECORD_LEN))?;
        let mut buf = [0u8; RECORD_LEN as usize];
        self.file.read_exact(&mut buf)?;
        Instruction::from_bytes(buf).ok_or(StreamError::Corrupt(index))
    }

    /// Read the entire stream into memory, in order. This is what feeds
    /// `Vm::load`.
    pub fn read_all(&mut self) -> Result<Vec<Instruction>, StreamError> {
        let mut out = Vec::with_capacity(self.len as usize);
        for i in 0..self.len {
            out.push(self.get(i)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;
    use crate::operand::Operand;

    #[test]
    fn append_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tac");
        let mut stream = TacStream::init(&path).unwrap();
        let instr = Instruction::new(Opcode::Assign, Operand::temp(0), Operand::immediate(5), Operand::NONE);
        let idx = stream.append(instr).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(stream.get(0).unwrap(), instr);
    }

    #[test]
    fn append_indices_are_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tac");
        let mut stream = TacStream::init(&path).unwrap();
        let nop = Instruction::new(Opcode::Nop, Operand::NONE, Operand::NONE, Operand::NONE);
        let a = stream.append(nop).unwrap();
        let b = stream.append(nop).unwrap();
        let c = stream.append(nop).unwrap();
        assert_eq!([a, b, c], [0, 1, 2]);
    }

    #[test]
    fn get_out_of_range_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tac");
        let mut stream = TacStream::init(&path).unwrap();
        assert!(matches!(stream.get(0), Err(StreamError::IndexOutOfRange { .. })));
    }

    #[test]
    fn read_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tac");
        let mut stream = TacStream::init(&path).unwrap();
        for i in 0..5 {
            stream.append(Instruction::new(Opcode::Assign, Operand::temp(i), Operand::immediate(i as i32), Operand::NONE)).unwrap();
        }
        let all = stream.read_all().unwrap();
        assert_eq!(all.len(), 5);
        for (i, instr) in all.iter().enumerate() {
            assert_eq!(instr.result.as_temp(), Some(i as u16));
        }
    }
}
