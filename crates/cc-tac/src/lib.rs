//! cc-tac — components J and K: the TAC instruction stream and the
//! register/variable-space interpreter that executes it. Independent of
//! `cc-store`/`cc-hb` by design — TAC generation is a separate pipeline
//! stage (spec.md §1's explicit out-of-scope boundary) and this crate only
//! needs to read back whatever fixed-size instructions that stage wrote.

pub mod error;
pub mod instruction;
pub mod labels;
pub mod opcode;
pub mod operand;
pub mod stream;
pub mod vm;

pub use error::{LoadError, VmFault};
pub use instruction::{Instruction, RECORD_LEN};
pub use labels::LabelTable;
pub use opcode::Opcode;
pub use operand::{Operand, OperandTag};
pub use stream::{StreamError, TacStream};
pub use vm::{State, Value, Vm, VmConfig};
