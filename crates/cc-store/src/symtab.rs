//! Component E — the symbol table (SYMTAB).
//!
//! A fixed-size record per symbol, linked into scope chains through
//! `parent`/`child`/`sibling`/`next` fields rather than an in-memory tree, so
//! the whole table can be paged through `cc-hb` the same way ASTORE is.
//! Lookup walks `next` within a scope (most-recently-declared first) and
//! `parent` outward across scopes, matching the flat scan-by-`scope_depth`
//! resolution algorithm spec.md §4.G calls for.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bitflags::bitflags;

use crate::astore::AstId;
use crate::error::StoreError;
use crate::sstore::StringPos;
use crate::tstore::TokenId;

pub const RECORD_LEN: u64 = 48;

/// 1-based index into SYMTAB. `0` is "not found" / absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum SymbolKind {
    Unknown = 0,
    Variable,
    Parameter,
    Function,
    Typedef,
    Label,
    Enumerator,
    Struct,
    Union,
    Enum,
    Constant,
}

impl SymbolKind {
    fn from_u16(raw: u16) -> Option<Self> {
        const TABLE: &[SymbolKind] = &[
            SymbolKind::Unknown,
            SymbolKind::Variable,
            SymbolKind::Parameter,
            SymbolKind::Function,
            SymbolKind::Typedef,
            SymbolKind::Label,
            SymbolKind::Enumerator,
            SymbolKind::Struct,
            SymbolKind::Union,
            SymbolKind::Enum,
            SymbolKind::Constant,
        ];
        TABLE.get(raw as usize).copied()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SymbolFlags: u16 {
        const INLINE          = 0b0000_0001;
        const RESTRICT         = 0b0000_0010;
        const VARIABLE_LENGTH   = 0b0000_0100;
        const FLEXIBLE_ARRAY    = 0b0000_1000;
        const COMPLEX           = 0b0001_0000;
        const IMAGINARY         = 0b0010_0000;
        const VARIADIC          = 0b0100_0000;
        const UNIVERSAL_CHAR    = 0b1000_0000;
        const DESIGNATED_INIT   = 0b0001_0000_0000;
        const COMPOUND_LITERAL  = 0b0010_0000_0000;
        const MIXED_DECL        = 0b0100_0000_0000;
        const CONST             = 0b1000_0000_0000;
        const VOLATILE          = 0b0001_0000_0000_0000;
    }
}

/// Kind-specific payload that doesn't fit the shared fields: a VLA's
/// size-expression id and dimension count, an aggregate's field count and
/// first-field id, or a function's parameter count and first-parameter id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolExtra {
    None,
    VariableLengthArray { size_expr: AstId, dimensions: u32 },
    Aggregate { field_count: u32, first_field: SymbolId },
    Function { param_count: u32, first_param: SymbolId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
    pub name: StringPos,
    pub value: StringPos,
    pub parent: SymbolId,
    pub next: SymbolId,
    pub prev: SymbolId,
    pub child: SymbolId,
    pub sibling: SymbolId,
    pub decl_token: TokenId,
    pub scope_depth: u32,
    pub type_node: AstId,
    pub extra: SymbolExtra,
}

impl Default for Symbol {
    fn default() -> Self {
        Self {
            kind: SymbolKind::Unknown,
            flags: SymbolFlags::empty(),
            name: StringPos::EMPTY,
            value: StringPos::EMPTY,
            parent: SymbolId::NONE,
            next: SymbolId::NONE,
            prev: SymbolId::NONE,
            child: SymbolId::NONE,
            sibling: SymbolId::NONE,
            decl_token: TokenId::INVALID,
            scope_depth: 0,
            type_node: AstId::NONE,
            extra: SymbolExtra::None,
        }
    }
}

impl Symbol {
    fn to_bytes(self) -> [u8; RECORD_LEN as usize] {
        let (extra_tag, extra_a, extra_b): (u32, u32, u32) = match self.extra {
            SymbolExtra::None => (0, 0, 0),
            SymbolExtra::VariableLengthArray { size_expr, dimensions } => (1, size_expr.0, dimensions),
            SymbolExtra::Aggregate { field_count, first_field } => (2, field_count, first_field.0),
            SymbolExtra::Function { param_count, first_param } => (3, param_count, first_param.0),
        };
        let mut buf = [0u8; RECORD_LEN as usize];
        buf[0..2].copy_from_slice(&(self.kind as u16).to_le_bytes());
        buf[2..4].copy_from_slice(&self.flags.bits().to_le_bytes());
        buf[4..6].copy_from_slice(&self.name.0.to_le_bytes());
        buf[6..8].copy_from_slice(&self.value.0.to_le_bytes());
        buf[8..12].copy_from_slice(&self.parent.0.to_le_bytes());
        buf[12..16].copy_from_slice(&self.next.0.to_le_bytes());
        buf[16..20].copy_from_slice(&self.prev.0.to_le_bytes());
        buf[20..24].copy_from_slice(&self.child.0.to_le_bytes());
        buf[24..28].copy_from_slice(&self.sibling.0.to_le_bytes());
        buf[28..32].copy_from_slice(&self.decl_token.0.to_le_bytes());
        buf[32..36].copy_from_slice(&self.scope_depth.to_le_bytes());
        buf[36..40].copy_from_slice(&self.type_node.0.to_le_bytes());
        buf[40..44].copy_from_slice(&extra_a.to_le_bytes());
        buf[44..48].copy_from_slice(&extra_b.to_le_bytes());
        // extra_tag folds into the high bits of scope_depth's neighbor slot
        // would waste a field; instead stash it in the top byte of `next`,
        // which never needs more than 24 bits of id space here.
        buf[15] = extra_tag as u8;
        buf
    }

    fn from_bytes(buf: [u8; RECORD_LEN as usize]) -> Result<Self, StoreError> {
        let kind_raw = u16::from_le_bytes([buf[0], buf[1]]);
        let kind = SymbolKind::from_u16(kind_raw).ok_or_else(|| StoreError::Corrupt(format!("unknown symbol kind {kind_raw}")))?;
        let mut next_bytes = [buf[12], buf[13], buf[14], buf[15]];
        let extra_tag = next_bytes[3];
        next_bytes[3] = 0;
        let extra_a = u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]);
        let extra_b = u32::from_le_bytes([buf[44], buf[45], buf[46], buf[47]]);
        let extra = match extra_tag {
            1 => SymbolExtra::VariableLengthArray { size_expr: AstId(extra_a), dimensions: extra_b },
            2 => SymbolExtra::Aggregate { field_count: extra_a, first_field: SymbolId(extra_b) },
            3 => SymbolExtra::Function { param_count: extra_a, first_param: SymbolId(extra_b) },
            _ => SymbolExtra::None,
        };
        Ok(Symbol {
            kind,
            flags: SymbolFlags::from_bits_truncate(u16::from_le_bytes([buf[2], buf[3]])),
            name: StringPos(u16::from_le_bytes([buf[4], buf[5]])),
            value: StringPos(u16::from_le_bytes([buf[6], buf[7]])),
            parent: SymbolId(u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]])),
            next: SymbolId(u32::from_le_bytes(next_bytes)),
            prev: SymbolId(u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]])),
            child: SymbolId(u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]])),
            sibling: SymbolId(u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]])),
            decl_token: TokenId(u32::from_le_bytes([buf[28], buf[29], buf[30], buf[31]])),
            scope_depth: u32::from_le_bytes([buf[32], buf[33], buf[34], buf[35]]),
            type_node: AstId(u32::from_le_bytes([buf[36], buf[37], buf[38], buf[39]])),
            extra,
        })
    }
}

pub struct SymTab {
    file: File,
    read_only: bool,
    len: u32,
}

impl SymTab {
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        Ok(Self { file, read_only: false, len: 0 })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let byte_len = file.seek(SeekFrom::End(0))?;
        Ok(Self { file, read_only: true, len: (byte_len / RECORD_LEN) as u32 })
    }

    pub fn close(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn new_symbol(&mut self, symbol: Symbol) -> Result<SymbolId, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let id = self.len + 1;
        self.file.seek(SeekFrom::Start((id as u64 - 1) * RECORD_LEN))?;
        self.file.write_all(&symbol.to_bytes())?;
        self.len = id;
        Ok(SymbolId(id))
    }

    pub fn get(&mut self, id: SymbolId) -> Result<Symbol, StoreError> {
        if id.0 == 0 || id.0 > self.len {
            return Ok(Symbol::default());
        }
        self.file.seek(SeekFrom::Start((id.0 as u64 - 1) * RECORD_LEN))?;
        let mut buf = [0u8; RECORD_LEN as usize];
        self.file.read_exact(&mut buf)?;
        Symbol::from_bytes(buf)
    }

    pub fn update(&mut self, id: SymbolId, symbol: Symbol) -> Result<(), StoreError> {
        if id.0 == 0 || id.0 > self.len {
            return Err(StoreError::IndexOutOfRange { index: id.0, len: self.len });
        }
        self.file.seek(SeekFrom::Start((id.0 as u64 - 1) * RECORD_LEN))?;
        self.file.write_all(&symbol.to_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trips_with_extra_payload() {
        let symbol = Symbol {
            kind: SymbolKind::Function,
            flags: SymbolFlags::INLINE | SymbolFlags::VARIADIC,
            name: StringPos(10),
            scope_depth: 0,
            extra: SymbolExtra::Function { param_count: 3, first_param: SymbolId(5) },
            ..Symbol::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let mut store = SymTab::init(dir.path().join("s.symtab")).unwrap();
        let id = store.new_symbol(symbol).unwrap();
        assert_eq!(store.get(id).unwrap(), symbol);
    }

    #[test]
    fn not_found_is_the_zero_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SymTab::init(dir.path().join("s.symtab")).unwrap();
        assert!(SymbolId::NONE.is_none());
        assert_eq!(store.get(SymbolId::NONE).unwrap(), Symbol::default());
    }

    #[test]
    fn chain_links_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SymTab::init(dir.path().join("s.symtab")).unwrap();
        let a = store.new_symbol(Symbol { kind: SymbolKind::Variable, name: StringPos(1), scope_depth: 1, ..Symbol::default() }).unwrap();
        let b = store
            .new_symbol(Symbol { kind: SymbolKind::Variable, name: StringPos(2), scope_depth: 1, next: a, ..Symbol::default() })
            .unwrap();
        assert_eq!(store.get(b).unwrap().next, a);
    }
}
