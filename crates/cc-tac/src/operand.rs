//! A TAC operand is a tagged union over {none, immediate(int), label(id),
//! temp(id), var(id), symbolic-function-name-position}. On disk the tag is
//! a `u8` followed by a 4-byte payload reinterpreted per tag, matching
//! spec.md §6's `{ u8 tag; union {...} }` layout exactly.

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandTag {
    None = 0,
    Immediate,
    Label,
    Temp,
    Var,
    StringPos,
    /// Float immediates don't fit the spec's `i32 immediate` union arm, so
    /// they get their own tag carrying the bit pattern of an `f32`.
    FloatImmediate,
}

impl OperandTag {
    fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => OperandTag::None,
            1 => OperandTag::Immediate,
            2 => OperandTag::Label,
            3 => OperandTag::Temp,
            4 => OperandTag::Var,
            5 => OperandTag::StringPos,
            6 => OperandTag::FloatImmediate,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operand {
    pub tag: OperandTag,
    raw: u32,
}

impl Operand {
    pub const NONE: Operand = Operand { tag: OperandTag::None, raw: 0 };

    pub fn immediate(value: i32) -> Self {
        Operand { tag: OperandTag::Immediate, raw: value as u32 }
    }

    pub fn float_immediate(value: f32) -> Self {
        Operand { tag: OperandTag::FloatImmediate, raw: value.to_bits() }
    }

    pub fn label(id: u16) -> Self {
        Operand { tag: OperandTag::Label, raw: id as u32 }
    }

    pub fn temp(id: u16) -> Self {
        Operand { tag: OperandTag::Temp, raw: id as u32 }
    }

    pub fn var(id: u16) -> Self {
        Operand { tag: OperandTag::Var, raw: id as u32 }
    }

    pub fn string_pos(pos: u32) -> Self {
        Operand { tag: OperandTag::StringPos, raw: pos }
    }

    pub fn is_none(self) -> bool {
        self.tag == OperandTag::None
    }

    pub fn as_immediate(self) -> Option<i32> {
        (self.tag == OperandTag::Immediate).then_some(self.raw as i32)
    }

    pub fn as_float_immediate(self) -> Option<f32> {
        (self.tag == OperandTag::FloatImmediate).then_some(f32::from_bits(self.raw))
    }

    pub fn as_label(self) -> Option<u16> {
        (self.tag == OperandTag::Label).then_some(self.raw as u16)
    }

    pub fn as_temp(self) -> Option<u16> {
        (self.tag == OperandTag::Temp).then_some(self.raw as u16)
    }

    pub fn as_var(self) -> Option<u16> {
        (self.tag == OperandTag::Var).then_some(self.raw as u16)
    }

    pub fn as_string_pos(self) -> Option<u32> {
        (self.tag == OperandTag::StringPos).then_some(self.raw)
    }

    pub(crate) fn to_bytes(self) -> [u8; 5] {
        let mut out = [0u8; 5];
        out[0] = self.tag as u8;
        out[1..5].copy_from_slice(&self.raw.to_le_bytes());
        out
    }

    pub(crate) fn from_bytes(bytes: [u8; 5]) -> Option<Self> {
        let tag = OperandTag::from_u8(bytes[0])?;
        let raw = u32::from_le_bytes(bytes[1..5].try_into().unwrap());
        Some(Operand { tag, raw })
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::NONE
    }
}
