//! The token vocabulary shared by the lexer, TSTORE, and the parser.

/// Every terminal the parser's grammar (spec.md §4.G) can see, plus the
/// literal/identifier/EOF kinds the lexer produces. Encoded as `u16` in the
/// on-disk token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    Eof = 0,
    Identifier,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // Keywords
    KwVoid,
    KwChar,
    KwShort,
    KwInt,
    KwLong,
    KwFloat,
    KwDouble,
    KwSigned,
    KwUnsigned,
    KwBool,
    KwComplex,
    KwImaginary,
    KwStruct,
    KwUnion,
    KwEnum,
    KwTypedef,
    KwExtern,
    KwStatic,
    KwAuto,
    KwRegister,
    KwInline,
    KwConst,
    KwRestrict,
    KwVolatile,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwDo,
    KwReturn,
    KwBreak,
    KwContinue,
    KwGoto,
    KwSwitch,
    KwCase,
    KwDefault,
    KwSizeof,

    // Punctuators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Bang,
    Tilde,
    Star,
    Amp,
    Slash,
    Percent,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    NotEq,
    AmpAmp,
    PipePipe,
    Pipe,
    Caret,
    Shl,
    Shr,
    Question,
    Colon,
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    Ellipsis,
}

impl TokenKind {
    pub fn from_u16(raw: u16) -> Option<Self> {
        const TABLE: &[TokenKind] = &[
            TokenKind::Eof,
            TokenKind::Identifier,
            TokenKind::IntLiteral,
            TokenKind::FloatLiteral,
            TokenKind::CharLiteral,
            TokenKind::StringLiteral,
            TokenKind::KwVoid,
            TokenKind::KwChar,
            TokenKind::KwShort,
            TokenKind::KwInt,
            TokenKind::KwLong,
            TokenKind::KwFloat,
            TokenKind::KwDouble,
            TokenKind::KwSigned,
            TokenKind::KwUnsigned,
            TokenKind::KwBool,
            TokenKind::KwComplex,
            TokenKind::KwImaginary,
            TokenKind::KwStruct,
            TokenKind::KwUnion,
            TokenKind::KwEnum,
            TokenKind::KwTypedef,
            TokenKind::KwExtern,
            TokenKind::KwStatic,
            TokenKind::KwAuto,
            TokenKind::KwRegister,
            TokenKind::KwInline,
            TokenKind::KwConst,
            TokenKind::KwRestrict,
            TokenKind::KwVolatile,
            TokenKind::KwIf,
            TokenKind::KwElse,
            TokenKind::KwWhile,
            TokenKind::KwFor,
            TokenKind::KwDo,
            TokenKind::KwReturn,
            TokenKind::KwBreak,
            TokenKind::KwContinue,
            TokenKind::KwGoto,
            TokenKind::KwSwitch,
            TokenKind::KwCase,
            TokenKind::KwDefault,
            TokenKind::KwSizeof,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Arrow,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Bang,
            TokenKind::Tilde,
            TokenKind::Star,
            TokenKind::Amp,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Shl,
            TokenKind::Shr,
            TokenKind::Question,
            TokenKind::Colon,
            TokenKind::Assign,
            TokenKind::PlusEq,
            TokenKind::MinusEq,
            TokenKind::StarEq,
            TokenKind::SlashEq,
            TokenKind::PercentEq,
            TokenKind::Ellipsis,
        ];
        TABLE.get(raw as usize).copied()
    }

    pub fn keyword_from_str(word: &str) -> Option<Self> {
        use TokenKind::*;
        Some(match word {
            "void" => KwVoid,
            "char" => KwChar,
            "short" => KwShort,
            "int" => KwInt,
            "long" => KwLong,
            "float" => KwFloat,
            "double" => KwDouble,
            "signed" => KwSigned,
            "unsigned" => KwUnsigned,
            "_Bool" => KwBool,
            "_Complex" => KwComplex,
            "_Imaginary" => KwImaginary,
            "struct" => KwStruct,
            "union" => KwUnion,
            "enum" => KwEnum,
            "typedef" => KwTypedef,
            "extern" => KwExtern,
            "static" => KwStatic,
            "auto" => KwAuto,
            "register" => KwRegister,
            "inline" => KwInline,
            "const" => KwConst,
            "restrict" => KwRestrict,
            "volatile" => KwVolatile,
            "if" => KwIf,
            "else" => KwElse,
            "while" => KwWhile,
            "for" => KwFor,
            "do" => KwDo,
            "return" => KwReturn,
            "break" => KwBreak,
            "continue" => KwContinue,
            "goto" => KwGoto,
            "switch" => KwSwitch,
            "case" => KwCase,
            "default" => KwDefault,
            "sizeof" => KwSizeof,
            _ => return None,
        })
    }

    pub fn is_type_specifier(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            KwVoid
                | KwChar
                | KwShort
                | KwInt
                | KwLong
                | KwFloat
                | KwDouble
                | KwSigned
                | KwUnsigned
                | KwBool
                | KwComplex
                | KwImaginary
                | KwStruct
                | KwUnion
                | KwEnum
        )
    }

    pub fn is_declaration_specifier(self) -> bool {
        use TokenKind::*;
        self.is_type_specifier()
            || matches!(
                self,
                KwTypedef | KwExtern | KwStatic | KwAuto | KwRegister | KwInline | KwConst | KwRestrict | KwVolatile
            )
    }
}
