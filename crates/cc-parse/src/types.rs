//! Declaration-specifier and declarator grammar: the type-specifier state
//! machine (which combinations of `int`/`long`/`signed`/... are legal) and
//! the pointer/array/identifier declarator chain that turns a base type
//! into the type of one declared name.

use cc_store::{AstId, AstNode, StorageClass, SymbolId, TypeBase, TypeQualifiers};

use crate::{ParseError, Parser};
use cc_store::TokenKind;

#[derive(Clone, Copy, Debug, Default)]
pub struct Specifiers {
    pub storage_class: StorageClass,
    pub qualifiers: TypeQualifiers,
    pub base: Option<TypeBase>,
    pub long_count: u32,
    pub is_signed: Option<bool>,
    pub tag_symbol: SymbolId,
    pub inline: bool,
}

impl<'a> Parser<'a> {
    /// Parse the declaration-specifier list (`static const unsigned long
    /// int`, `struct Point`, a typedef name, ...) that precedes a
    /// declarator. Stops at the first token that isn't a specifier.
    pub(crate) fn parse_specifiers(&mut self) -> Result<Specifiers, ParseError> {
        let mut spec = Specifiers::default();
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::KwTypedef => {
                    spec.storage_class = StorageClass::Typedef;
                    self.advance()?;
                }
                TokenKind::KwExtern => {
                    spec.storage_class = StorageClass::Extern;
                    self.advance()?;
                }
                TokenKind::KwStatic => {
                    spec.storage_class = StorageClass::Static;
                    self.advance()?;
                }
                TokenKind::KwAuto => {
                    spec.storage_class = StorageClass::Auto;
                    self.advance()?;
                }
                TokenKind::KwRegister => {
                    spec.storage_class = StorageClass::Register;
                    self.advance()?;
                }
                TokenKind::KwInline => {
                    spec.inline = true;
                    self.advance()?;
                }
                TokenKind::KwConst => {
                    spec.qualifiers.insert(TypeQualifiers::CONST);
                    self.advance()?;
                }
                TokenKind::KwVolatile => {
                    spec.qualifiers.insert(TypeQualifiers::VOLATILE);
                    self.advance()?;
                }
                TokenKind::KwRestrict => {
                    spec.qualifiers.insert(TypeQualifiers::RESTRICT);
                    self.advance()?;
                }
                TokenKind::KwSigned => {
                    spec.is_signed = Some(true);
                    self.advance()?;
                }
                TokenKind::KwUnsigned => {
                    spec.is_signed = Some(false);
                    self.advance()?;
                }
                TokenKind::KwLong => {
                    spec.long_count += 1;
                    self.advance()?;
                }
                TokenKind::KwVoid => {
                    spec.base = Some(TypeBase::Void);
                    self.advance()?;
                }
                TokenKind::KwChar => {
                    spec.base = Some(TypeBase::Char);
                    self.advance()?;
                }
                TokenKind::KwShort => {
                    spec.base = Some(TypeBase::Short);
                    self.advance()?;
                }
                TokenKind::KwInt => {
                    spec.base = Some(TypeBase::Int);
                    self.advance()?;
                }
                TokenKind::KwFloat => {
                    spec.base = Some(TypeBase::Float);
                    self.advance()?;
                }
                TokenKind::KwDouble => {
                    spec.base = Some(TypeBase::Double);
                    self.advance()?;
                }
                TokenKind::KwBool => {
                    spec.base = Some(TypeBase::Bool);
                    self.advance()?;
                }
                TokenKind::KwComplex | TokenKind::KwImaginary => {
                    // Recognized but not modeled beyond the qualifier bits;
                    // _Complex/_Imaginary arithmetic is out of scope.
                    self.advance()?;
                }
                TokenKind::KwStruct | TokenKind::KwUnion | TokenKind::KwEnum => {
                    let (base, tag) = self.parse_tag_specifier()?;
                    spec.base = Some(base);
                    spec.tag_symbol = tag;
                }
                TokenKind::Identifier if spec.base.is_none() && self.is_typedef_name(tok.source_pos) => {
                    spec.base = Some(TypeBase::Named);
                    spec.tag_symbol = self.scopes.resolve(tok.source_pos).unwrap_or(SymbolId::NONE);
                    self.advance()?;
                }
                _ => break,
            }
        }
        if spec.base.is_none() {
            if spec.long_count > 0 || spec.is_signed.is_some() {
                spec.base = Some(TypeBase::Int);
            } else {
                self.error("expected a type specifier");
                spec.base = Some(TypeBase::Int);
            }
        }
        if spec.long_count >= 1 && spec.base == Some(TypeBase::Int) {
            spec.base = Some(if spec.long_count >= 2 { TypeBase::LongLong } else { TypeBase::Long });
        }
        Ok(spec)
    }

    /// `struct`/`union`/`enum` [tag] [`{` member-list `}`].
    fn parse_tag_specifier(&mut self) -> Result<(TypeBase, SymbolId), ParseError> {
        let keyword = self.advance()?;
        let base = match keyword.kind {
            TokenKind::KwStruct => TypeBase::Struct,
            TokenKind::KwUnion => TypeBase::Union,
            _ => TypeBase::Enum,
        };
        let kind = match base {
            TypeBase::Struct => cc_store::SymbolKind::Struct,
            TypeBase::Union => cc_store::SymbolKind::Union,
            _ => cc_store::SymbolKind::Enum,
        };

        let name = if self.peek_kind()? == TokenKind::Identifier {
            let tok = self.advance()?;
            Some(tok.source_pos)
        } else {
            None
        };

        let existing = name.and_then(|n| self.scopes.resolve(n));
        let tag = if self.peek_kind()? == TokenKind::LBrace {
            let (tag_symbol, _) = self.hb.new_symbol()?;
            if let Some(n) = name {
                if !self.scopes.declared_in_current_scope(n) {
                    self.scopes.declare(n, tag_symbol);
                }
            }
            self.advance()?; // {
            let mut field_count = 0u32;
            let mut first_field = SymbolId::NONE;
            let mut last_field: Option<cc_store::SymbolId> = None;
            while self.peek_kind()? != TokenKind::RBrace && self.peek_kind()? != TokenKind::Eof {
                if base == TypeBase::Enum {
                    let field_tok = self.expect(TokenKind::Identifier)?;
                    let (sym, slot) = self.hb.new_symbol()?;
                    let record = self.hb.symbol_mut(slot)?;
                    record.kind = cc_store::SymbolKind::Enumerator;
                    record.name = field_tok.source_pos;
                    record.scope_depth = self.scopes.depth();
                    if self.eat(TokenKind::Assign)? {
                        let _ = self.parse_conditional()?;
                    }
                    self.hb.touched(slot);
                    if !self.scopes.declared_in_current_scope(field_tok.source_pos) {
                        self.scopes.declare(field_tok.source_pos, sym);
                    }
                    if first_field.is_none() {
                        first_field = sym;
                    }
                    if let Some(prev) = last_field {
                        let slot = self.hb.get_symbol(prev)?;
                        self.hb.symbol_mut(slot)?.sibling = sym;
                        self.hb.touched(slot);
                    }
                    last_field = Some(sym);
                    field_count += 1;
                    if !self.eat(TokenKind::Comma)? {
                        break;
                    }
                } else {
                    let field_spec = self.parse_specifiers()?;
                    let (field_name, field_type) = self.parse_declarator(field_spec)?;
                    self.expect(TokenKind::Semicolon)?;
                    if let Some(field_name) = field_name {
                        let (sym, slot) = self.hb.new_symbol()?;
                        let record = self.hb.symbol_mut(slot)?;
                        record.kind = cc_store::SymbolKind::Variable;
                        record.name = field_name;
                        record.type_node = field_type;
                        record.scope_depth = self.scopes.depth();
                        self.hb.touched(slot);
                        if let Some(prev) = last_field {
                            let pslot = self.hb.get_symbol(prev)?;
                            self.hb.symbol_mut(pslot)?.sibling = sym;
                            self.hb.touched(pslot);
                        }
                        if first_field.is_none() {
                            first_field = sym;
                        }
                        last_field = Some(sym);
                        field_count += 1;
                    }
                }
            }
            self.expect(TokenKind::RBrace)?;
            let slot = self.hb.get_symbol(tag_symbol)?;
            let record = self.hb.symbol_mut(slot)?;
            record.kind = kind;
            record.name = name.unwrap_or(cc_store::StringPos::EMPTY);
            record.scope_depth = self.scopes.depth();
            record.extra = cc_store::SymbolExtra::Aggregate { field_count, first_field };
            self.hb.touched(slot);
            tag_symbol
        } else {
            existing.unwrap_or(SymbolId::NONE)
        };
        Ok((base, tag))
    }

    /// Pointer/array declarator wrapped around `spec`'s base type, plus the
    /// declared identifier if present (absent for abstract declarators in
    /// casts/`sizeof`).
    pub(crate) fn parse_declarator(&mut self, spec: Specifiers) -> Result<(Option<cc_store::StringPos>, AstId), ParseError> {
        let mut pointer_depth = 0u32;
        while self.eat(TokenKind::Star)? {
            pointer_depth += 1;
            // trailing qualifiers on the pointer itself are accepted and folded in
            while matches!(self.peek_kind()?, TokenKind::KwConst | TokenKind::KwVolatile | TokenKind::KwRestrict) {
                self.advance()?;
            }
        }

        let name = if self.peek_kind()? == TokenKind::Identifier {
            Some(self.advance()?.source_pos)
        } else {
            None
        };

        let mut array_len_expr = AstId::NONE;
        if self.eat(TokenKind::LBracket)? {
            if self.peek_kind()? != TokenKind::RBracket {
                array_len_expr = self.parse_conditional()?;
            }
            self.expect(TokenKind::RBracket)?;
        }

        let type_token = self.cursor();
        let type_node = self.new_node(
            AstNode::Type {
                base: spec.base.unwrap_or(TypeBase::Int),
                qualifiers: spec.qualifiers,
                pointer_depth,
                array_len_expr,
                element_type: AstId::NONE,
                type_symbol: spec.tag_symbol,
            },
            type_token,
        )?;
        Ok((name, type_node))
    }
}
