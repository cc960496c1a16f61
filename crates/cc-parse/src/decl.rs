//! External (top-level) declarations: function definitions/declarations,
//! global variables, and the block-scope declaration grammar shared with
//! compound statements.

use cc_store::{AstId, AstNode, Declaration, StorageClass, SymbolFlags, SymbolKind};

use crate::types::Specifiers;
use crate::{ParseError, Parser};
use cc_store::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_external_declaration(&mut self) -> Result<AstId, ParseError> {
        let spec = self.parse_specifiers()?;
        let (name, type_node) = self.parse_declarator(spec)?;

        if spec.storage_class == StorageClass::Typedef {
            self.expect(TokenKind::Semicolon)?;
            let name = name.unwrap_or(cc_store::StringPos::EMPTY);
            let (symbol, slot) = self.hb.new_symbol()?;
            let record = self.hb.symbol_mut(slot)?;
            record.kind = SymbolKind::Typedef;
            record.name = name;
            record.type_node = type_node;
            record.scope_depth = self.scopes.depth();
            self.hb.touched(slot);
            if !self.scopes.declared_in_current_scope(name) {
                self.scopes.declare(name, symbol);
            }
            self.typedef_names.push(name);
            let token = self.cursor();
            return self.new_node(
                AstNode::VarDecl { decl: Declaration { symbol, type_node, initializer: AstId::NONE, storage_class: spec.storage_class } },
                token,
            );
        }

        if self.peek_kind()? == TokenKind::LParen {
            return self.parse_function_tail(spec, name, type_node);
        }

        // Global variable declaration(s), comma-separated.
        let name = name.unwrap_or(cc_store::StringPos::EMPTY);
        let first = self.finish_variable_declarator(spec, name, type_node)?;
        let mut last = first;
        while self.eat(TokenKind::Comma)? {
            let (next_name, next_type) = self.parse_declarator(spec)?;
            let next_name = next_name.unwrap_or(cc_store::StringPos::EMPTY);
            let next = self.finish_variable_declarator(spec, next_name, next_type)?;
            self.link_next(last, next)?;
            last = next;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(first)
    }

    fn finish_variable_declarator(&mut self, spec: Specifiers, name: cc_store::StringPos, type_node: AstId) -> Result<AstId, ParseError> {
        let initializer = if self.eat(TokenKind::Assign)? { self.parse_assignment()? } else { AstId::NONE };
        let redeclared = self.scopes.declared_in_current_scope(name);
        let (symbol, slot) = self.hb.new_symbol()?;
        let record = self.hb.symbol_mut(slot)?;
        record.kind = SymbolKind::Variable;
        record.name = name;
        record.type_node = type_node;
        record.scope_depth = self.scopes.depth();
        if spec.qualifiers.contains(cc_store::TypeQualifiers::CONST) {
            record.flags.insert(SymbolFlags::CONST);
        }
        if spec.qualifiers.contains(cc_store::TypeQualifiers::VOLATILE) {
            record.flags.insert(SymbolFlags::VOLATILE);
        }
        self.hb.touched(slot);
        if redeclared {
            self.error("redeclaration of identifier in the same scope");
        } else {
            self.scopes.declare(name, symbol);
        }
        let token = self.cursor();
        self.new_node(AstNode::VarDecl { decl: Declaration { symbol, type_node, initializer, storage_class: spec.storage_class } }, token)
    }

    fn parse_function_tail(&mut self, spec: Specifiers, name: Option<cc_store::StringPos>, return_type: AstId) -> Result<AstId, ParseError> {
        let name = name.unwrap_or(cc_store::StringPos::EMPTY);
        self.expect(TokenKind::LParen)?;

        let (symbol, _) = self.hb.new_symbol()?;
        if !self.scopes.declared_in_current_scope(name) {
            self.scopes.declare(name, symbol);
        }

        self.scopes.enter();
        let mut param_count = 0u32;
        let mut first_param = cc_store::SymbolId::NONE;
        let mut last_param: Option<cc_store::SymbolId> = None;
        let mut variadic = false;
        if self.peek_kind()? != TokenKind::RParen {
            loop {
                if self.eat(TokenKind::Ellipsis)? {
                    variadic = true;
                    break;
                }
                let param_spec = self.parse_specifiers()?;
                let (param_name, param_type) = self.parse_declarator(param_spec)?;
                let param_name = param_name.unwrap_or(cc_store::StringPos::EMPTY);
                let (param_symbol, slot) = self.hb.new_symbol()?;
                let record = self.hb.symbol_mut(slot)?;
                record.kind = SymbolKind::Parameter;
                record.name = param_name;
                record.type_node = param_type;
                record.scope_depth = self.scopes.depth();
                self.hb.touched(slot);
                if param_name != cc_store::StringPos::EMPTY && !self.scopes.declared_in_current_scope(param_name) {
                    self.scopes.declare(param_name, param_symbol);
                }
                if let Some(prev) = last_param {
                    let pslot = self.hb.get_symbol(prev)?;
                    self.hb.symbol_mut(pslot)?.sibling = param_symbol;
                    self.hb.touched(pslot);
                }
                if first_param.is_none() {
                    first_param = param_symbol;
                }
                last_param = Some(param_symbol);
                param_count += 1;
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let mut flags = SymbolFlags::empty();
        if variadic {
            flags.insert(SymbolFlags::VARIADIC);
        }
        let slot = self.hb.get_symbol(symbol)?;
        let record = self.hb.symbol_mut(slot)?;
        record.kind = SymbolKind::Function;
        record.name = name;
        record.type_node = return_type;
        record.flags = flags;
        record.extra = cc_store::SymbolExtra::Function { param_count, first_param };
        self.hb.touched(slot);

        let decl = Declaration { symbol, type_node: return_type, initializer: AstId::NONE, storage_class: spec.storage_class };

        if self.peek_kind()? == TokenKind::Semicolon {
            self.advance()?;
            self.scopes.leave();
            let token = self.cursor();
            return self.new_node(AstNode::FunctionDecl { decl }, token);
        }

        let body = self.parse_function_body()?;
        self.scopes.leave();
        let token = self.cursor();
        self.new_node(AstNode::FunctionDef { decl, body }, token)
    }
}
