//! Statement grammar: compound blocks (with C99 mixed declarations and
//! statements), the control-flow forms, and the declaration grammar shared
//! between block scope and file scope.

use cc_store::{AstId, AstNode, Declaration, StorageClass, SymbolKind};

use crate::{ParseError, Parser};
use cc_store::TokenKind;

impl<'a> Parser<'a> {
    fn looks_like_declaration(&mut self) -> Result<bool, ParseError> {
        let tok = self.peek()?;
        if tok.kind.is_declaration_specifier() {
            return Ok(true);
        }
        Ok(tok.kind == TokenKind::Identifier && self.is_typedef_name(tok.source_pos))
    }

    pub(crate) fn parse_compound_statement(&mut self) -> Result<AstId, ParseError> {
        self.scopes.enter();
        let result = self.parse_block_contents();
        self.scopes.leave();
        result
    }

    /// A function body shares the scope `parse_function_tail` already
    /// opened for its parameters instead of opening one of its own, so a
    /// declaration at the top of the body lands at the same `scope_depth`
    /// as the parameters (spec.md §4.G: function scope is one depth, not
    /// params-then-body-each-their-own).
    pub(crate) fn parse_function_body(&mut self) -> Result<AstId, ParseError> {
        self.parse_block_contents()
    }

    fn parse_block_contents(&mut self) -> Result<AstId, ParseError> {
        self.enter_nesting()?;
        self.expect(TokenKind::LBrace)?;
        let scope_depth = self.scopes.depth();

        let mut first: AstId = AstId::NONE;
        let mut last: Option<AstId> = None;
        while self.peek_kind()? != TokenKind::RBrace && self.peek_kind()? != TokenKind::Eof {
            let before = self.cursor();
            let item = if self.looks_like_declaration()? { self.parse_local_declaration() } else { self.parse_statement() };
            match item {
                Ok(node) => {
                    if first.is_none() {
                        first = node;
                    }
                    if let Some(prev) = last {
                        self.link_next(prev, node)?;
                    }
                    last = Some(node);
                }
                Err(ParseError::Aborted) => {
                    self.leave_nesting();
                    return Err(ParseError::Aborted);
                }
                Err(_) => self.synchronize_statement(),
            }
            if self.cursor() == before {
                let _ = self.advance();
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.leave_nesting();

        let token = self.cursor();
        self.new_node(AstNode::CompoundStmt { declarations: AstId::NONE, statements: first, scope_depth }, token)
    }

    fn synchronize_statement(&mut self) {
        loop {
            match self.peek_kind() {
                Ok(TokenKind::Semicolon) => {
                    let _ = self.advance();
                    return;
                }
                Ok(TokenKind::RBrace) | Ok(TokenKind::Eof) => return,
                _ => {
                    if self.advance().is_err() {
                        return;
                    }
                }
            }
        }
    }

    /// A declaration appearing inside a block: like an external declaration
    /// minus function definitions (a local function *prototype* is legal
    /// C99 but a local function *body* is not).
    fn parse_local_declaration(&mut self) -> Result<AstId, ParseError> {
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

        let name = name.unwrap_or(cc_store::StringPos::EMPTY);
        let initializer = if self.eat(TokenKind::Assign)? { self.parse_assignment()? } else { AstId::NONE };
        let redeclared = self.scopes.declared_in_current_scope(name);
        let (symbol, slot) = self.hb.new_symbol()?;
        let record = self.hb.symbol_mut(slot)?;
        record.kind = SymbolKind::Variable;
        record.name = name;
        record.type_node = type_node;
        record.scope_depth = self.scopes.depth();
        self.hb.touched(slot);
        if redeclared {
            self.error("redeclaration of identifier in the same scope");
        } else {
            self.scopes.declare(name, symbol);
        }
        let first_token = self.cursor();
        let first = self.new_node(
            AstNode::VarDecl { decl: Declaration { symbol, type_node, initializer, storage_class: spec.storage_class } },
            first_token,
        )?;

        let mut last = first;
        while self.eat(TokenKind::Comma)? {
            let (next_name, next_type) = self.parse_declarator(spec)?;
            let next_name = next_name.unwrap_or(cc_store::StringPos::EMPTY);
            let next_init = if self.eat(TokenKind::Assign)? { self.parse_assignment()? } else { AstId::NONE };
            let redeclared = self.scopes.declared_in_current_scope(next_name);
            let (next_symbol, slot) = self.hb.new_symbol()?;
            let record = self.hb.symbol_mut(slot)?;
            record.kind = SymbolKind::Variable;
            record.name = next_name;
            record.type_node = next_type;
            record.scope_depth = self.scopes.depth();
            self.hb.touched(slot);
            if redeclared {
                self.error("redeclaration of identifier in the same scope");
            } else {
                self.scopes.declare(next_name, next_symbol);
            }
            let token = self.cursor();
            let next_node = self.new_node(
                AstNode::VarDecl { decl: Declaration { symbol: next_symbol, type_node: next_type, initializer: next_init, storage_class: spec.storage_class } },
                token,
            )?;
            self.link_next(last, next_node)?;
            last = next_node;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(first)
    }

    fn parse_statement(&mut self) -> Result<AstId, ParseError> {
        self.enter_nesting()?;
        let result = self.parse_statement_inner();
        self.leave_nesting();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        match self.peek_kind()? {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::KwIf => self.parse_if_statement(),
            TokenKind::KwWhile => self.parse_while_statement(),
            TokenKind::KwDo => self.parse_do_while_statement(),
            TokenKind::KwFor => self.parse_for_statement(),
            TokenKind::KwReturn => {
                self.advance()?;
                let value = if self.peek_kind()? == TokenKind::Semicolon { AstId::NONE } else { self.parse_expression()? };
                self.expect(TokenKind::Semicolon)?;
                self.new_node(AstNode::ReturnStmt { value }, token)
            }
            TokenKind::KwBreak => {
                self.advance()?;
                self.expect(TokenKind::Semicolon)?;
                self.new_node(AstNode::BreakStmt, token)
            }
            TokenKind::KwContinue => {
                self.advance()?;
                self.expect(TokenKind::Semicolon)?;
                self.new_node(AstNode::ContinueStmt, token)
            }
            TokenKind::KwGoto => {
                self.advance()?;
                let label_tok = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Semicolon)?;
                self.new_node(AstNode::Goto { label: label_tok.source_pos }, token)
            }
            TokenKind::Semicolon => {
                self.advance()?;
                self.new_node(AstNode::ExprStmt { expr: AstId::NONE }, token)
            }
            TokenKind::Identifier if self.is_label_ahead()? => self.parse_label_statement(),
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                self.new_node(AstNode::ExprStmt { expr }, token)
            }
        }
    }

    fn is_label_ahead(&mut self) -> Result<bool, ParseError> {
        // `identifier :` that's not part of `a ? b : c` or a ternary —
        // the only ambiguity is with a bare expression statement starting
        // with an identifier, which never has a bare `:` right after it at
        // statement level.
        let id = self.tstore.peek()?;
        if id.kind != TokenKind::Identifier {
            return Ok(false);
        }
        // Cheap one-token lookahead: save and restore the cursor.
        let save = self.cursor();
        self.advance()?;
        let is_colon = self.peek_kind()? == TokenKind::Colon;
        self.tstore.set_cursor(save);
        Ok(is_colon)
    }

    fn parse_label_statement(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        let name_tok = self.advance()?;
        self.expect(TokenKind::Colon)?;
        let target = self.parse_statement()?;
        self.new_node(AstNode::Label { name: name_tok.source_pos, target }, token)
    }

    fn parse_if_statement(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        self.advance()?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::KwElse)? { self.parse_statement()? } else { AstId::NONE };
        self.new_node(AstNode::IfStmt { condition, then_stmt, else_stmt }, token)
    }

    fn parse_while_statement(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        self.advance()?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;
        self.new_node(AstNode::WhileStmt { condition, body }, token)
    }

    fn parse_do_while_statement(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        self.advance()?;
        let body = self.parse_statement()?;
        self.expect(TokenKind::KwWhile)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        self.new_node(AstNode::DoWhileStmt { condition, body }, token)
    }

    fn parse_for_statement(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        self.advance()?;
        self.expect(TokenKind::LParen)?;
        self.scopes.enter();

        let init = if self.peek_kind()? == TokenKind::Semicolon {
            self.advance()?;
            AstId::NONE
        } else if self.looks_like_declaration()? {
            self.parse_local_declaration()?
        } else {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            let init_token = self.cursor();
            self.new_node(AstNode::ExprStmt { expr }, init_token)?
        };

        let condition = if self.peek_kind()? == TokenKind::Semicolon { AstId::NONE } else { self.parse_expression()? };
        self.expect(TokenKind::Semicolon)?;

        let step = if self.peek_kind()? == TokenKind::RParen { AstId::NONE } else { self.parse_expression()? };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_statement()?;
        self.scopes.leave();
        self.new_node(AstNode::ForStmt { init, condition, step, body }, token)
    }
}
