//! Expression grammar, one function per precedence level per spec.md §4.G:
//! primary → postfix → unary → multiplicative → additive → relational →
//! conditional → assignment, each calling down into the next tighter level.
//!
//! A handful of forms that don't have a dedicated node kind are folded into
//! `BinaryOp`/`UnaryOp` rather than growing the node vocabulary: array
//! subscript is `BinaryOp` with operator `[`, member access is `BinaryOp`
//! with operator `.`/`->` and a synthesized `StringLiteral` right operand
//! carrying the field name, and postfix `++`/`--` share the prefix form's
//! `UnaryOp` shape (a later pass would need its own flag to tell them
//! apart; this repo doesn't need that distinction anywhere yet).

use cc_store::{AstId, AstNode, SymbolId};

use crate::{ParseError, Parser};
use cc_store::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Result<AstId, ParseError> {
        self.parse_assignment()
    }

    pub(crate) fn parse_assignment(&mut self) -> Result<AstId, ParseError> {
        self.enter_nesting()?;
        let token = self.cursor();
        let target = self.parse_conditional()?;
        let op = self.peek_kind()?;
        let is_assign_op = matches!(
            op,
            TokenKind::Assign | TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq | TokenKind::PercentEq
        );
        let result = if is_assign_op {
            self.advance()?;
            let value = self.parse_assignment()?;
            self.new_node(AstNode::Assign { target, value, operator: op }, token)
        } else {
            Ok(target)
        };
        self.leave_nesting();
        result
    }

    pub(crate) fn parse_conditional(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        let condition = self.parse_relational()?;
        if self.eat(TokenKind::Question)? {
            let then_expr = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let else_expr = self.parse_conditional()?;
            self.new_node(AstNode::Conditional { condition, then_expr, else_expr }, token)
        } else {
            Ok(condition)
        }
    }

    fn parse_relational(&mut self) -> Result<AstId, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let token = self.cursor();
            let op = self.peek_kind()?;
            if !matches!(op, TokenKind::Less | TokenKind::Greater | TokenKind::LessEq | TokenKind::GreaterEq) {
                break;
            }
            self.advance()?;
            let right = self.parse_additive()?;
            left = self.new_node(AstNode::BinaryOp { left, right, operator: op }, token)?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<AstId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let token = self.cursor();
            let op = self.peek_kind()?;
            if !matches!(op, TokenKind::Plus | TokenKind::Minus) {
                break;
            }
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = self.new_node(AstNode::BinaryOp { left, right, operator: op }, token)?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<AstId, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let token = self.cursor();
            let op = self.peek_kind()?;
            if !matches!(op, TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
                break;
            }
            self.advance()?;
            let right = self.parse_unary()?;
            left = self.new_node(AstNode::BinaryOp { left, right, operator: op }, token)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstId, ParseError> {
        self.enter_nesting()?;
        let result = self.parse_unary_inner();
        self.leave_nesting();
        result
    }

    fn parse_unary_inner(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        let op = self.peek_kind()?;
        if matches!(
            op,
            TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde | TokenKind::Star | TokenKind::Amp
        ) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return self.new_node(AstNode::UnaryOp { operand, operator: op }, token);
        }
        if op == TokenKind::KwSizeof {
            self.advance()?;
            if self.peek_kind()? == TokenKind::LParen && self.next_is_type_start()? {
                self.advance()?; // (
                let spec = self.parse_specifiers()?;
                let (_, type_node) = self.parse_declarator(spec)?;
                self.expect(TokenKind::RParen)?;
                return self.new_node(AstNode::Sizeof { operand: type_node, is_type: true }, token);
            }
            let operand = self.parse_unary()?;
            return self.new_node(AstNode::Sizeof { operand, is_type: false }, token);
        }
        if op == TokenKind::LParen && self.next_is_type_start()? {
            self.advance()?; // (
            let spec = self.parse_specifiers()?;
            let (_, type_node) = self.parse_declarator(spec)?;
            self.expect(TokenKind::RParen)?;
            let operand = self.parse_unary()?;
            return self.new_node(AstNode::Cast { type_node, operand }, token);
        }
        self.parse_postfix()
    }

    /// True if the token *after* the `(` we're looking at starts a type.
    /// Doesn't consume anything.
    fn next_is_type_start(&mut self) -> Result<bool, ParseError> {
        let save = self.cursor();
        self.advance()?; // (
        let tok = self.peek()?;
        let is_type = tok.kind.is_declaration_specifier() || (tok.kind == TokenKind::Identifier && self.is_typedef_name(tok.source_pos));
        self.tstore.set_cursor(save);
        Ok(is_type)
    }

    fn parse_postfix(&mut self) -> Result<AstId, ParseError> {
        let mut node = self.parse_primary()?;
        loop {
            let token = self.cursor();
            match self.peek_kind()? {
                TokenKind::LParen => {
                    self.advance()?;
                    let mut first = AstId::NONE;
                    let mut last: Option<AstId> = None;
                    let mut count = 0u32;
                    if self.peek_kind()? != TokenKind::RParen {
                        loop {
                            let arg = self.parse_assignment()?;
                            if first.is_none() {
                                first = arg;
                            }
                            if let Some(prev) = last {
                                self.link_next(prev, arg)?;
                            }
                            last = Some(arg);
                            count += 1;
                            if !self.eat(TokenKind::Comma)? {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    node = self.new_node(AstNode::Call { function: node, arguments: first, arg_count: count }, token)?;
                }
                TokenKind::LBracket => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    node = self.new_node(AstNode::BinaryOp { left: node, right: index, operator: TokenKind::LBracket }, token)?;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let op = self.peek_kind()?;
                    self.advance()?;
                    let field_tok = self.expect(TokenKind::Identifier)?;
                    let field = self.new_node(AstNode::StringLiteral { string_pos: field_tok.source_pos }, token)?;
                    node = self.new_node(AstNode::BinaryOp { left: node, right: field, operator: op }, token)?;
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = self.peek_kind()?;
                    self.advance()?;
                    node = self.new_node(AstNode::UnaryOp { operand: node, operator: op }, token)?;
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<AstId, ParseError> {
        let token = self.cursor();
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Identifier => {
                self.advance()?;
                let symbol = match self.scopes.resolve(tok.source_pos) {
                    Some(s) => s,
                    None => {
                        self.error("use of undeclared identifier");
                        SymbolId::NONE
                    }
                };
                self.new_node(AstNode::IdentifierRef { symbol }, token)
            }
            TokenKind::IntLiteral => {
                self.advance()?;
                let value = self.read_int_literal(tok.source_pos)?;
                self.new_node(AstNode::IntLiteral { value }, token)
            }
            TokenKind::FloatLiteral => {
                self.advance()?;
                let value = self.read_float_literal(tok.source_pos)?;
                self.new_node(AstNode::FloatLiteral { value }, token)
            }
            TokenKind::CharLiteral => {
                self.advance()?;
                let mut buf = Vec::new();
                self.sstore.get(tok.source_pos, &mut buf)?;
                let value = buf.first().copied().unwrap_or(0) as i64;
                self.new_node(AstNode::CharLiteral { value }, token)
            }
            TokenKind::StringLiteral => {
                self.advance()?;
                self.new_node(AstNode::StringLiteral { string_pos: tok.source_pos }, token)
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => {
                self.error(format!("expected an expression, found {:?}", tok.kind));
                self.new_node(AstNode::IntLiteral { value: 0 }, token)
            }
        }
    }

    fn read_int_literal(&mut self, pos: cc_store::StringPos) -> Result<i64, ParseError> {
        let mut buf = Vec::new();
        self.sstore.get(pos, &mut buf)?;
        let text: String = buf.iter().map(|&b| b as char).collect();
        let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);

        let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            (16, hex)
        } else if digits.len() > 1 && digits.starts_with('0') {
            (8, &digits[1..])
        } else {
            (10, digits)
        };

        Ok(i64::from_str_radix(digits, radix).unwrap_or(0))
    }

    fn read_float_literal(&mut self, pos: cc_store::StringPos) -> Result<f64, ParseError> {
        let mut buf = Vec::new();
        self.sstore.get(pos, &mut buf)?;
        let text: String = buf.iter().take_while(|b| b.is_ascii_digit() || matches!(*b as char, '.' | 'e' | 'E' | '+' | '-')).map(|&b| b as char).collect();
        Ok(text.parse().unwrap_or(0.0))
    }
}
