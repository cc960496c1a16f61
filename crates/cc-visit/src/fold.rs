//! A constant-folding sample optimizer: post-order, so by the time a
//! `BinaryOp` is visited its operands have already had a chance to fold.
//! Division/modulo by a constant zero is left alone — the fold is a
//! compile-time nicety, not a substitute for the VM's own runtime
//! division-by-zero fault.

use cc_hb::NodeBuffer;
use cc_store::{AstId, AstNode, AstRecord, NodeFlags, TokenKind};

use crate::error::VisitError;
use crate::walk::Visitor;

#[derive(Default)]
pub struct ConstFold {
    pub folded_count: u64,
}

fn literal_int(node: &AstNode) -> Option<i64> {
    match *node {
        AstNode::IntLiteral { value } => Some(value),
        AstNode::CharLiteral { value } => Some(value),
        _ => None,
    }
}

fn literal_float(node: &AstNode) -> Option<f64> {
    match *node {
        AstNode::FloatLiteral { value } => Some(value),
        _ => None,
    }
}

impl ConstFold {
    fn try_fold_binary(&mut self, hb: &mut NodeBuffer, left: AstId, right: AstId, operator: TokenKind) -> Result<Option<AstNode>, VisitError> {
        let left_slot = hb.get_ast(left)?;
        let left_node = hb.ast(left_slot)?.node;
        let right_slot = hb.get_ast(right)?;
        let right_node = hb.ast(right_slot)?.node;

        if let (Some(a), Some(b)) = (literal_int(&left_node), literal_int(&right_node)) {
            let folded = match operator {
                TokenKind::Plus => Some(a.wrapping_add(b)),
                TokenKind::Minus => Some(a.wrapping_sub(b)),
                TokenKind::Star => Some(a.wrapping_mul(b)),
                TokenKind::Slash if b != 0 => Some(a.wrapping_div(b)),
                TokenKind::Percent if b != 0 => Some(a.wrapping_rem(b)),
                TokenKind::Less => Some((a < b) as i64),
                TokenKind::Greater => Some((a > b) as i64),
                TokenKind::LessEq => Some((a <= b) as i64),
                TokenKind::GreaterEq => Some((a >= b) as i64),
                _ => None,
            };
            return Ok(folded.map(|v| AstNode::IntLiteral { value: v }));
        }

        if let (Some(a), Some(b)) = (literal_float(&left_node), literal_float(&right_node)) {
            let folded = match operator {
                TokenKind::Plus => Some(a + b),
                TokenKind::Minus => Some(a - b),
                TokenKind::Star => Some(a * b),
                TokenKind::Slash if b != 0.0 => Some(a / b),
                _ => None,
            };
            return Ok(folded.map(|v| AstNode::FloatLiteral { value: v }));
        }

        Ok(None)
    }

    fn try_fold_unary(&mut self, hb: &mut NodeBuffer, operand: AstId, operator: TokenKind) -> Result<Option<AstNode>, VisitError> {
        let slot = hb.get_ast(operand)?;
        let node = hb.ast(slot)?.node;
        if let Some(v) = literal_int(&node) {
            let folded = match operator {
                TokenKind::Minus => Some(-v),
                TokenKind::Plus => Some(v),
                TokenKind::Tilde => Some(!v),
                TokenKind::Bang => Some((v == 0) as i64),
                _ => None,
            };
            return Ok(folded.map(|v| AstNode::IntLiteral { value: v }));
        }
        if let Some(v) = literal_float(&node) {
            let folded = match operator {
                TokenKind::Minus => Some(-v),
                TokenKind::Plus => Some(v),
                _ => None,
            };
            return Ok(folded.map(|v| AstNode::FloatLiteral { value: v }));
        }
        Ok(None)
    }
}

impl Visitor for ConstFold {
    fn post(&mut self, hb: &mut NodeBuffer, id: AstId, record: &AstRecord) -> Result<(), VisitError> {
        let replacement = match record.node {
            AstNode::BinaryOp { left, right, operator } => self.try_fold_binary(hb, left, right, operator)?,
            AstNode::UnaryOp { operand, operator } => self.try_fold_unary(hb, operand, operator)?,
            _ => None,
        };
        if let Some(new_node) = replacement {
            let slot = hb.get_ast(id)?;
            let rec = hb.ast_mut(slot)?;
            rec.node = new_node;
            rec.flags.insert(NodeFlags::OPTIMIZED);
            hb.touched(slot);
            self.folded_count += 1;
        }
        Ok(())
    }
}
