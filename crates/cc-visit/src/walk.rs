//! The generic AST walker every pass (statistics, constant folding, the
//! printer) is built on. Traversal is unified around linked lists: a "list
//! of children" and "a single child" are the same operation, since a node
//! that isn't part of a multi-element chain simply has `next_stmt ==
//! AstId::NONE` and the list loop stops after one iteration.

use cc_hb::NodeBuffer;
use cc_store::{AstId, AstNode, AstRecord};
use cc_util::FxHashSet;

use crate::error::VisitError;

pub const MAX_DEPTH: u32 = 4096;

pub trait Visitor {
    fn pre(&mut self, _hb: &mut NodeBuffer, _id: AstId, _record: &AstRecord) -> Result<(), VisitError> {
        Ok(())
    }

    fn post(&mut self, _hb: &mut NodeBuffer, _id: AstId, _record: &AstRecord) -> Result<(), VisitError> {
        Ok(())
    }
}

/// Every structural (non-chain) child of a node, in evaluation order.
fn structural_children(node: &AstNode) -> Vec<AstId> {
    use AstNode::*;
    match *node {
        Empty | BreakStmt | ContinueStmt | IdentifierRef { .. } | IntLiteral { .. } | FloatLiteral { .. } | CharLiteral { .. }
        | StringLiteral { .. } | Goto { .. } => vec![],
        Program { first_decl } => vec![first_decl],
        FunctionDecl { decl } => vec![decl.type_node, decl.initializer],
        FunctionDef { decl, body } => vec![decl.type_node, decl.initializer, body],
        VarDecl { decl } | ParamDecl { decl } => vec![decl.type_node, decl.initializer],
        CompoundStmt { declarations, statements, .. } => vec![declarations, statements],
        IfStmt { condition, then_stmt, else_stmt } => vec![condition, then_stmt, else_stmt],
        WhileStmt { condition, body } | DoWhileStmt { condition, body } => vec![condition, body],
        ForStmt { init, condition, step, body } => vec![init, condition, step, body],
        ReturnStmt { value } => vec![value],
        ExprStmt { expr } => vec![expr],
        BinaryOp { left, right, .. } => vec![left, right],
        UnaryOp { operand, .. } => vec![operand],
        Assign { target, value, .. } => vec![target, value],
        Conditional { condition, then_expr, else_expr } => vec![condition, then_expr, else_expr],
        Call { function, arguments, .. } => vec![function, arguments],
        Initializer { first_element } => vec![first_element],
        DesignatedField { value, .. } => vec![value],
        DesignatedIndex { index_expr, value } => vec![index_expr, value],
        Cast { type_node, operand } => vec![type_node, operand],
        Sizeof { operand, .. } => vec![operand],
        Label { target, .. } => vec![target],
        Type { array_len_expr, element_type, .. } => vec![array_len_expr, element_type],
    }
}

/// Walk the linked list starting at `head` (via `next_stmt`), recursing
/// into each node's structural children. A node with no siblings just has
/// `next_stmt == AstId::NONE`, so this same function handles both "walk one
/// child" and "walk a statement/argument/declaration list".
pub fn walk_list(hb: &mut NodeBuffer, head: AstId, visitor: &mut dyn Visitor, depth: u32, seen: &mut FxHashSet<u32>) -> Result<(), VisitError> {
    if depth > MAX_DEPTH {
        return Err(VisitError::DepthExceeded);
    }
    let mut current = head;
    while !current.is_none() {
        if !seen.insert(current.0) {
            return Err(VisitError::CycleDetected(current));
        }
        let slot = hb.get_ast(current)?;
        let record = *hb.ast(slot)?;
        visitor.pre(hb, current, &record)?;
        for child in structural_children(&record.node) {
            walk_list(hb, child, visitor, depth + 1, seen)?;
        }
        let slot = hb.get_ast(current)?;
        let record = *hb.ast(slot)?;
        visitor.post(hb, current, &record)?;
        current = record.next_stmt;
    }
    Ok(())
}

pub fn walk(hb: &mut NodeBuffer, root: AstId, visitor: &mut dyn Visitor) -> Result<(), VisitError> {
    let mut seen = FxHashSet::default();
    walk_list(hb, root, visitor, 0, &mut seen)
}
