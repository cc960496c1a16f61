//! A pre-order visitor that counts nodes by kind and tracks the deepest
//! nesting reached, used by `cc1t --stats` and by benchmarks that want a
//! size signal for a parsed tree.

use cc_hb::NodeBuffer;
use cc_store::{AstId, AstNode, AstRecord};
use cc_util::FxHashMap;

use crate::error::VisitError;
use crate::walk::Visitor;

#[derive(Default, Debug)]
pub struct TreeStats {
    pub total_nodes: u64,
    pub by_kind: FxHashMap<&'static str, u64>,
    depth: u32,
    pub max_depth: u32,
}

fn kind_name(node: &AstNode) -> &'static str {
    use AstNode::*;
    match node {
        Empty => "Empty",
        Program { .. } => "Program",
        FunctionDecl { .. } => "FunctionDecl",
        FunctionDef { .. } => "FunctionDef",
        VarDecl { .. } => "VarDecl",
        ParamDecl { .. } => "ParamDecl",
        CompoundStmt { .. } => "CompoundStmt",
        IfStmt { .. } => "IfStmt",
        WhileStmt { .. } => "WhileStmt",
        DoWhileStmt { .. } => "DoWhileStmt",
        ForStmt { .. } => "ForStmt",
        ReturnStmt { .. } => "ReturnStmt",
        BreakStmt => "BreakStmt",
        ContinueStmt => "ContinueStmt",
        ExprStmt { .. } => "ExprStmt",
        BinaryOp { .. } => "BinaryOp",
        UnaryOp { .. } => "UnaryOp",
        Assign { .. } => "Assign",
        Conditional { .. } => "Conditional",
        Call { .. } => "Call",
        IdentifierRef { .. } => "IdentifierRef",
        IntLiteral { .. } => "IntLiteral",
        FloatLiteral { .. } => "FloatLiteral",
        CharLiteral { .. } => "CharLiteral",
        StringLiteral { .. } => "StringLiteral",
        Initializer { .. } => "Initializer",
        DesignatedField { .. } => "DesignatedField",
        DesignatedIndex { .. } => "DesignatedIndex",
        Cast { .. } => "Cast",
        Sizeof { .. } => "Sizeof",
        Label { .. } => "Label",
        Goto { .. } => "Goto",
        Type { .. } => "Type",
    }
}

impl Visitor for TreeStats {
    fn pre(&mut self, _hb: &mut NodeBuffer, _id: AstId, record: &AstRecord) -> Result<(), VisitError> {
        self.total_nodes += 1;
        *self.by_kind.entry(kind_name(&record.node)).or_default() += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        Ok(())
    }

    fn post(&mut self, _hb: &mut NodeBuffer, _id: AstId, _record: &AstRecord) -> Result<(), VisitError> {
        self.depth -= 1;
        Ok(())
    }
}
