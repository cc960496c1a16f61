//! Printer — a pre/post visitor that renders a parsed tree as indented
//! text, one line per node, resolving identifiers and string literals
//! back through SSTORE so the dump is readable rather than a wall of ids.
//! This is what `cc1t` shells out to.

use std::fmt::Write as _;

use cc_hb::NodeBuffer;
use cc_store::{AstNode, AstRecord, SStore, AstId};

use crate::error::VisitError;
use crate::walk::Visitor;

pub struct Printer<'a> {
    sstore: &'a mut SStore,
    out: String,
    depth: u32,
    scratch: Vec<u8>,
}

impl<'a> Printer<'a> {
    pub fn new(sstore: &'a mut SStore) -> Self {
        Self { sstore, out: String::new(), depth: 0, scratch: Vec::new() }
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn resolve(&mut self, pos: cc_store::StringPos) -> String {
        if pos == cc_store::StringPos::EMPTY {
            return String::new();
        }
        match self.sstore.get(pos, &mut self.scratch) {
            Ok(()) => String::from_utf8_lossy(&self.scratch).into_owned(),
            Err(_) => format!("<bad-str:{}>", pos.0),
        }
    }

    fn line(&mut self, id: AstId, label: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        let _ = writeln!(self.out, "#{} {}", id.0, label);
    }
}

impl<'a> Visitor for Printer<'a> {
    fn pre(&mut self, _hb: &mut NodeBuffer, id: AstId, record: &AstRecord) -> Result<(), VisitError> {
        let label = match record.node {
            AstNode::Program { .. } => "Program".to_string(),
            AstNode::FunctionDecl { .. } => "FunctionDecl".to_string(),
            AstNode::FunctionDef { .. } => "FunctionDef".to_string(),
            AstNode::VarDecl { .. } => "VarDecl".to_string(),
            AstNode::ParamDecl { .. } => "ParamDecl".to_string(),
            AstNode::CompoundStmt { scope_depth, .. } => format!("CompoundStmt depth={}", scope_depth),
            AstNode::IfStmt { .. } => "IfStmt".to_string(),
            AstNode::WhileStmt { .. } => "WhileStmt".to_string(),
            AstNode::DoWhileStmt { .. } => "DoWhileStmt".to_string(),
            AstNode::ForStmt { .. } => "ForStmt".to_string(),
            AstNode::ReturnStmt { .. } => "ReturnStmt".to_string(),
            AstNode::BreakStmt => "BreakStmt".to_string(),
            AstNode::ContinueStmt => "ContinueStmt".to_string(),
            AstNode::ExprStmt { .. } => "ExprStmt".to_string(),
            AstNode::BinaryOp { operator, .. } => format!("BinaryOp {:?}", operator),
            AstNode::UnaryOp { operator, .. } => format!("UnaryOp {:?}", operator),
            AstNode::Assign { operator, .. } => format!("Assign {:?}", operator),
            AstNode::Conditional { .. } => "Conditional".to_string(),
            AstNode::Call { arg_count, .. } => format!("Call argc={}", arg_count),
            AstNode::IdentifierRef { symbol } => format!("IdentifierRef sym=#{}", symbol.0),
            AstNode::IntLiteral { value } => format!("IntLiteral {}", value),
            AstNode::FloatLiteral { value } => format!("FloatLiteral {}", value),
            AstNode::CharLiteral { value } => format!("CharLiteral {}", value),
            AstNode::StringLiteral { string_pos } => {
                let text = self.resolve(string_pos);
                format!("StringLiteral \"{}\"", text)
            }
            AstNode::Initializer { .. } => "Initializer".to_string(),
            AstNode::DesignatedField { field_name, .. } => {
                let text = self.resolve(field_name);
                format!("DesignatedField .{}", text)
            }
            AstNode::DesignatedIndex { .. } => "DesignatedIndex".to_string(),
            AstNode::Cast { .. } => "Cast".to_string(),
            AstNode::Sizeof { is_type, .. } => format!("Sizeof is_type={}", is_type),
            AstNode::Label { name, .. } => {
                let text = self.resolve(name);
                format!("Label {}:", text)
            }
            AstNode::Goto { label } => {
                let text = self.resolve(label);
                format!("Goto {}", text)
            }
            AstNode::Type { base, pointer_depth, .. } => format!("Type {:?} ptr={}", base, pointer_depth),
            AstNode::Empty => "Empty".to_string(),
        };
        self.line(id, &label);
        self.depth += 1;
        Ok(())
    }

    fn post(&mut self, _hb: &mut NodeBuffer, _id: AstId, _record: &AstRecord) -> Result<(), VisitError> {
        self.depth -= 1;
        Ok(())
    }
}
