//! cc-visit — component H, generic AST traversal and the passes built on
//! top of it: tree statistics, a constant-folding sample optimizer, and
//! the indented printer `cc1t` uses to dump a parsed translation unit.

pub mod error;
pub mod fold;
pub mod print;
pub mod stats;
pub mod walk;

pub use error::VisitError;
pub use fold::ConstFold;
pub use print::Printer;
pub use stats::TreeStats;
pub use walk::{walk, walk_list, Visitor, MAX_DEPTH};

#[cfg(test)]
mod tests {
    use super::*;
    use cc_hb::NodeBuffer;
    use cc_store::{AStore, AstId, AstNode, SStore, SymTab, TStore};

    fn parse_source(source: &str) -> (tempfile::TempDir, AstId, NodeBuffer, SStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut sstore = SStore::init(dir.path().join("s.sstore")).unwrap();
        let mut tstore = TStore::init(dir.path().join("t.tstore")).unwrap();
        let mut sink = cc_diag::ErrorSink::new(cc_diag::ErrorConfig::default());
        cc_lex::lex(source, "t.c", &mut sstore, &mut tstore, &mut sink).unwrap();
        sstore.close().unwrap();
        tstore.close().unwrap();

        let astore_path = dir.path().join("a.astore");
        let symtab_path = dir.path().join("s.symtab");
        AStore::init(&astore_path).unwrap().close().unwrap();
        SymTab::init(&symtab_path).unwrap().close().unwrap();
        let mut hb = NodeBuffer::init(&astore_path, &symtab_path, 64).unwrap();

        let mut sstore = SStore::open(dir.path().join("s.sstore")).unwrap();
        let mut tstore = TStore::open(dir.path().join("t.tstore")).unwrap();
        let program = cc_parse::parse_translation_unit(&mut tstore, &mut sstore, &mut hb, &mut sink, "t.c").unwrap();
        assert!(!sink.has_errors());
        (dir, program, hb, sstore)
    }

    #[test]
    fn walk_visits_every_node_in_a_small_function() {
        let (_dir, program, mut hb, _sstore) = parse_source("int main(void) { int x; x = 1 + 2; return x; }");
        let mut stats = TreeStats::default();
        walk(&mut hb, program, &mut stats).unwrap();
        assert!(stats.total_nodes > 0);
        assert_eq!(*stats.by_kind.get("Program").unwrap(), 1);
        assert_eq!(*stats.by_kind.get("FunctionDef").unwrap(), 1);
        assert!(stats.max_depth >= 3);
    }

    #[test]
    fn const_fold_collapses_a_literal_binary_expression() {
        let (_dir, program, mut hb, _sstore) = parse_source("int main(void) { return 1 + 2; }");
        let mut fold = ConstFold::default();
        walk(&mut hb, program, &mut fold).unwrap();
        assert_eq!(fold.folded_count, 1);

        let mut found = false;
        let mut stats = TreeStats::default();
        walk(&mut hb, program, &mut stats).unwrap();
        if let Some(&count) = stats.by_kind.get("IntLiteral") {
            found = count >= 1;
        }
        assert!(found);
    }

    #[test]
    fn const_fold_leaves_division_by_zero_unfolded() {
        let (_dir, program, mut hb, _sstore) = parse_source("int main(void) { return 1 / 0; }");
        let mut fold = ConstFold::default();
        walk(&mut hb, program, &mut fold).unwrap();
        assert_eq!(fold.folded_count, 0);
    }

    #[test]
    fn printer_renders_every_visited_node_as_a_line() {
        let (_dir, program, mut hb, mut sstore) = parse_source("int main(void) { return 0; }");
        let mut stats = TreeStats::default();
        walk(&mut hb, program, &mut stats).unwrap();

        let mut printer = Printer::new(&mut sstore);
        walk(&mut hb, program, &mut printer).unwrap();
        let output = printer.into_output();
        assert_eq!(output.lines().count() as u64, stats.total_nodes);
        assert!(output.contains("Program"));
        assert!(output.contains("FunctionDef"));
    }

    #[test]
    fn printer_resolves_string_literal_text() {
        let (_dir, program, mut hb, mut sstore) = parse_source("int main(void) { return 0; }");
        let mut printer = Printer::new(&mut sstore);
        walk(&mut hb, program, &mut printer).unwrap();
        let output = printer.into_output();
        assert!(output.contains("IntLiteral 0"));
    }

    #[test]
    fn node_with_empty_next_stmt_is_not_mistaken_for_a_chain() {
        let node = AstNode::ReturnStmt { value: AstId::NONE };
        match node {
            AstNode::ReturnStmt { value } => assert!(value.is_none()),
            _ => panic!("unexpected node"),
        }
    }
}
