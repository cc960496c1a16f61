//! Block-scoped symbol resolution.
//!
//! A flat stack of `(name, symbol)` pairs scanned linearly on lookup,
//! per spec.md §4.G — deliberately not a tree of per-block scope objects
//! (contrast `faxc-sem/src/scope.rs`'s `Rib`/`RibId` rib tree). Entering a
//! block pushes a marker; leaving one truncates back to it, which is all
//! "close a scope" means here since SYMTAB itself is append-only and keeps
//! every declaration for later inspection (`cc1t`) regardless of visibility.

use cc_store::{StringPos, SymbolId};

pub struct Scopes {
    visible: Vec<(StringPos, SymbolId)>,
    markers: Vec<usize>,
    depth: u32,
}

impl Scopes {
    pub fn new() -> Self {
        Self { visible: Vec::new(), markers: vec![0], depth: 0 }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn enter(&mut self) {
        self.markers.push(self.visible.len());
        self.depth += 1;
    }

    pub fn leave(&mut self) {
        let mark = self.markers.pop().expect("scope underflow");
        self.visible.truncate(mark);
        self.depth -= 1;
    }

    /// `true` if `name` is already declared in the *current* block —
    /// a redeclaration, not a shadow of an outer scope.
    pub fn declared_in_current_scope(&self, name: StringPos) -> bool {
        let mark = *self.markers.last().unwrap();
        self.visible[mark..].iter().any(|(n, _)| *n == name)
    }

    pub fn declare(&mut self, name: StringPos, symbol: SymbolId) {
        self.visible.push((name, symbol));
    }

    /// Most recent still-visible declaration of `name`, innermost scope
    /// first — exactly the "shadowing" a reverse linear scan gives for
    /// free.
    pub fn resolve(&self, name: StringPos) -> Option<SymbolId> {
        self.visible.iter().rev().find(|(n, _)| *n == name).map(|(_, s)| *s)
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_declaration_shadows_outer() {
        let mut scopes = Scopes::new();
        scopes.declare(StringPos(5), SymbolId(1));
        scopes.enter();
        scopes.declare(StringPos(5), SymbolId(2));
        assert_eq!(scopes.resolve(StringPos(5)), Some(SymbolId(2)));
        scopes.leave();
        assert_eq!(scopes.resolve(StringPos(5)), Some(SymbolId(1)));
    }

    #[test]
    fn redeclaration_in_same_scope_is_detected() {
        let mut scopes = Scopes::new();
        scopes.declare(StringPos(5), SymbolId(1));
        assert!(scopes.declared_in_current_scope(StringPos(5)));
    }

    #[test]
    fn unresolved_name_is_none() {
        let scopes = Scopes::new();
        assert_eq!(scopes.resolve(StringPos(99)), None);
    }
}
