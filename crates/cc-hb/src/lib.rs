//! cc-hb — component F, the demand-paged node buffer.
//!
//! `NodeBuffer` owns both ASTORE and SYMTAB and is the only way the rest of
//! the pipeline (parser, visitors, the eventual TAC generator) touches an
//! AST or symbol record. It keeps a bounded number of records resident in
//! an intrusive LRU list; everything else lives on disk until asked for.
//! Eviction writes a dirty slot back before reusing it, so the stores are
//! never more than one `end()` away from reflecting every mutation made
//! through the buffer.

mod error;

use std::path::Path;

use cc_store::{AStore, AstId, AstRecord, SymTab, Symbol, SymbolId};
use cc_util::FxHashMap;

pub use error::HbError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Ast,
    Sym,
}

/// An opaque handle into the buffer's slab. Stable only until the next
/// eviction touches the same slot index — callers should re-`get` rather
/// than hold a `Slot` across other buffer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot(usize);

#[derive(Clone, Copy)]
enum Record {
    Ast(AstId, AstRecord),
    Sym(SymbolId, Symbol),
}

struct CacheSlot {
    record: Record,
    dirty: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct NodeBuffer {
    astore: AStore,
    symtab: SymTab,
    capacity: usize,
    slots: Vec<Option<CacheSlot>>,
    free: Vec<usize>,
    ast_index: FxHashMap<u32, usize>,
    sym_index: FxHashMap<u32, usize>,
    lru_head: Option<usize>,
    lru_tail: Option<usize>,
}

impl NodeBuffer {
    /// Create the buffer over a fresh ASTORE/SYMTAB pair (lexer/parser
    /// writing a new translation unit).
    pub fn init(astore_path: impl AsRef<Path>, symtab_path: impl AsRef<Path>, capacity: usize) -> Result<Self, HbError> {
        if capacity == 0 {
            return Err(HbError::ZeroCapacity);
        }
        Ok(Self {
            astore: AStore::init(astore_path)?,
            symtab: SymTab::init(symtab_path)?,
            capacity,
            slots: Vec::new(),
            free: Vec::new(),
            ast_index: FxHashMap::default(),
            sym_index: FxHashMap::default(),
            lru_head: None,
            lru_tail: None,
        })
    }

    /// Attach the buffer to already-populated stores (a later pass, e.g.
    /// `cc1t` or `cc2`, reading what `cc1` produced).
    pub fn open(astore_path: impl AsRef<Path>, symtab_path: impl AsRef<Path>, capacity: usize) -> Result<Self, HbError> {
        if capacity == 0 {
            return Err(HbError::ZeroCapacity);
        }
        Ok(Self {
            astore: AStore::open(astore_path)?,
            symtab: SymTab::open(symtab_path)?,
            capacity,
            slots: Vec::new(),
            free: Vec::new(),
            ast_index: FxHashMap::default(),
            sym_index: FxHashMap::default(),
            lru_head: None,
            lru_tail: None,
        })
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let s = self.slots[slot].as_ref().unwrap();
            (s.prev, s.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().unwrap().next = next,
            None => self.lru_head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().unwrap().prev = prev,
            None => self.lru_tail = prev,
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.lru_head;
        {
            let s = self.slots[slot].as_mut().unwrap();
            s.prev = None;
            s.next = old_head;
        }
        if let Some(h) = old_head {
            self.slots[h].as_mut().unwrap().prev = Some(slot);
        }
        self.lru_head = Some(slot);
        if self.lru_tail.is_none() {
            self.lru_tail = Some(slot);
        }
    }

    fn touch(&mut self, slot: usize) {
        self.unlink(slot);
        self.push_front(slot);
    }

    fn resident_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Writes the victim's record back before touching any index or link,
    /// so a failed write-back leaves the entry fully resident rather than
    /// half-evicted.
    fn evict_one(&mut self) -> Result<(), HbError> {
        let victim = match self.lru_tail {
            Some(v) => v,
            None => return Ok(()),
        };
        let (record, dirty) = {
            let cache_slot = self.slots[victim].as_ref().unwrap();
            (cache_slot.record, cache_slot.dirty)
        };
        match record {
            Record::Ast(id, rec) => {
                if dirty {
                    self.astore.update(id, rec)?;
                }
                self.ast_index.remove(&id.0);
            }
            Record::Sym(id, symbol) => {
                if dirty {
                    self.symtab.update(id, symbol)?;
                }
                self.sym_index.remove(&id.0);
            }
        }
        self.unlink(victim);
        self.slots[victim] = None;
        tracing::trace!(slot = victim, "node buffer eviction");
        self.free.push(victim);
        Ok(())
    }

    fn alloc_slot(&mut self, record: Record, dirty: bool) -> Result<usize, HbError> {
        if self.resident_count() >= self.capacity {
            self.evict_one()?;
        }
        let cache_slot = CacheSlot { record, dirty, prev: None, next: None };
        let slot = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(cache_slot);
                i
            }
            None => {
                self.slots.push(Some(cache_slot));
                self.slots.len() - 1
            }
        };
        self.push_front(slot);
        Ok(slot)
    }

    /// Allocate a fresh AST node, writing a placeholder to ASTORE
    /// immediately so the id is stable, and cache it dirty.
    pub fn new_ast(&mut self) -> Result<(AstId, Slot), HbError> {
        let id = self.astore.new_node(AstRecord::default())?;
        let slot = self.alloc_slot(Record::Ast(id, AstRecord::default()), true)?;
        self.ast_index.insert(id.0, slot);
        Ok((id, Slot(slot)))
    }

    pub fn new_symbol(&mut self) -> Result<(SymbolId, Slot), HbError> {
        let id = self.symtab.new_symbol(Symbol::default())?;
        let slot = self.alloc_slot(Record::Sym(id, Symbol::default()), true)?;
        self.sym_index.insert(id.0, slot);
        Ok((id, Slot(slot)))
    }

    /// Total function over ASTORE: returns a slot with the requested id's
    /// record, loading it from disk and evicting if necessary.
    pub fn get_ast(&mut self, id: AstId) -> Result<Slot, HbError> {
        if let Some(&slot) = self.ast_index.get(&id.0) {
            self.touch(slot);
            return Ok(Slot(slot));
        }
        let record = self.astore.get(id)?;
        let slot = self.alloc_slot(Record::Ast(id, record), false)?;
        self.ast_index.insert(id.0, slot);
        Ok(Slot(slot))
    }

    pub fn get_symbol(&mut self, id: SymbolId) -> Result<Slot, HbError> {
        if let Some(&slot) = self.sym_index.get(&id.0) {
            self.touch(slot);
            return Ok(Slot(slot));
        }
        let symbol = self.symtab.get(id)?;
        let slot = self.alloc_slot(Record::Sym(id, symbol), false)?;
        self.sym_index.insert(id.0, slot);
        Ok(Slot(slot))
    }

    pub fn ast(&self, slot: Slot) -> Result<&AstRecord, HbError> {
        match &self.slots[slot.0].as_ref().unwrap().record {
            Record::Ast(_, record) => Ok(record),
            Record::Sym(..) => Err(HbError::NotAst(slot)),
        }
    }

    pub fn ast_mut(&mut self, slot: Slot) -> Result<&mut AstRecord, HbError> {
        match &mut self.slots[slot.0].as_mut().unwrap().record {
            Record::Ast(_, record) => Ok(record),
            Record::Sym(..) => Err(HbError::NotAst(slot)),
        }
    }

    pub fn ast_id(&self, slot: Slot) -> Result<AstId, HbError> {
        match &self.slots[slot.0].as_ref().unwrap().record {
            Record::Ast(id, _) => Ok(*id),
            Record::Sym(..) => Err(HbError::NotAst(slot)),
        }
    }

    pub fn symbol(&self, slot: Slot) -> Result<&Symbol, HbError> {
        match &self.slots[slot.0].as_ref().unwrap().record {
            Record::Sym(_, symbol) => Ok(symbol),
            Record::Ast(..) => Err(HbError::NotSymbol(slot)),
        }
    }

    pub fn symbol_mut(&mut self, slot: Slot) -> Result<&mut Symbol, HbError> {
        match &mut self.slots[slot.0].as_mut().unwrap().record {
            Record::Sym(_, symbol) => Ok(symbol),
            Record::Ast(..) => Err(HbError::NotSymbol(slot)),
        }
    }

    pub fn symbol_id(&self, slot: Slot) -> Result<SymbolId, HbError> {
        match &self.slots[slot.0].as_ref().unwrap().record {
            Record::Sym(id, _) => Ok(*id),
            Record::Ast(..) => Err(HbError::NotSymbol(slot)),
        }
    }

    /// Mark a slot dirty (the caller just mutated it through `ast_mut`/
    /// `symbol_mut`) and bump it to most-recently-used.
    pub fn touched(&mut self, slot: Slot) {
        self.slots[slot.0].as_mut().unwrap().dirty = true;
        self.touch(slot.0);
    }

    /// Persist a slot's record immediately without evicting it.
    pub fn store(&mut self, slot: Slot) -> Result<(), HbError> {
        let cache_slot = self.slots[slot.0].as_mut().unwrap();
        if !cache_slot.dirty {
            return Ok(());
        }
        match cache_slot.record {
            Record::Ast(id, record) => self.astore.update(id, record)?,
            Record::Sym(id, symbol) => self.symtab.update(id, symbol)?,
        }
        self.slots[slot.0].as_mut().unwrap().dirty = false;
        Ok(())
    }

    /// Flush every dirty slot and close the underlying stores.
    pub fn end(&mut self) -> Result<(), HbError> {
        let indices: Vec<usize> = (0..self.slots.len()).filter(|i| self.slots[*i].is_some()).collect();
        for slot in indices {
            self.store(Slot(slot))?;
        }
        self.astore.close()?;
        self.symtab.close()?;
        Ok(())
    }

    pub fn resident(&self) -> usize {
        self.resident_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total AST records ever allocated through this buffer (resident or
    /// not). The root `Program` node of a translation unit is always the
    /// last one `cc-parse` allocates, so a reader opening a finished
    /// ASTORE can recover it as `AstId(ast_len())` without a separate
    /// root pointer on disk.
    pub fn ast_len(&self) -> u32 {
        self.astore.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_store::AstNode;

    fn temp_buffer(capacity: usize) -> (tempfile::TempDir, NodeBuffer) {
        let dir = tempfile::tempdir().unwrap();
        let hb = NodeBuffer::init(dir.path().join("a.astore"), dir.path().join("s.symtab"), capacity).unwrap();
        (dir, hb)
    }

    #[test]
    fn new_then_get_round_trips_through_cache() {
        let (_dir, mut hb) = temp_buffer(8);
        let (id, slot) = hb.new_ast().unwrap();
        hb.ast_mut(slot).unwrap().node = AstNode::IntLiteral { value: 7 };
        hb.touched(slot);
        let slot2 = hb.get_ast(id).unwrap();
        assert_eq!(hb.ast(slot2).unwrap().node, AstNode::IntLiteral { value: 7 });
    }

    #[test]
    fn eviction_writes_back_dirty_records() {
        let (_dir, mut hb) = temp_buffer(2);
        let (id_a, slot_a) = hb.new_ast().unwrap();
        hb.ast_mut(slot_a).unwrap().node = AstNode::IntLiteral { value: 1 };
        hb.touched(slot_a);
        let (_id_b, _slot_b) = hb.new_ast().unwrap();
        let (_id_c, _slot_c) = hb.new_ast().unwrap();
        assert!(hb.resident() <= 2);
        let slot_a2 = hb.get_ast(id_a).unwrap();
        assert_eq!(hb.ast(slot_a2).unwrap().node, AstNode::IntLiteral { value: 1 });
    }

    #[test]
    fn capacity_never_exceeds_configured_bound() {
        let (_dir, mut hb) = temp_buffer(3);
        for _ in 0..20 {
            hb.new_ast().unwrap();
        }
        assert!(hb.resident() <= 3);
    }

    #[test]
    fn end_persists_everything_for_a_later_open() {
        let dir = tempfile::tempdir().unwrap();
        let astore_path = dir.path().join("a.astore");
        let symtab_path = dir.path().join("s.symtab");
        let id;
        {
            let mut hb = NodeBuffer::init(&astore_path, &symtab_path, 4).unwrap();
            let (new_id, slot) = hb.new_ast().unwrap();
            id = new_id;
            hb.ast_mut(slot).unwrap().node = AstNode::BreakStmt;
            hb.touched(slot);
            hb.end().unwrap();
        }
        let mut hb2 = NodeBuffer::open(&astore_path, &symtab_path, 4).unwrap();
        let slot = hb2.get_ast(id).unwrap();
        assert_eq!(hb2.ast(slot).unwrap().node, AstNode::BreakStmt);
    }

    proptest::proptest! {
        /// No matter how many nodes are allocated against a buffer of a
        /// given capacity, resident count never exceeds it, and every
        /// value written before eviction is still readable afterward
        /// (eviction must have written it back rather than dropping it).
        #[test]
        fn capacity_holds_and_values_survive_eviction(capacity in 1usize..8, values in proptest::collection::vec(proptest::prelude::any::<i64>(), 1..40)) {
            let dir = tempfile::tempdir().unwrap();
            let mut hb = NodeBuffer::init(dir.path().join("a.astore"), dir.path().join("s.symtab"), capacity).unwrap();
            let mut ids = Vec::new();
            for v in &values {
                let (id, slot) = hb.new_ast().unwrap();
                hb.ast_mut(slot).unwrap().node = AstNode::IntLiteral { value: *v };
                hb.touched(slot);
                ids.push(id);
                proptest::prop_assert!(hb.resident() <= capacity);
            }
            for (id, v) in ids.iter().zip(&values) {
                let slot = hb.get_ast(*id).unwrap();
                proptest::prop_assert_eq!(hb.ast(slot).unwrap().node, AstNode::IntLiteral { value: *v });
            }
        }
    }
}
