//! cc-store — the file-backed arena stores (components B, C, D, E).
//!
//! Every store here is an append-only (or append-then-patch) flat file of
//! fixed-size records, addressed by a 1-based typed index rather than kept
//! in memory. `get` on any store is a total function: an invalid or
//! out-of-range id reads back a zero-initialized record instead of
//! erroring, so callers downstream (the parser, the TAC interpreter) don't
//! need a separate "not found" branch on every lookup.

pub mod astore;
pub mod error;
pub mod sstore;
pub mod symtab;
pub mod token;
pub mod tstore;

pub use astore::{AStore, AstId, AstNode, AstRecord, Declaration, NodeFlags, StorageClass, TypeBase, TypeQualifiers};
pub use error::StoreError;
pub use sstore::{SStore, StringPos};
pub use symtab::{Symbol, SymbolExtra, SymbolFlags, SymbolId, SymbolKind, SymTab};
pub use token::TokenKind;
pub use tstore::{TStore, Token, TokenId};
