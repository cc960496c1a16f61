//! Component C — the token store (TSTORE).
//!
//! A flat file of fixed-size, 8-byte token records written by the lexer and
//! walked by the parser through a cursor. Every record carries its kind plus
//! two [`StringPos`] references into SSTORE (the lexeme text and the
//! originating file name) and a source line for diagnostics.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::StoreError;
use crate::sstore::StringPos;
use crate::token::TokenKind;

pub const RECORD_LEN: u64 = 8;

/// 1-based index into TSTORE. `0` denotes "before the first token" / invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl TokenId {
    pub const INVALID: TokenId = TokenId(0);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub source_pos: StringPos,
    pub file_pos: StringPos,
    pub line: u16,
}

impl Token {
    pub const EOF: Token = Token { kind: TokenKind::Eof, source_pos: StringPos::EMPTY, file_pos: StringPos::EMPTY, line: 0 };

    fn to_bytes(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[0..2].copy_from_slice(&(self.kind as u16).to_le_bytes());
        buf[2..4].copy_from_slice(&self.source_pos.0.to_le_bytes());
        buf[4..6].copy_from_slice(&self.file_pos.0.to_le_bytes());
        buf[6..8].copy_from_slice(&self.line.to_le_bytes());
        buf
    }

    fn from_bytes(buf: [u8; 8]) -> Result<Self, StoreError> {
        let kind_raw = u16::from_le_bytes([buf[0], buf[1]]);
        let kind = TokenKind::from_u16(kind_raw)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown token kind {kind_raw}")))?;
        Ok(Token {
            kind,
            source_pos: StringPos(u16::from_le_bytes([buf[2], buf[3]])),
            file_pos: StringPos(u16::from_le_bytes([buf[4], buf[5]])),
            line: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }
}

pub struct TStore {
    file: File,
    read_only: bool,
    len: u32,
    cursor: u32,
}

impl TStore {
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        Ok(Self { file, read_only: false, len: 0, cursor: 0 })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new().read(true).open(path)?;
        let byte_len = file.seek(SeekFrom::End(0))?;
        let len = (byte_len / RECORD_LEN) as u32;
        Ok(Self { file, read_only: true, len, cursor: 0 })
    }

    pub fn close(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a token, returning its new 1-based id.
    pub fn append(&mut self, token: Token) -> Result<TokenId, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let id = self.len + 1;
        self.file.seek(SeekFrom::Start((id as u64 - 1) * RECORD_LEN))?;
        self.file.write_all(&token.to_bytes())?;
        self.len = id;
        Ok(TokenId(id))
    }

    /// Total function: an out-of-range or zero id reads back [`Token::EOF`]
    /// rather than erroring, matching the store's "total reference" contract.
    pub fn get(&mut self, id: TokenId) -> Result<Token, StoreError> {
        if id.0 == 0 || id.0 > self.len {
            return Ok(Token::EOF);
        }
        self.file.seek(SeekFrom::Start((id.0 as u64 - 1) * RECORD_LEN))?;
        let mut buf = [0u8; 8];
        self.file.read_exact(&mut buf)?;
        Token::from_bytes(buf)
    }

    /// Cursor-based reads for the parser: `next()` advances and returns the
    /// token now under the cursor.
    pub fn next(&mut self) -> Result<Token, StoreError> {
        self.cursor += 1;
        self.get(TokenId(self.cursor))
    }

    pub fn peek(&mut self) -> Result<Token, StoreError> {
        self.get(TokenId(self.cursor + 1))
    }

    pub fn cursor(&self) -> TokenId {
        TokenId(self.cursor)
    }

    pub fn set_cursor(&mut self, id: TokenId) {
        self.cursor = id.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, line: u16) -> Token {
        Token { kind, source_pos: StringPos(0), file_pos: StringPos(0), line }
    }

    #[test]
    fn append_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TStore::init(dir.path().join("t.tstore")).unwrap();
        let a = store.append(tok(TokenKind::Identifier, 1)).unwrap();
        let b = store.append(tok(TokenKind::Semicolon, 1)).unwrap();
        assert_eq!(a.0, 1);
        assert_eq!(b.0, 2);
        assert_eq!(store.get(a).unwrap().kind, TokenKind::Identifier);
        assert_eq!(store.get(b).unwrap().kind, TokenKind::Semicolon);
    }

    #[test]
    fn out_of_range_reads_as_eof() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TStore::init(dir.path().join("t.tstore")).unwrap();
        store.append(tok(TokenKind::Identifier, 1)).unwrap();
        assert_eq!(store.get(TokenId(99)).unwrap().kind, TokenKind::Eof);
        assert_eq!(store.get(TokenId(0)).unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn cursor_walks_forward() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TStore::init(dir.path().join("t.tstore")).unwrap();
        store.append(tok(TokenKind::KwInt, 1)).unwrap();
        store.append(tok(TokenKind::Identifier, 1)).unwrap();
        assert_eq!(store.next().unwrap().kind, TokenKind::KwInt);
        assert_eq!(store.peek().unwrap().kind, TokenKind::Identifier);
        assert_eq!(store.next().unwrap().kind, TokenKind::Identifier);
        assert_eq!(store.next().unwrap().kind, TokenKind::Eof);
    }
}
