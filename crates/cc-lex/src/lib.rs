//! cc-lex — a supplemented C99-subset lexer.
//!
//! Not part of the original component list: the stores and the parser treat
//! a token stream as externally supplied, but something has to put one in
//! SSTORE/TSTORE for the rest of the pipeline to read, and the `cc0` binary
//! needs an implementation behind it. This is a pragmatic tokenizer, not a
//! hardened preprocessor-aware C lexer — no macro expansion, no trigraphs,
//! no line splicing. Grounded on `faxc-lex`'s cursor/identifier/number
//! module split, retargeted to C99 token rules.

pub mod cursor;
mod error;

use cc_diag::{Diagnostic, ErrorSink, Kind, Severity, SourceLocation, Stage};
use cc_store::{SStore, TStore, Token, TokenKind};

pub use error::LexError;

use cursor::Cursor;

/// Tokenize `source` into `tstore`/`sstore`, recording unrecoverable lexical
/// errors in `sink` and skipping the offending character so lexing can
/// continue (spec.md §7's "continue past the failure" recovery policy).
pub fn lex(source: &str, file_name: &str, sstore: &mut SStore, tstore: &mut TStore, sink: &mut ErrorSink) -> Result<(), LexError> {
    let file_pos = sstore.intern(file_name.as_bytes())?;
    let mut cursor = Cursor::new(source);

    loop {
        skip_trivia(&mut cursor, sink)?;
        if cursor.is_eof() {
            break;
        }
        let line = cursor.line();
        let start = cursor.position();
        let c = cursor.current().unwrap();

        let (kind, text_pos) = if is_ident_start(c) {
            lex_identifier(&mut cursor, sstore)?
        } else if c.is_ascii_digit() {
            lex_number(&mut cursor, sstore)?
        } else if c == '"' {
            lex_string(&mut cursor, sstore, line, sink)?
        } else if c == '\'' {
            lex_char(&mut cursor, sstore, line, sink)?
        } else if let Some((kind, len)) = lex_punctuator(&cursor) {
            for _ in 0..len {
                cursor.advance();
            }
            let lexeme = cursor.slice_from(start);
            (kind, sstore.intern(lexeme.as_bytes())?)
        } else {
            sink.report(
                Diagnostic::new(Severity::Error, Kind::Syntax, Stage::Lex, 1, format!("unexpected character '{c}'"))
                    .with_location(SourceLocation { token_index: 0, file_name: Some(file_name.to_string()), line }),
            );
            cursor.advance();
            continue;
        };

        tstore.append(Token { kind, source_pos: text_pos, file_pos, line: line.min(u16::MAX as u32) as u16 })?;
    }

    tstore.append(Token { kind: TokenKind::Eof, source_pos: cc_store::StringPos::EMPTY, file_pos, line: cursor.line().min(u16::MAX as u32) as u16 })?;
    Ok(())
}

fn skip_trivia(cursor: &mut Cursor, sink: &mut ErrorSink) -> Result<(), LexError> {
    loop {
        match cursor.current() {
            Some(c) if c.is_whitespace() => {
                cursor.advance();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                cursor.bump_while(|c| c != '\n');
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                let line = cursor.line();
                cursor.advance();
                cursor.advance();
                let mut closed = false;
                while !cursor.is_eof() {
                    if cursor.current() == Some('*') && cursor.peek_at(1) == Some('/') {
                        cursor.advance();
                        cursor.advance();
                        closed = true;
                        break;
                    }
                    cursor.advance();
                }
                if !closed {
                    let _ = sink; // comment errors are diagnosed, not fatal
                    return Err(LexError::UnterminatedComment { line });
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex_identifier(cursor: &mut Cursor, sstore: &mut SStore) -> Result<(TokenKind, cc_store::StringPos), LexError> {
    let start = cursor.position();
    cursor.bump_while(is_ident_continue);
    let text = cursor.slice_from(start);
    let kind = TokenKind::keyword_from_str(text).unwrap_or(TokenKind::Identifier);
    Ok((kind, sstore.intern(text.as_bytes())?))
}

fn lex_number(cursor: &mut Cursor, sstore: &mut SStore) -> Result<(TokenKind, cc_store::StringPos), LexError> {
    let start = cursor.position();
    let mut is_float = false;

    if cursor.current() == Some('0') && matches!(cursor.peek_at(1), Some('x') | Some('X')) {
        cursor.advance();
        cursor.advance();
        cursor.bump_while(|c| c.is_ascii_hexdigit());
        cursor.bump_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        let text = cursor.slice_from(start);
        return Ok((TokenKind::IntLiteral, sstore.intern(text.as_bytes())?));
    }

    cursor.bump_while(|c| c.is_ascii_digit());
    if cursor.current() == Some('.') {
        is_float = true;
        cursor.advance();
        cursor.bump_while(|c| c.is_ascii_digit());
    }
    if matches!(cursor.current(), Some('e') | Some('E')) {
        is_float = true;
        cursor.advance();
        if matches!(cursor.current(), Some('+') | Some('-')) {
            cursor.advance();
        }
        cursor.bump_while(|c| c.is_ascii_digit());
    }
    // integer/float suffixes: u, U, l, L, f, F
    if matches!(cursor.current(), Some('f') | Some('F')) {
        is_float = true;
        cursor.advance();
    } else {
        cursor.bump_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    }
    let text = cursor.slice_from(start);
    let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral };
    Ok((kind, sstore.intern(text.as_bytes())?))
}

fn lex_string(cursor: &mut Cursor, sstore: &mut SStore, line: u32, _sink: &mut ErrorSink) -> Result<(TokenKind, cc_store::StringPos), LexError> {
    cursor.advance(); // opening quote
    let mut content = String::new();
    loop {
        match cursor.current() {
            None | Some('\n') => return Err(LexError::UnterminatedString { line }),
            Some('"') => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                cursor.advance();
                if let Some(escaped) = cursor.current() {
                    content.push(unescape(escaped));
                    cursor.advance();
                }
            }
            Some(c) => {
                content.push(c);
                cursor.advance();
            }
        }
    }
    Ok((TokenKind::StringLiteral, sstore.intern(content.as_bytes())?))
}

fn lex_char(cursor: &mut Cursor, sstore: &mut SStore, line: u32, _sink: &mut ErrorSink) -> Result<(TokenKind, cc_store::StringPos), LexError> {
    cursor.advance(); // opening quote
    let value = match cursor.current() {
        None | Some('\'') => return Err(LexError::EmptyCharLiteral { line }),
        Some('\\') => {
            cursor.advance();
            let escaped = cursor.current().unwrap_or('\0');
            cursor.advance();
            unescape(escaped)
        }
        Some(c) => {
            cursor.advance();
            c
        }
    };
    if cursor.current() == Some('\'') {
        cursor.advance();
    }
    let mut buf = [0u8; 4];
    let bytes = value.encode_utf8(&mut buf).as_bytes();
    Ok((TokenKind::CharLiteral, sstore.intern(bytes)?))
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        other => other,
    }
}

/// Maximal-munch punctuator table, longest prefixes first.
fn lex_punctuator(cursor: &Cursor) -> Option<(TokenKind, usize)> {
    use TokenKind::*;
    let three: Option<(char, char, char)> = match (cursor.current(), cursor.peek_at(1), cursor.peek_at(2)) {
        (Some(a), Some(b), Some(c)) => Some((a, b, c)),
        _ => None,
    };
    if let Some((a, b, c)) = three {
        if (a, b, c) == ('.', '.', '.') {
            return Some((Ellipsis, 3));
        }
    }
    let two = match (cursor.current(), cursor.peek_at(1)) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    };
    if let Some((a, b)) = two {
        let kind = match (a, b) {
            ('+', '+') => Some(PlusPlus),
            ('-', '-') => Some(MinusMinus),
            ('-', '>') => Some(Arrow),
            ('<', '=') => Some(LessEq),
            ('>', '=') => Some(GreaterEq),
            ('=', '=') => Some(EqEq),
            ('!', '=') => Some(NotEq),
            ('&', '&') => Some(AmpAmp),
            ('|', '|') => Some(PipePipe),
            ('<', '<') => Some(Shl),
            ('>', '>') => Some(Shr),
            ('+', '=') => Some(PlusEq),
            ('-', '=') => Some(MinusEq),
            ('*', '=') => Some(StarEq),
            ('/', '=') => Some(SlashEq),
            ('%', '=') => Some(PercentEq),
            _ => None,
        };
        if let Some(kind) = kind {
            return Some((kind, 2));
        }
    }
    let one = cursor.current()?;
    let kind = match one {
        '(' => LParen,
        ')' => RParen,
        '{' => LBrace,
        '}' => RBrace,
        '[' => LBracket,
        ']' => RBracket,
        ';' => Semicolon,
        ',' => Comma,
        '.' => Dot,
        '+' => Plus,
        '-' => Minus,
        '!' => Bang,
        '~' => Tilde,
        '*' => Star,
        '&' => Amp,
        '/' => Slash,
        '%' => Percent,
        '<' => Less,
        '>' => Greater,
        '?' => Question,
        ':' => Colon,
        '=' => Assign,
        '|' => Pipe,
        '^' => Caret,
        _ => return None,
    };
    Some((kind, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(source: &str) -> Vec<TokenKind> {
        let dir = tempfile::tempdir().unwrap();
        let mut sstore = SStore::init(dir.path().join("s.sstore")).unwrap();
        let mut tstore = TStore::init(dir.path().join("t.tstore")).unwrap();
        let mut sink = ErrorSink::new(cc_diag::ErrorConfig::default());
        lex(source, "t.c", &mut sstore, &mut tstore, &mut sink).unwrap();
        let mut kinds = Vec::new();
        for i in 1..=tstore.len() {
            kinds.push(tstore.get(cc_store::TokenId(i)).unwrap().kind);
        }
        kinds
    }

    #[test]
    fn keywords_and_identifiers_are_distinguished() {
        let kinds = lex_ok("int x;");
        assert_eq!(kinds, vec![TokenKind::KwInt, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]);
    }

    #[test]
    fn maximal_munch_prefers_longer_operators() {
        let kinds = lex_ok("a <= b");
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::LessEq, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn comments_are_skipped() {
        let kinds = lex_ok("/* c */ int /* d */ x; // trailing\n");
        assert_eq!(kinds, vec![TokenKind::KwInt, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]);
    }

    #[test]
    fn hex_literal_is_a_single_token_not_digit_plus_identifier() {
        let kinds = lex_ok("0x1f");
        assert_eq!(kinds, vec![TokenKind::IntLiteral, TokenKind::Eof]);
    }

    #[test]
    fn octal_literal_is_a_single_int_literal_token() {
        let kinds = lex_ok("0755");
        assert_eq!(kinds, vec![TokenKind::IntLiteral, TokenKind::Eof]);
    }

    #[test]
    fn float_literals_are_distinguished_from_int_literals() {
        let kinds = lex_ok("1 1.5 1e3 1.0f");
        assert_eq!(
            kinds,
            vec![TokenKind::IntLiteral, TokenKind::FloatLiteral, TokenKind::FloatLiteral, TokenKind::FloatLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn string_and_char_literals_round_trip_their_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut sstore = SStore::init(dir.path().join("s.sstore")).unwrap();
        let mut tstore = TStore::init(dir.path().join("t.tstore")).unwrap();
        let mut sink = ErrorSink::new(cc_diag::ErrorConfig::default());
        lex("\"hi\\n\" 'a'", "t.c", &mut sstore, &mut tstore, &mut sink).unwrap();
        let string_tok = tstore.get(cc_store::TokenId(1)).unwrap();
        let mut buf = Vec::new();
        sstore.get(string_tok.source_pos, &mut buf).unwrap();
        assert_eq!(buf, b"hi\n");
    }
}
