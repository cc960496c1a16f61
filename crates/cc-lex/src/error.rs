use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexError {
    #[error(transparent)]
    Store(#[from] cc_store::StoreError),

    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: u32 },

    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: u32 },

    #[error("empty character literal on line {line}")]
    EmptyCharLiteral { line: u32 },
}
