use thiserror::Error;

#[derive(Debug, Error)]
pub enum HbError {
    #[error("node buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error(transparent)]
    Store(#[from] cc_store::StoreError),

    #[error("slot {0:?} does not hold an AST record")]
    NotAst(crate::Slot),

    #[error("slot {0:?} does not hold a symbol record")]
    NotSymbol(crate::Slot),
}
