use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Store(#[from] cc_store::StoreError),

    #[error(transparent)]
    Hb(#[from] cc_hb::HbError),

    #[error("parsing aborted: too many syntax errors")]
    Aborted,
}
