use cc_store::AstId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisitError {
    #[error(transparent)]
    Hb(#[from] cc_hb::HbError),

    #[error("cycle detected while walking node {0:?}")]
    CycleDetected(AstId),

    #[error("AST walk exceeded the maximum traversal depth")]
    DepthExceeded,
}
