//! cc-util — foundation types shared by every cc99 crate.
//!
//! Holds component A (the stable hash in [`hash`]) and the typed-index
//! vector ([`index_vec`]) used by the in-memory side tables that sit next to
//! the file-backed arena stores in `cc-store`.

pub mod hash;
pub mod index_vec;

pub use hash::{fnv1a32, fnv1a64};
pub use index_vec::{Idx, IndexVec};
pub use rustc_hash::{FxHashMap, FxHashSet};
