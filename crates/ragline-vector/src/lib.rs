//! Index gateway implementations.
//!
//! [`LanceIndex`] persists documents and vectors in LanceDB; [`MemoryIndex`]
//! keeps them in process. Both search by cosine similarity and assign
//! `doc_{n}` ids from a collection-scoped counter when the caller gives none.

mod lance;
mod memory;
pub mod schema;
pub mod table;
pub mod validate;

pub use lance::LanceIndex;
pub use memory::{cosine_similarity, MemoryIndex};
