//! Media storage.
//!
//! Uploaded files are addressed by key (e.g. `cp7.jpg`) and exposed to clients
//! through a public URL. The local filesystem backend is served by the router
//! under `/media/`.

mod error;
mod local;
mod traits;

pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use traits::Storage;
