//! Relational storage for companies, competitors, snapshots and signals.
//!
//! Everything goes through [`IntelStore`], a thin async layer over SeaORM.
//! The schema itself lives in the `migration` crate and is applied when the
//! store is opened.

pub mod entities;
pub mod error;
pub mod store;


pub use error::{Result, StorageError};
pub use store::IntelStore;
