//! The loudquiz engines: question rotation, authoring state machine, and
//! paginated listing.
//!
//! Each engine is a stateless wrapper around the store traits from
//! [`loudquiz_core`] — every operation is store-read → decide → store-write,
//! so engine instances can be freely shared across concurrent tasks and
//! across process replicas. Domain-shaped outcomes (not found, forbidden,
//! session expired, pool exhausted) are tagged values on the Ok side; only
//! infrastructure faults travel through [`EngineError`].

pub mod authoring;
pub mod error;
pub mod listing;
pub mod rotation;

pub use error::{EngineError, Result};

#[cfg(test)]
mod tests;
