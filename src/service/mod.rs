//! Contract aggregate orchestration.
//!
//! Functions here sequence the [`crate::engine`] rules and talk to storage only
//! through [`store::ContractStore`], so the whole pipeline runs inside whatever
//! transaction the caller opened.

pub mod contracts;
pub mod statistics;
pub mod store;

pub use store::ContractStore;
