//! Backend row shapes and their translation into view models.
//!
//! - `rows`: typed records exactly as the tables and procedures return them.
//! - `mappers`: total functions from rows to `crate::model` view models.

pub mod mappers;
pub mod rows;
