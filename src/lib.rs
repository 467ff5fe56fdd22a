//! Data-access layer for the campus activity app.
//!
//! Operations in [`ops`] talk to the hosted database through a [`Backend`]
//! handle, funnel every round trip through [`normalize`], and map rows into
//! the view models in [`model`].

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod fanout;
pub mod model;
pub mod normalize;
pub mod ops;
pub mod tokens;

pub use backend::{Backend, BackendClient};
pub use error::{DataError, DataResult, Envelope};
