//! Core types and trait definitions for the loudquiz trivia bot.
//!
//! This crate is deliberately free of transport and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod form;
pub mod question;
pub mod store;

pub use error::{Error, Result};
