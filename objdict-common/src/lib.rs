//! Common functionality shared among the objdict crates.
//!
//! This crate holds the in-memory model of a CANopen object dictionary, as produced by
//! `objdict-eds` and consumed by `objdict-build`.
#![warn(missing_docs, missing_copy_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod constants;
pub mod objects;
pub mod utils;

pub use objects::{AccessType, Compound, DictObject, ObjectDictionary, Value, Variable};
