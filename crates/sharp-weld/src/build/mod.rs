//! Build utilities for generated bindings
//!
//! This module provides the file-writing side of generation:
//! - BindingsBuilder for wiring a parser, the generator and output paths

pub mod bindings;

pub use bindings::{BindingsBuilder, BuildError, BuildOutput};
