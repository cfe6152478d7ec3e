//! Intermediate Representation (IR) for native bindings
//!
//! This module provides the declaration model consumed from the header
//! parser, the type mapping to C#, and the symbol structures produced for
//! the glue and binding layers.

pub mod collect;
pub mod decl;
pub mod symbol;
pub mod types;

pub use collect::*;
pub use decl::*;
pub use symbol::*;
pub use types::*;
