//! Code generation for native bindings
//!
//! This module provides emitters for:
//! - The C++ glue translation unit (`extern "C"` exports)
//! - C# `[DllImport]` declarations and disposable wrapper classes
//! - Document assembly for both output files

pub mod binding;
pub mod document;
pub mod glue;

pub use binding::{BindingClassRenderer, BindingEmitter};
pub use document::{BindingDocument, CodeWriter, GlueDocument, AUTOGENERATED_BANNER};
pub use glue::GlueEmitter;
