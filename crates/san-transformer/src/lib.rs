//! Vue to San single-file component transformation.
//!
//! This crate rewrites the two halves of a component:
//!
//! - **Template**: directive attributes are translated to San syntax, loops
//!   combined with conditions are split, and `:class`/`:style` literals are
//!   expanded into interpolations.
//! - **Script**: the component options object is restructured (`data`
//!   becomes `initData`, methods are flattened) and every `this.x` data
//!   access in methods and computed properties becomes a call on the San
//!   data store.
//!
//! # Example
//!
//! ```
//! use san_transformer::{convert_component, ConvertOptions};
//!
//! let source = r#"<template><input v-model="name"></template>"#;
//! let output = convert_component(source, &ConvertOptions::default()).unwrap();
//! assert_eq!(output.code, r#"<template><input value="{= name =}"></template>"#);
//! ```

mod convert;
mod diagnostic;
mod error;
mod options;
pub mod script;
pub mod template;

pub use convert::{convert_component, convert_template, ConvertOutput};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::{ConvertError, RewriteError};
pub use options::ConvertOptions;
pub use script::{translate_script, ScriptOutput};
pub use template::translate_template;
