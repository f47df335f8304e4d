//! Shared substrate for the go-bindgen code generators.
//!
//! The guest- and host-side emitters both build on what lives here: the
//! output buffers ([`Source`], [`Files`]), the call-frame layout rules
//! ([`layout`], [`align_up`]), the import-symbol mangler ([`mangle`]), the
//! specification data model ([`TypeDescriptor`], [`FuncBinding`],
//! [`TypeRegistry`]) and the diagnostic accumulator that carries the
//! best-effort error contract through a whole generation pass.

mod source;

mod diag;
mod layout;
mod mangle;
mod ns;
mod types;

pub use diag::{Diagnostic, Diagnostics, RegistryError};
pub use layout::{align_up, layout, AlignExpr, ArgSlot};
pub use mangle::{mangle, stub_name, STUB_PREFIX};
pub use ns::Ns;
pub use source::{Files, Source};
pub use types::{
    resolve_binding, FuncBinding, ResolvedBinding, Template, TypeDescriptor, TypeRegistry,
    UNRESOLVED,
};

/// Marker stamped at the top of every generated unit. Deliberately carries
/// no timestamp: output must be byte-identical across runs.
pub const BANNER: &str = "// Code generated by go-bindgen. DO NOT EDIT.";
