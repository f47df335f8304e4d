//! The two declarative input shapes the external loader feeds the generator,
//! and the registry-population rules tied to them.
//!
//! A parse failure is fatal for that document only; the loader reports it
//! and moves on to the next specification file.

use anyhow::{Context, Result};
use go_bindgen_core::{FuncBinding, Template, TypeDescriptor, TypeRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One entry of a type specification set, as written in a spec file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRecord {
    pub external_repr: String,
    /// Defaults to `externalRepr` when omitted.
    #[serde(default)]
    pub internal_repr: Option<String>,
    pub native_repr: String,
    #[serde(default)]
    pub conversion: Option<String>,
    #[serde(default)]
    pub reference_expr: Option<String>,
    #[serde(default)]
    pub push_expr: Option<String>,
    /// Explicit byte alignment; `0` counts as unset.
    #[serde(default)]
    pub alignment: Option<u32>,
    /// Keep the qualified name but register no import requirement.
    #[serde(default)]
    pub skip_import: bool,
    /// Extra guest import paths required wherever the type is used.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Native forward declarations/includes hoisted into the C unit.
    #[serde(default)]
    pub native_declarations: Vec<String>,
}

/// Parses a type specification document.
pub fn parse_types(json: &str) -> Result<BTreeMap<String, TypeRecord>> {
    serde_json::from_str(json).context("malformed type specification")
}

/// Parses a binding specification document.
pub fn parse_bindings(json: &str) -> Result<BTreeMap<String, FuncBinding>> {
    serde_json::from_str(json).context("malformed binding specification")
}

/// Registers the types of one specification document, declared in
/// `namespace`.
///
/// A name with a leading `.` is local: registered under its bare name, never
/// namespace-qualified, and contributing no import requirement. Every other
/// type is registered under `namespace/name` and, unless `skipImport` is
/// set, requires an import of its declaring namespace wherever it is used.
pub fn register_types(
    registry: &mut TypeRegistry,
    namespace: &str,
    records: BTreeMap<String, TypeRecord>,
) -> Result<()> {
    for (name, record) in records {
        let local = name.strip_prefix('.');
        let qualified_name = match local {
            Some(bare) => bare.to_string(),
            None => format!("{namespace}/{name}"),
        };

        let mut imports = record.imports;
        if local.is_none() && !record.skip_import {
            imports.push(namespace.to_string());
        }

        let internal_repr = record
            .internal_repr
            .unwrap_or_else(|| record.external_repr.clone());

        registry
            .insert(TypeDescriptor {
                qualified_name,
                external_repr: record.external_repr,
                internal_repr,
                native_repr: record.native_repr,
                conversion: Template::from_spec(record.conversion.as_deref().unwrap_or("")),
                reference: Template::from_spec(record.reference_expr.as_deref().unwrap_or("")),
                push: Template::from_spec(record.push_expr.as_deref().unwrap_or("")),
                alignment: record.alignment.filter(|align| *align > 0),
                imports,
                declarations: record.native_declarations,
            })
            .with_context(|| format!("registering types of `{namespace}`"))?;
    }
    Ok(())
}
