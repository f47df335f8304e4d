//! go-bindgen generates the import glue of a wasm2c-hosted Go runtime.
//!
//! Given a populated [`TypeRegistry`] and a set of binding specifications
//! grouped by namespace directory, [`Bindgen::generate`] emits three
//! coordinated artifacts per binding:
//!
//! - an import stub in the guest convention (a bodyless declaration plus a
//!   `CallImport` assembly thunk) that performs the host call-out,
//! - a typed guest wrapper performing value conversions around that stub,
//! - a native C trampoline reading arguments out of the runtime's
//!   linear-memory call frame at aligned offsets, invoking the real native
//!   function and writing the result back.
//!
//! The generator is best-effort: specification errors become [`Diagnostic`]s
//! returned beside the output, and everything unaffected still emits. Given
//! the same inputs it produces byte-identical output; every collection it
//! iterates for emission is ordered.
//!
//! Scanning directories for specification files, invoking compilers and
//! writing the produced [`Files`] to disk belong to the caller.

mod spec;

use go_bindgen_core::resolve_binding;
use go_bindgen_gen_guest::Guest;
use go_bindgen_gen_host::Host;
use std::collections::BTreeMap;

pub use go_bindgen_core::{
    align_up, mangle, Diagnostic, Diagnostics, Files, FuncBinding, RegistryError, Template,
    TypeDescriptor, TypeRegistry,
};
pub use spec::{parse_bindings, parse_types, register_types, TypeRecord};

/// The bindings of one namespace, keyed by display name. A `BTreeMap` so
/// emission order is a property of the names, not of insertion order.
pub type BindingSet = BTreeMap<String, FuncBinding>;

#[derive(Debug, Clone)]
pub struct Opts {
    /// Module identifier prefixed to every relative namespace directory;
    /// participates in type lookup and in the mangled symbol's namespace
    /// segment.
    pub module: String,
    /// Bytes the runtime reserves at the start of a call frame, before the
    /// first argument.
    pub frame_header: u32,
    /// Build-constraint tag stamped into the generated guest units.
    pub build_tags: Option<String>,
}

impl Default for Opts {
    fn default() -> Opts {
        Opts {
            module: String::new(),
            frame_header: 8,
            build_tags: None,
        }
    }
}

impl Opts {
    pub fn build(self) -> Bindgen {
        Bindgen { opts: self }
    }
}

pub struct Bindgen {
    opts: Opts,
}

impl Bindgen {
    /// Generates all three artifact streams into `files`: one
    /// `bindings.go`/`bindings.s` pair per namespace directory and a single
    /// aggregated `bindings.c` at the root.
    ///
    /// `packages` maps namespace directories (relative to the project root;
    /// `""` or `"."` for the root itself) to their binding sets. The registry
    /// is read-only here — it was populated by the specification loader
    /// before generation began.
    pub fn generate(
        &mut self,
        registry: &TypeRegistry,
        packages: &BTreeMap<String, BindingSet>,
        files: &mut Files,
    ) -> Diagnostics {
        let mut diags = Diagnostics::default();
        let mut host = Host::new(self.opts.frame_header);

        for (dir, bindings) in packages {
            let namespace = self.namespace_of(dir);
            log::debug!("generating bindings for `{namespace}`");
            let mut guest = Guest::new(&namespace, self.opts.build_tags.as_deref());
            for (name, func) in bindings {
                log::debug!("{namespace}.{name} -> {}", func.call);
                let resolved = resolve_binding(registry, &namespace, name, func, &mut diags);
                guest.bind(&resolved, &mut diags);
                host.trampoline(&namespace, &resolved, &mut diags);
            }
            let (wrapper, stub) = guest.finish();
            files.push(&unit_path(dir, "bindings.go"), wrapper.as_bytes());
            files.push(&unit_path(dir, "bindings.s"), stub.as_bytes());
        }

        files.push("bindings.c", host.finish().as_bytes());
        diags
    }

    fn namespace_of(&self, dir: &str) -> String {
        if dir.is_empty() || dir == "." {
            self.opts.module.clone()
        } else {
            format!("{}/{dir}", self.opts.module)
        }
    }
}

fn unit_path(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}
