//! Guest-side emitter: for each namespace this produces the wrapper unit
//! (bodyless import-stub declarations plus typed wrapper functions) and the
//! stub unit (the `CallImport` assembly thunks the guest linker resolves
//! against the host's import table).

use go_bindgen_core::{
    stub_name, uwrite, uwriteln, Diagnostic, Diagnostics, ResolvedBinding, Source, TypeDescriptor,
    BANNER,
};
use std::collections::BTreeSet;
use std::fmt::Write;

pub struct Guest {
    namespace: String,
    package: String,
    build_tags: Option<String>,
    src: Source,
    stub: String,
    imports: BTreeSet<String>,
}

impl Guest {
    pub fn new(namespace: &str, build_tags: Option<&str>) -> Guest {
        Guest {
            package: package_of(namespace).to_string(),
            namespace: namespace.to_string(),
            build_tags: build_tags.map(str::to_string),
            src: Source::default(),
            stub: String::new(),
            imports: BTreeSet::new(),
        }
    }

    /// Emits the import stub (thunk plus declaration) and, unless the binding
    /// is stub-only, the typed wrapper for one binding.
    pub fn bind(&mut self, b: &ResolvedBinding<'_>, diags: &mut Diagnostics) {
        let stub = stub_name(b.name);

        uwrite!(
            self.stub,
            "TEXT ·{stub}(SB), NOSPLIT, $0\n\tCallImport\n\tRET\n\n"
        );

        for ty in b.args.iter().map(|(_, ty)| *ty).chain(b.ret) {
            for imp in &ty.imports {
                if *imp != self.namespace {
                    self.imports.insert(imp.clone());
                }
            }
        }

        // The declaration has no body: the thunk above is what the guest
        // linker replaces with the actual import call-out.
        uwrite!(self.src, "func {stub}(");
        self.push_params(&b.args, true, 0);
        self.src.push_str(")");
        if let Some(ret) = b.ret {
            uwrite!(self.src, " {}", display_type(&self.package, &ret.internal_repr));
        }
        self.src.push_str("\n\n");

        if b.func.stub_only {
            return;
        }

        if let Some(comment) = &b.func.comment {
            uwriteln!(self.src, "// {comment}");
        }

        let mut rest = 0;
        let mut receiver = None;
        if b.func.method_style {
            match b.args.first() {
                Some(first) => {
                    receiver = Some(first);
                    rest = 1;
                }
                None => diags.push(Diagnostic::MalformedBinding {
                    binding: b.label(&self.namespace),
                    reason: "method-style binding has no receiver argument".to_string(),
                }),
            }
        }

        match receiver {
            Some((name, ty)) => uwrite!(
                self.src,
                "func ({name} {}) {}(",
                display_type(&self.package, &ty.external_repr),
                b.name
            ),
            None => uwrite!(self.src, "func {}(", b.name),
        }
        self.push_params(&b.args, false, rest);
        self.src.push_str(")");
        if let Some(ret) = b.ret {
            uwrite!(self.src, " {}", display_type(&self.package, &ret.external_repr));
        }
        self.src.push_str(" {\n");

        // One converted local per argument, receiver included; the stub is
        // then called over internal representations only.
        for (name, ty) in &b.args {
            uwriteln!(self.src, "_{name} := {}", ty.conversion.apply(name));
        }
        if b.ret.is_some() {
            uwrite!(self.src, "_r := {stub}(");
        } else {
            uwrite!(self.src, "{stub}(");
        }
        for (i, (name, _)) in b.args.iter().enumerate() {
            if i > 0 {
                self.src.push_str(", ");
            }
            uwrite!(self.src, "_{name}");
        }
        self.src.push_str(")\n");
        if let Some(ret) = b.ret {
            uwriteln!(self.src, "return {}", ret.conversion.apply("_r"));
        }
        self.src.push_str("}\n\n");
    }

    fn push_params(&mut self, args: &[(&str, &TypeDescriptor)], internal: bool, from: usize) {
        for (i, (name, ty)) in args.iter().enumerate().skip(from) {
            if i > from {
                self.src.push_str(", ");
            }
            let repr = if internal {
                &ty.internal_repr
            } else {
                &ty.external_repr
            };
            uwrite!(self.src, "{name} {}", display_type(&self.package, repr));
        }
    }

    /// Assembles the wrapper and stub units, hoisting the deduplicated
    /// import block (own namespace excluded) above the wrappers.
    pub fn finish(self) -> (String, String) {
        let mut wrapper = String::new();
        uwriteln!(wrapper, "{BANNER}");
        wrapper.push('\n');
        self.push_tags(&mut wrapper);
        uwriteln!(wrapper, "package {}", self.package);
        wrapper.push('\n');
        if !self.imports.is_empty() {
            uwriteln!(wrapper, "import (");
            for imp in &self.imports {
                uwriteln!(wrapper, "  \"{imp}\"");
            }
            uwriteln!(wrapper, ")");
            wrapper.push('\n');
        }
        wrapper.push_str(&self.src);

        let mut stub = String::new();
        uwriteln!(stub, "{BANNER}");
        stub.push('\n');
        self.push_tags(&mut stub);
        uwriteln!(stub, "#include \"textflag.h\"");
        stub.push('\n');
        stub.push_str(&self.stub);
        (wrapper, stub)
    }

    fn push_tags(&self, out: &mut String) {
        if let Some(tags) = &self.build_tags {
            uwriteln!(out, "//go:build {tags}");
            uwriteln!(out, "// +build {tags}");
            out.push('\n');
        }
    }
}

fn package_of(namespace: &str) -> &str {
    namespace.rsplit('/').next().unwrap_or(namespace)
}

/// Displays a guest type name relative to the unit's package: only the last
/// path segment is kept, and a qualifier naming the package itself is
/// stripped (`image.RGBA` reads as `RGBA` inside package `image`).
fn display_type(package: &str, repr: &str) -> String {
    let base = repr.rsplit('/').next().unwrap_or(repr);
    match base.strip_prefix(package) {
        Some(rest) if rest.starts_with('.') => rest[1..].to_string(),
        _ => base.to_string(),
    }
}
