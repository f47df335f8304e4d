//! Host-side emitter: one aggregated C unit holding, per binding, a static
//! trampoline that walks the guest call frame, invokes the real native
//! function, writes the result back, and exposes itself through a
//! function-pointer slot named by the mangled import symbol.

use go_bindgen_core::{
    layout, mangle, stub_name, uwrite, uwriteln, AlignExpr, Diagnostic, Diagnostics, Ns,
    ResolvedBinding, Source, BANNER,
};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Linear memory exported by the compiled guest runtime.
const MEMORY: &str = "Z_mem";
/// Stack-pointer accessor exported by the compiled guest runtime.
const GETSP: &str = "Z_getspZ_iv";

pub struct Host {
    frame_header: u32,
    src: Source,
    declarations: BTreeSet<String>,
    names: Ns,
}

impl Host {
    pub fn new(frame_header: u32) -> Host {
        Host {
            frame_header,
            src: Source::default(),
            declarations: BTreeSet::new(),
            names: Ns::default(),
        }
    }

    /// Emits the trampoline and import slot for one binding. A mangled-name
    /// collision is diagnosed before any text is committed and the binding
    /// is skipped; emitting it would silently overwrite the previous slot.
    pub fn trampoline(&mut self, namespace: &str, b: &ResolvedBinding<'_>, diags: &mut Diagnostics) {
        let label = b.label(namespace);
        let symbol = mangle(namespace, &stub_name(b.name));
        if let Err(previous) = self.names.insert(&symbol, &label) {
            diags.push(Diagnostic::DuplicateSymbol {
                symbol,
                binding: label,
                previous,
            });
            return;
        }

        for ty in b.args.iter().map(|(_, ty)| *ty).chain(b.ret) {
            for dec in &ty.declarations {
                self.declarations.insert(dec.clone());
            }
        }

        uwriteln!(self.src, "// {label} -> {}", b.func.call);

        if b.func.externally_declared {
            let ret = b.ret.map(|ty| ty.native_repr.as_str()).unwrap_or("void");
            uwrite!(self.src, "extern {ret} {}(", b.func.call);
            for (i, (_, ty)) in b.args.iter().enumerate() {
                if i > 0 {
                    self.src.push_str(", ");
                }
                self.src.push_str(&ty.native_repr);
            }
            self.src.push_str(");\n");
        }

        uwriteln!(self.src, "static void _{symbol}(uint32_t sp) {{");
        if let Some(prefix) = &b.func.prefix_code {
            uwriteln!(self.src, "{prefix}");
        }

        // Walk the frame: skip the runtime's linkage header, then align to
        // and read each argument slot in order.
        uwriteln!(self.src, "sp += {};", self.frame_header);
        for slot in layout(&b.args) {
            let align = &slot.align;
            uwriteln!(self.src, "sp = (sp + ({align} - 1)) & -{align};");
            uwriteln!(
                self.src,
                "{native} _{name} = *({native}*)&{MEMORY}->data[sp];",
                native = slot.native,
                name = slot.name,
            );
            uwriteln!(self.src, "sp += {};", slot.size_expr());
        }

        match b.ret {
            Some(ret) => uwrite!(self.src, "{} _r = {}(", ret.native_repr, b.func.call),
            None => uwrite!(self.src, "{}(", b.func.call),
        }
        for (i, (name, ty)) in b.args.iter().enumerate() {
            if i > 0 {
                self.src.push_str(", ");
            }
            self.src.push_str(&ty.reference.apply(&format!("_{name}")));
        }
        self.src.push_str(");\n");

        if let Some(ret) = b.ret {
            let align = AlignExpr::of(ret);
            uwriteln!(self.src, "sp = (sp + ({align} - 1)) & -{align};");
            if ret.push.is_identity() {
                uwriteln!(
                    self.src,
                    "memcpy(&{MEMORY}->data[sp], &_r, sizeof({}));",
                    ret.native_repr
                );
            } else {
                uwriteln!(self.src, "{}", ret.push.apply("_r"));
            }
        }

        if let Some(suffix) = &b.func.suffix_code {
            uwriteln!(self.src, "{suffix}");
        }
        self.src.push_str("}\n");
        uwriteln!(self.src, "void (*{symbol})(uint32_t) = _{symbol};");
        self.src.push_str("\n");
    }

    /// Assembles the aggregated unit: banner, dual-linkage guard, includes,
    /// hoisted forward declarations, runtime linkage externs, trampolines.
    pub fn finish(self) -> String {
        let mut out = String::new();
        uwriteln!(out, "{BANNER}");
        out.push('\n');
        out.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");
        out.push_str("#include <string.h>\n#include <wasm-rt.h>\n\n");
        for dec in &self.declarations {
            uwriteln!(out, "{dec}");
        }
        if !self.declarations.is_empty() {
            out.push('\n');
        }
        uwriteln!(out, "extern uint32_t (*{GETSP})();");
        uwriteln!(out, "extern wasm_rt_memory_t *{MEMORY};");
        out.push('\n');
        out.push_str(&self.src);
        out.push_str("#ifdef __cplusplus\n}\n#endif\n");
        out
    }
}
