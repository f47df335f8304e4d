use crate::uwrite;
use std::fmt::Write;

/// The escape letter. It is excluded from verbatim emission below, which is
/// what keeps the encoding injective: a literal `Z` in the input can never be
/// confused with the start of an escape sequence.
const ESCAPE: char = 'Z';

/// Wasm2c-style module prefix for the guest runtime's import table.
const PREFIX: &str = "Z_goZ_";

/// Signature marker: every trampoline takes one `uint32_t` stack pointer and
/// returns nothing, whatever the bridged function's real signature is.
const SUFFIX: &str = "Z_vi";

/// Prefix distinguishing a generated import stub from the public wrapper of
/// the same binding. The mangled import symbol is derived from the stub's
/// name, which is how the three artifacts of one binding tie together.
pub const STUB_PREFIX: &str = "bind";

pub fn stub_name(display_name: &str) -> String {
    format!("{STUB_PREFIX}{display_name}")
}

/// Encodes `namespace.function` as a flat identifier usable as a linker
/// symbol. Alphanumerics (other than the escape letter) and underscores pass
/// verbatim; everything else becomes the escape letter followed by the
/// two-digit uppercase hex of the low byte. Deterministic, and injective as
/// long as the `namespace`/`function` split point is not itself ambiguous —
/// which a duplicate-symbol check at emission time guards anyway.
pub fn mangle(namespace: &str, function: &str) -> String {
    let mut out = String::from(PREFIX);
    for c in namespace.chars().chain(['.']).chain(function.chars()) {
        if (c.is_alphanumeric() && c != ESCAPE) || c == '_' {
            out.push(c);
        } else {
            uwrite!(out, "{ESCAPE}{:02X}", c as u32 as u8);
        }
    }
    out.push_str(SUFFIX);
    out
}
