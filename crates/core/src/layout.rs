use crate::types::TypeDescriptor;
use std::fmt;

/// Rounds `val` up to the next multiple of `align`, which must be a power of
/// two. This is the layout rule of the guest runtime's call frames: arguments
/// are packed tightly, each aligned to its own boundary.
pub fn align_up(val: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (val + (align - 1)) & !(align - 1)
}

/// Alignment (and, symmetrically, size) of a call-frame slot as a C
/// expression. Native type sizes are only known to the C compiler, so unless
/// a specification pins an explicit byte alignment the generated trampoline
/// defers to `sizeof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignExpr {
    Bytes(u32),
    SizeOf(String),
}

impl AlignExpr {
    /// Alignment of `ty`: the explicit override when present, otherwise the
    /// native size.
    pub fn of(ty: &TypeDescriptor) -> AlignExpr {
        match ty.alignment {
            Some(bytes) => AlignExpr::Bytes(bytes),
            None => AlignExpr::SizeOf(ty.native_repr.clone()),
        }
    }
}

impl fmt::Display for AlignExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignExpr::Bytes(n) => write!(f, "{n}"),
            AlignExpr::SizeOf(ty) => write!(f, "sizeof({ty})"),
        }
    }
}

/// One argument's slot in the call frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSlot {
    pub name: String,
    pub native: String,
    pub align: AlignExpr,
}

impl ArgSlot {
    pub fn size_expr(&self) -> String {
        format!("sizeof({})", self.native)
    }
}

/// Computes the frame slots for a resolved argument list. Purely a function
/// of its input; offsets are not materialized here — the native emitter
/// threads a cursor through the slots with
///
/// ```text
/// cursor = align_up(cursor, align)
/// read size bytes at cursor
/// cursor += size
/// ```
///
/// starting past the frame header the runtime reserves for its own linkage.
pub fn layout(args: &[(&str, &TypeDescriptor)]) -> Vec<ArgSlot> {
    args.iter()
        .map(|(name, ty)| ArgSlot {
            name: name.to_string(),
            native: ty.native_repr.clone(),
            align: AlignExpr::of(ty),
        })
        .collect()
}
