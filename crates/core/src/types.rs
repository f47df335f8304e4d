use crate::diag::{Diagnostic, Diagnostics, RegistryError};
use std::collections::HashMap;

/// A value-expression template with a single `@` placeholder.
///
/// The empty-template-means-identity rule of the specification format is
/// explicit here: `Identity` stands in for "no conversion", "pass by value"
/// or "default write-back" depending on which seam the template sits at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Identity,
    Substitute(String),
}

impl Template {
    pub const PLACEHOLDER: char = '@';

    /// An empty specification string is the identity template.
    pub fn from_spec(spec: &str) -> Template {
        if spec.is_empty() {
            Template::Identity
        } else {
            Template::Substitute(spec.to_string())
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Template::Identity => value.to_string(),
            Template::Substitute(t) => t.replace(Self::PLACEHOLDER, value),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Template::Identity)
    }
}

/// One marshallable type, fully resolved.
///
/// `external_repr` is the guest-surface type, `internal_repr` the type that
/// actually crosses the import boundary (an internal numeric handle may stand
/// in for a richer external value), `native_repr` the C type read out of the
/// call frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub qualified_name: String,
    pub external_repr: String,
    pub internal_repr: String,
    pub native_repr: String,
    /// Converts an external value down to `internal_repr` before the call,
    /// and an internal return value back up after it.
    pub conversion: Template,
    /// How an already-read argument is handed to the native call; `Identity`
    /// passes the value itself, a substitution enables pass-by-address.
    pub reference: Template,
    /// How a native result is written back into the call frame; `Identity`
    /// is a raw byte copy of `sizeof(native_repr)`.
    pub push: Template,
    /// Explicit byte alignment; `None` defers to `sizeof(native_repr)`.
    pub alignment: Option<u32>,
    /// Guest import paths required wherever this type appears.
    pub imports: Vec<String>,
    /// Native forward declarations/includes required wherever this type
    /// appears.
    pub declarations: Vec<String>,
}

/// Sentinel descriptor substituted for a reference that did not resolve.
/// Empty representations keep emission going so one bad specification does
/// not block the rest of the batch; the accompanying diagnostic is what makes
/// the failure visible.
pub static UNRESOLVED: TypeDescriptor = TypeDescriptor {
    qualified_name: String::new(),
    external_repr: String::new(),
    internal_repr: String::new(),
    native_repr: String::new(),
    conversion: Template::Identity,
    reference: Template::Identity,
    push: Template::Identity,
    alignment: None,
    imports: Vec::new(),
    declarations: Vec::new(),
};

/// All known types, keyed by qualified name. Populated once by the
/// specification loader before generation begins; the generator itself only
/// ever resolves against it.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Inserting a second descriptor under one qualified name fails closed;
    /// a silent overwrite would make every later lookup ambiguous.
    pub fn insert(&mut self, ty: TypeDescriptor) -> Result<(), RegistryError> {
        if self.types.contains_key(&ty.qualified_name) {
            return Err(RegistryError::Duplicate(ty.qualified_name));
        }
        self.types.insert(ty.qualified_name.clone(), ty);
        Ok(())
    }

    /// Two-tier resolution: a reference with a leading `.` marker is looked
    /// up globally under its bare name; otherwise the reference is tried
    /// relative to `namespace` first and as an already-qualified name second.
    /// This lets a binding name a type from its own namespace without
    /// repeating the full path.
    pub fn resolve(&self, namespace: &str, reference: &str) -> Option<&TypeDescriptor> {
        if let Some(bare) = reference.strip_prefix('.') {
            return self.types.get(bare);
        }
        self.types
            .get(&format!("{namespace}/{reference}"))
            .or_else(|| self.types.get(reference))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One callable bridge, as loaded from a binding specification set. The
/// display name lives beside it as the key of the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FuncBinding {
    /// Copied verbatim above the generated wrapper.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// The native symbol the trampoline invokes.
    pub call: String,
    /// Flat `[name, type, name, type, ...]` list; an odd length is a
    /// specification error, reported and truncated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ret: Option<String>,
    /// Raw native source spliced inside the trampoline before the call.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prefix_code: Option<String>,
    /// Raw native source spliced inside the trampoline after the call.
    #[cfg_attr(feature = "serde", serde(default))]
    pub suffix_code: Option<String>,
    /// Emit a native forward declaration of `call` before the trampoline.
    #[cfg_attr(feature = "serde", serde(default))]
    pub externally_declared: bool,
    /// Emit the wrapper as a method on the first argument's external type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub method_style: bool,
    /// Suppress the typed wrapper; a hand-written one already exists.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stub_only: bool,
}

/// A binding with its type references resolved, the view both emitters
/// consume. `args` holds only the complete name/type pairs.
pub struct ResolvedBinding<'a> {
    pub name: &'a str,
    pub func: &'a FuncBinding,
    pub args: Vec<(&'a str, &'a TypeDescriptor)>,
    pub ret: Option<&'a TypeDescriptor>,
}

impl ResolvedBinding<'_> {
    /// Diagnostic attribution label.
    pub fn label(&self, namespace: &str) -> String {
        format!("{namespace}.{}", self.name)
    }
}

/// Resolves every type reference of `func`, substituting the [`UNRESOLVED`]
/// sentinel and pushing a diagnostic for each miss. An odd-length argument
/// list loses its dangling entry. Never fails: the returned binding is always
/// usable for best-effort emission.
pub fn resolve_binding<'a>(
    registry: &'a TypeRegistry,
    namespace: &str,
    name: &'a str,
    func: &'a FuncBinding,
    diags: &mut Diagnostics,
) -> ResolvedBinding<'a> {
    let label = format!("{namespace}.{name}");
    if func.args.len() % 2 != 0 {
        diags.push(Diagnostic::MalformedArgumentList {
            binding: label.clone(),
            trailing: func.args.last().cloned().unwrap_or_default(),
        });
    }

    let args = func
        .args
        .chunks_exact(2)
        .map(|pair| {
            let ty = resolve_or_sentinel(registry, namespace, &label, &pair[1], diags);
            (pair[0].as_str(), ty)
        })
        .collect();
    let ret = func
        .ret
        .as_deref()
        .map(|reference| resolve_or_sentinel(registry, namespace, &label, reference, diags));

    ResolvedBinding {
        name,
        func,
        args,
        ret,
    }
}

fn resolve_or_sentinel<'a>(
    registry: &'a TypeRegistry,
    namespace: &str,
    label: &str,
    reference: &str,
    diags: &mut Diagnostics,
) -> &'a TypeDescriptor {
    match registry.resolve(namespace, reference) {
        Some(ty) => ty,
        None => {
            diags.push(Diagnostic::UnresolvedType {
                binding: label.to_string(),
                reference: reference.to_string(),
            });
            &UNRESOLVED
        }
    }
}
