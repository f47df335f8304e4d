use thiserror::Error;

/// A non-fatal condition found while generating bindings.
///
/// None of these stop the run: the offending binding is generated best-effort
/// (or, for a duplicate symbol, skipped on the native side) and the rest of
/// the binding set proceeds. The caller decides whether a non-empty report
/// fails the surrounding build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("{binding}: unresolved type `{reference}`")]
    UnresolvedType { binding: String, reference: String },

    #[error("{binding}: argument list has odd length, ignoring trailing `{trailing}`")]
    MalformedArgumentList { binding: String, trailing: String },

    #[error("{binding}: {reason}")]
    MalformedBinding { binding: String, reason: String },

    #[error("duplicate symbol `{symbol}`: `{binding}` collides with `{previous}`")]
    DuplicateSymbol {
        symbol: String,
        binding: String,
        previous: String,
    },
}

/// Accumulator threaded through a whole generation pass.
///
/// Diagnostics are values, never control flow: emission keeps going and the
/// full report is handed back next to the generated output.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diag: Diagnostic) {
        self.list.push(diag);
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

/// Failure to populate the type registry. Unlike [`Diagnostic`], these are
/// load-time errors owned by the specification loader: a duplicate qualified
/// name would make later lookups ambiguous, so insertion fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate type `{0}`")]
    Duplicate(String),
}
