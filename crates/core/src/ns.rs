use std::collections::HashMap;

/// Set of symbol names defined so far in an output unit, remembering which
/// binding defined each one. Two bindings mangling to the same native symbol
/// would silently overwrite one import slot with the other's trampoline, so
/// the collision has to be caught here, before the unit is committed.
#[derive(Default)]
pub struct Ns {
    defined: HashMap<String, String>,
}

impl Ns {
    /// Records `name` as defined by `owner`. On a collision the original
    /// owner is returned so the caller can attribute the diagnostic to both
    /// bindings.
    pub fn insert(&mut self, name: &str, owner: &str) -> Result<(), String> {
        match self.defined.get(name) {
            Some(prev) => Err(prev.clone()),
            None => {
                self.defined.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defined.contains_key(name)
    }
}
