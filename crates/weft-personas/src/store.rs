use std::collections::HashMap;

use tracing::debug;

use crate::definition::PersonaDefinition;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate persona name: `{0}`")]
    DuplicatePersona(String),
}

// ---------------------------------------------------------------------------
// PersonaStore trait
// ---------------------------------------------------------------------------

/// A name-keyed store of persona content. Stores are read-only from the
/// runtime's perspective and safe for concurrent lookup by multiple agent
/// instances.
pub trait PersonaStore: Send + Sync {
    /// Exact-name lookup; `None` when the name is absent.
    fn lookup(&self, name: &str) -> Option<PersonaDefinition>;

    /// All registered persona names.
    fn names(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.names().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory persona store, populated at startup (by hand or via the
/// directory loader) and immutable thereafter from the resolver's side.
#[derive(Debug, Default)]
pub struct MemoryStore {
    personas: HashMap<String, PersonaDefinition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persona. Returns an error if the name already exists.
    pub fn register(&mut self, definition: PersonaDefinition) -> Result<(), StoreError> {
        let name = definition.name.clone();
        if self.personas.contains_key(&name) {
            return Err(StoreError::DuplicatePersona(name));
        }
        debug!(name = %name, "registered persona");
        self.personas.insert(name, definition);
        Ok(())
    }

    /// Remove a persona by name, returning it if it was present.
    pub fn unregister(&mut self, name: &str) -> Option<PersonaDefinition> {
        self.personas.remove(name)
    }
}

impl PersonaStore for MemoryStore {
    fn lookup(&self, name: &str) -> Option<PersonaDefinition> {
        self.personas.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.personas.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.personas.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
