//! Persona resolution: mapping an agent identity to its persona definition.
//!
//! Resolution is a capability, not a fixed algorithm. The stock
//! [`StoreResolver`] performs exact-name lookup against an injected store; a
//! specialized resolver may layer fallback or caching on top, as
//! [`CachingResolver`] does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use weft_core::types::AgentIdentity;

use crate::definition::PersonaDefinition;
use crate::store::PersonaStore;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No persona definition matches the identity. An agent with no persona
    /// has no valid prompt, so this must reach the caller rather than being
    /// papered over with a default.
    #[error("no persona registered for `{0}`")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// ResolvePersona trait
// ---------------------------------------------------------------------------

/// Maps an [`AgentIdentity`] to a [`PersonaDefinition`].
///
/// Within one process run, resolution must be pure with respect to the
/// identity: the same name yields the same definition, which is what makes
/// caching decorators sound.
pub trait ResolvePersona: Send + Sync {
    fn resolve(&self, identity: &AgentIdentity) -> Result<PersonaDefinition, ResolveError>;
}

// ---------------------------------------------------------------------------
// StoreResolver
// ---------------------------------------------------------------------------

/// Exact-name resolution against an injected persona store.
pub struct StoreResolver {
    store: Arc<dyn PersonaStore>,
}

impl StoreResolver {
    pub fn new(store: Arc<dyn PersonaStore>) -> Self {
        Self { store }
    }
}

impl ResolvePersona for StoreResolver {
    fn resolve(&self, identity: &AgentIdentity) -> Result<PersonaDefinition, ResolveError> {
        match self.store.lookup(identity.as_str()) {
            Some(definition) => {
                debug!(agent = %identity, "resolved persona");
                Ok(definition)
            }
            None => Err(ResolveError::NotFound(identity.as_str().to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CachingResolver
// ---------------------------------------------------------------------------

/// Memoizing decorator over any resolver. Sound because resolution is pure
/// per process run; never required by the base contract.
pub struct CachingResolver {
    inner: Arc<dyn ResolvePersona>,
    cache: Mutex<HashMap<String, PersonaDefinition>>,
    hits: Mutex<u64>,
}

impl CachingResolver {
    pub fn new(inner: Arc<dyn ResolvePersona>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            hits: Mutex::new(0),
        }
    }

    /// Number of lookups served from the cache.
    pub fn cache_hits(&self) -> u64 {
        *self.hits.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResolvePersona for CachingResolver {
    fn resolve(&self, identity: &AgentIdentity) -> Result<PersonaDefinition, ResolveError> {
        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(definition) = cache.get(identity.as_str()) {
                *self.hits.lock().unwrap_or_else(|e| e.into_inner()) += 1;
                return Ok(definition.clone());
            }
        }

        let definition = self.inner.resolve(identity)?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(identity.as_str().to_string(), definition.clone());
        Ok(definition)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
