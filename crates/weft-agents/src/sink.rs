//! Persistence boundary for parsed results.
//!
//! The base lifecycle performs no persistence; variants that want durable
//! (or observable) saves hold a [`ResultSink`] and call it from their
//! `save_parsed_result` override. Real backends are injected by callers.

use std::sync::Mutex;

use weft_core::types::ParsedResult;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink rejected result: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// ResultSink trait
// ---------------------------------------------------------------------------

/// Destination for parsed results. Mirrors the `save_parsed_result` call
/// signature: at most one save per pipeline run, result unmodified.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn save(&self, result: &ParsedResult) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Appends every saved result to an in-memory list. Reference sink for
/// tests and demos.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<ParsedResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far, in save order.
    pub fn saved(&self) -> Vec<ParsedResult> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ResultSink for MemorySink {
    async fn save(&self, result: &ParsedResult) -> Result<(), SinkError> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
