//! Filesystem persona loading.
//!
//! Personas are markdown files with optional YAML frontmatter above the
//! template body:
//!
//! ```markdown
//! ---
//! name: Summarizer
//! role: summarization specialist
//! constraints: [be brief, plain language]
//! ---
//! Summarize: {text}
//! ```
//!
//! A missing `name` falls back to the file stem. Unreadable files and
//! duplicate names are skipped with a warning rather than aborting the load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::definition::PersonaDefinition;
use crate::store::{MemoryStore, StoreError};
use crate::template::PromptTemplate;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("persona directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// LoadOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct LoadOutcome {
    pub loaded: usize,
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// PersonaDirLoader
// ---------------------------------------------------------------------------

/// Scans a directory for `*.md` persona files and populates a store.
pub struct PersonaDirLoader {
    dir: PathBuf,
}

impl PersonaDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every persona file into a fresh in-memory store.
    pub fn load(&self) -> Result<MemoryStore, LoaderError> {
        let mut store = MemoryStore::new();
        self.load_into(&mut store)?;
        Ok(store)
    }

    /// Load every persona file into an existing store, skipping duplicates.
    pub fn load_into(&self, store: &mut MemoryStore) -> Result<LoadOutcome, LoaderError> {
        if !self.dir.is_dir() {
            return Err(LoaderError::DirNotFound(self.dir.clone()));
        }

        let mut outcome = LoadOutcome::default();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable persona file");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let definition = parse_persona_file(&path, &content);
            let name = definition.name.clone();
            match store.register(definition) {
                Ok(()) => outcome.loaded += 1,
                Err(StoreError::DuplicatePersona(_)) => {
                    warn!(name = %name, path = %path.display(), "skipping duplicate persona");
                    outcome.skipped += 1;
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            loaded = outcome.loaded,
            skipped = outcome.skipped,
            "loaded personas"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Markdown parsing helpers
// ---------------------------------------------------------------------------

/// Parse one persona file: frontmatter metadata plus the template body.
fn parse_persona_file(path: &Path, content: &str) -> PersonaDefinition {
    let (frontmatter, body) = split_frontmatter(content);

    let name = frontmatter.get("name").cloned().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".into())
    });

    let role = frontmatter.get("role").cloned();

    let constraints = frontmatter
        .get("constraints")
        .map(|s| {
            s.trim_matches(|c| c == '[' || c == ']')
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();

    PersonaDefinition {
        name,
        role,
        constraints,
        template: PromptTemplate::from_file(body, path),
    }
}

/// Split YAML frontmatter from the markdown body.
///
/// Returns (frontmatter_map, body_text). Content without a leading `---`
/// fence is treated as all body.
fn split_frontmatter(content: &str) -> (HashMap<String, String>, String) {
    let trimmed = content.trim();
    if !trimmed.starts_with("---") {
        return (HashMap::new(), trimmed.to_string());
    }

    if let Some(end) = trimmed[3..].find("---") {
        let yaml_section = trimmed[3..3 + end].trim();
        let body = trimmed[3 + end + 3..].trim().to_string();

        let mut map = HashMap::new();
        for line in yaml_section.lines() {
            if let Some((key, value)) = line.split_once(':') {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        (map, body)
    } else {
        (HashMap::new(), trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PersonaStore;

    #[test]
    fn loads_persona_with_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summarizer.md"),
            "---\nname: Summarizer\nrole: summarization specialist\nconstraints: [be brief, plain language]\n---\nSummarize: {text}",
        )
        .unwrap();

        let store = PersonaDirLoader::new(dir.path()).load().unwrap();
        let def = store.lookup("Summarizer").unwrap();
        assert_eq!(def.role.as_deref(), Some("summarization specialist"));
        assert_eq!(def.constraints, vec!["be brief", "plain language"]);
        assert_eq!(def.template.text, "Summarize: {text}");
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Plain.md"), "Just a template body.").unwrap();

        let store = PersonaDirLoader::new(dir.path()).load().unwrap();
        assert!(store.lookup("Plain").is_some());
    }

    #[test]
    fn ignores_non_markdown_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a persona").unwrap();
        std::fs::write(dir.path().join("real.md"), "body").unwrap();

        let mut store = MemoryStore::new();
        let outcome = PersonaDirLoader::new(dir.path())
            .load_into(&mut store)
            .unwrap();
        assert_eq!(outcome.loaded, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "---\nname: Twin\n---\nfirst").unwrap();
        std::fs::write(dir.path().join("b.md"), "---\nname: Twin\n---\nsecond").unwrap();

        let mut store = MemoryStore::new();
        let outcome = PersonaDirLoader::new(dir.path())
            .load_into(&mut store)
            .unwrap();
        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.skipped, 1);
        // Paths are scanned in sorted order, so a.md wins.
        assert_eq!(store.lookup("Twin").unwrap().template.text, "first");
    }

    #[test]
    fn missing_dir_is_an_error() {
        let err = PersonaDirLoader::new("/nonexistent/personas")
            .load()
            .unwrap_err();
        assert!(matches!(err, LoaderError::DirNotFound(_)));
    }

    #[test]
    fn empty_dir_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersonaDirLoader::new(dir.path()).load().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn frontmatter_without_closing_fence_is_all_body() {
        let (map, body) = split_frontmatter("---\nname: Broken");
        assert!(map.is_empty());
        assert!(body.contains("name: Broken"));
    }

    #[test]
    fn body_without_frontmatter_is_untouched() {
        let (map, body) = split_frontmatter("Summarize: {text}");
        assert!(map.is_empty());
        assert_eq!(body, "Summarize: {text}");
    }
}
