//! Prompt templates with `{variable}` placeholders.
//!
//! Variables are expanded at render time from a string map or directly from
//! a [`ProcessingInput`]. Unknown placeholders are left intact so a later
//! stage (or a stricter variant) can fill them.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use weft_core::types::ProcessingInput;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A `{` placeholder opener with no matching `}` before the next opener
    /// or the end of the template.
    #[error("unclosed placeholder at byte offset {offset}")]
    UnclosedPlaceholder { offset: usize },
}

// ---------------------------------------------------------------------------
// PromptTemplate
// ---------------------------------------------------------------------------

/// Where a template's text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    BuiltIn,
    File(PathBuf),
}

/// Raw template text with `{variable}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub text: String,
    pub source: TemplateSource,
}

impl PromptTemplate {
    /// A template constructed in code rather than loaded from storage.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TemplateSource::BuiltIn,
        }
    }

    pub fn from_file(text: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            source: TemplateSource::File(path.into()),
        }
    }

    /// Render the template with the given variables. Placeholders with no
    /// matching variable are preserved verbatim.
    pub fn render(&self, vars: &HashMap<String, String>) -> String {
        let mut output = self.text.clone();
        for (key, value) in vars {
            output = output.replace(&format!("{{{}}}", key), value);
        }
        output
    }

    /// Render against a processing input's flattened variables.
    pub fn render_input(&self, input: &ProcessingInput) -> String {
        self.render(&input.to_template_vars())
    }

    /// Reject malformed placeholder syntax. An empty template is valid; a
    /// dangling `{` is not.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut open: Option<usize> = None;
        for (offset, ch) in self.text.char_indices() {
            match ch {
                '{' => {
                    if let Some(start) = open {
                        return Err(TemplateError::UnclosedPlaceholder { offset: start });
                    }
                    open = Some(offset);
                }
                '}' => open = None,
                _ => {}
            }
        }
        match open {
            Some(offset) => Err(TemplateError::UnclosedPlaceholder { offset }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_known_vars() {
        let tpl = PromptTemplate::inline("Summarize: {text}");
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), "hello".to_string());
        assert_eq!(tpl.render(&vars), "Summarize: hello");
    }

    #[test]
    fn render_preserves_unknown_vars() {
        let tpl = PromptTemplate::inline("{title} and {unknown}");
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Hello".to_string());
        let rendered = tpl.render(&vars);
        assert!(rendered.contains("Hello"));
        assert!(rendered.contains("{unknown}"));
    }

    #[test]
    fn render_input_uses_flattened_values() {
        let tpl = PromptTemplate::inline("Text: {text}, count: {count}");
        let input = ProcessingInput::new().with("text", "abc").with("count", 2);
        assert_eq!(tpl.render_input(&input), "Text: abc, count: 2");
    }

    #[test]
    fn empty_template_validates() {
        assert!(PromptTemplate::inline("").validate().is_ok());
    }

    #[test]
    fn balanced_placeholders_validate() {
        assert!(PromptTemplate::inline("a {b} c {d}").validate().is_ok());
    }

    #[test]
    fn dangling_open_brace_rejected() {
        let err = PromptTemplate::inline("Summarize: {text").validate().unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedPlaceholder { offset: 11 }));
    }

    #[test]
    fn nested_open_brace_rejected() {
        let err = PromptTemplate::inline("{a {b}}").validate().unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedPlaceholder { .. }));
    }

    #[test]
    fn template_serde_roundtrip() {
        let tpl = PromptTemplate::from_file("body {x}", "personas/p.md");
        let json = serde_json::to_string(&tpl).unwrap();
        let back: PromptTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tpl);
    }
}
