use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::template::PromptTemplate;

// ---------------------------------------------------------------------------
// PersonaDefinition
// ---------------------------------------------------------------------------

/// A named persona: the prompt content associated with an agent identity,
/// plus optional metadata. Persona content is owned by whatever store it was
/// loaded from; the runtime only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    pub name: String,
    /// Optional role description, e.g. "research assistant".
    pub role: Option<String>,
    /// Behavioral constraints prepended to the rendered prompt.
    pub constraints: Vec<String>,
    pub template: PromptTemplate,
}

impl PersonaDefinition {
    pub fn new(name: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            name: name.into(),
            role: None,
            constraints: Vec::new(),
            template,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    /// Compose the full prompt text for this persona: role line, then
    /// constraints, then the rendered template body. Sections that are
    /// absent contribute nothing, so a bare empty template composes to an
    /// empty prompt.
    pub fn to_prompt(&self, vars: &HashMap<String, String>) -> String {
        let mut parts = Vec::new();
        if let Some(role) = &self.role {
            parts.push(format!("You are {role}."));
        }
        if !self.constraints.is_empty() {
            let lines: Vec<String> =
                self.constraints.iter().map(|c| format!("- {c}")).collect();
            parts.push(format!("Constraints:\n{}", lines.join("\n")));
        }
        let body = self.template.render(vars);
        if !body.is_empty() {
            parts.push(body);
        }
        parts.join("\n\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_prompt_composes_all_sections() {
        let def = PersonaDefinition::new("Researcher", PromptTemplate::inline("Find: {topic}"))
            .with_role("research assistant")
            .with_constraint("cite sources");
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "rust".to_string());
        let prompt = def.to_prompt(&vars);
        assert!(prompt.contains("You are research assistant."));
        assert!(prompt.contains("- cite sources"));
        assert!(prompt.contains("Find: rust"));
    }

    #[test]
    fn to_prompt_of_bare_empty_template_is_empty() {
        let def = PersonaDefinition::new("Plain", PromptTemplate::inline(""));
        assert_eq!(def.to_prompt(&HashMap::new()), "");
    }

    #[test]
    fn to_prompt_without_metadata_is_just_the_body() {
        let def = PersonaDefinition::new("Summarizer", PromptTemplate::inline("Summarize: {text}"));
        assert_eq!(def.to_prompt(&HashMap::new()), "Summarize: {text}");
    }

    #[test]
    fn definition_serde_roundtrip() {
        let def = PersonaDefinition::new("Researcher", PromptTemplate::inline("body"))
            .with_role("assistant");
        let json = serde_json::to_string(&def).unwrap();
        let back: PersonaDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
