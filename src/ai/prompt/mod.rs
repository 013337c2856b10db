//! Prompt Builder System
//!
//! Standardized prompt construction for provider calls.
//! Every analysis prompt goes through the same section layout so output is
//! byte-identical for identical input.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear assistant role for each analysis kind
//! 2. **Structured Objectives**: Numbered goals
//! 3. **Context Sections**: Case facts in a stable key order
//! 4. **Focus Enforcement**: Keep the answer on the requested fields
//! 5. **Output Schema**: JSON example of the required shape

mod analysis;

pub use analysis::AnalysisPromptBuilder;

use std::collections::BTreeMap;
use std::fmt::Write;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Context with key-value pairs, rendered in key order
    Context(BTreeMap<String, String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced block with language tag
    Code { language: String, content: String },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
    /// Anti-patterns with good/bad examples
    AntiPatterns { bad: Vec<String>, good: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add a context item, merging into the first context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let existing = self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(ctx) => Some(ctx),
            _ => None,
        });
        match existing {
            Some(ctx) => {
                ctx.insert(key.to_string(), value.to_string());
            }
            None => {
                let mut ctx = BTreeMap::new();
                ctx.insert(key.to_string(), value.to_string());
                self.sections.push(PromptSection::Context(ctx));
            }
        }
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header; skipped when `content` is blank
    pub fn section(mut self, header: &str, content: &str) -> Self {
        if content.trim().is_empty() {
            return self;
        }
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add fenced block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus<I, S>(mut self, target: &str, restrictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add anti-patterns section
    pub fn anti_patterns(mut self, bad: &[&str], good: &[&str]) -> Self {
        self.sections.push(PromptSection::AntiPatterns {
            bad: bad.iter().map(|s| s.to_string()).collect(),
            good: good.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    let _ = writeln!(prompt, "You are an expert {} specializing in {}.", expertise, task);
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        let _ = writeln!(prompt, "{}. {}", i + 1, obj);
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(ctx) => {
                    prompt.push_str("# Case\n\n");
                    for (key, value) in ctx {
                        let _ = writeln!(prompt, "**{}**: {}", key, value);
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        let _ = write!(prompt, "# {}\n\n", h);
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    let _ = writeln!(prompt, "```{}", language);
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    let _ = writeln!(prompt, "IMPORTANT: Focus EXCLUSIVELY on: {}", target);
                    for restriction in restrictions {
                        let _ = writeln!(prompt, "- {}", restriction);
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
                PromptSection::AntiPatterns { bad, good } => {
                    prompt.push_str("## ANTI-PATTERNS\n\n");
                    prompt.push_str("<what_not_to_do>\n");
                    for example in bad {
                        let _ = writeln!(prompt, "WRONG: {}", example);
                    }
                    prompt.push_str("</what_not_to_do>\n\n");
                    prompt.push_str("<what_to_do>\n");
                    for example in good {
                        let _ = writeln!(prompt, "CORRECT: {}", example);
                    }
                    prompt.push_str("</what_to_do>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("legal analyst", "criminal defense")
            .objectives(["Identify rights", "Cite precedent"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("legal analyst"));
        assert!(prompt.contains("1. Identify rights"));
        assert!(prompt.contains("2. Cite precedent"));
    }

    #[test]
    fn test_context_items_render_in_key_order() {
        let prompt = PromptBuilder::new()
            .context_item("Issue", "Criminal")
            .context_item("Forum", "State")
            .context_item("Description", "searched my car")
            .build();

        let desc = prompt.find("**Description**").unwrap();
        let forum = prompt.find("**Forum**").unwrap();
        let issue = prompt.find("**Issue**").unwrap();
        assert!(desc < forum && forum < issue);
        assert_eq!(prompt.matches("# Case").count(), 1);
    }

    #[test]
    fn test_blank_section_is_skipped() {
        let prompt = PromptBuilder::new()
            .section("Evidence", "  ")
            .text("body")
            .build();
        assert!(!prompt.contains("# Evidence"));
        assert_eq!(prompt, "body");
    }

    #[test]
    fn test_focus_and_code() {
        let prompt = PromptBuilder::new()
            .focus("rights_assessment", ["Return JSON only"])
            .code("json", "{}")
            .build();

        assert!(prompt.contains("<FOCUS>"));
        assert!(prompt.contains("- Return JSON only"));
        assert!(prompt.contains("```json\n{}\n```"));
    }

    #[test]
    fn test_anti_patterns() {
        let prompt = PromptBuilder::new()
            .anti_patterns(&["Analysis in Progress"], &["A concrete right"])
            .build();

        assert!(prompt.contains("WRONG: Analysis in Progress"));
        assert!(prompt.contains("CORRECT: A concrete right"));
    }
}
