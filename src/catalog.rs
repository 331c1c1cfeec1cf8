use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Built-in educational prompt templates
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    // Science
    ("science_basic", "Explain {concept} to a {grade} student in simple terms."),
    (
        "science_stepwise",
        "Break down {concept} into 3 simple steps for {grade} students: Step 1: Step 2: Step 3:",
    ),
    (
        "science_analogy",
        "Explain {concept} using a simple analogy that {grade} students would understand.",
    ),
    ("science_qa", "Answer this {grade} student's question about {concept}: {question}"),
    (
        "science_experiment",
        "Describe a simple experiment to demonstrate {concept} for {grade} students.",
    ),
    // English
    ("grammar_rule", "Explain the grammar rule for {topic} to {grade} students with examples."),
    ("writing_feedback", "Give constructive feedback on this {grade} student's writing: {text}"),
    ("reading_guide", "Help a {grade} student understand this passage: {passage}"),
    ("vocabulary", "Define {word} for {grade} students and use it in a sentence."),
    ("story_analysis", "Help a {grade} student analyze the main idea of this story: {story}"),
    // General learning
    ("concept_compare", "Compare {concept1} and {concept2} for {grade} students."),
    ("problem_solve", "Guide a {grade} student through solving: {problem}"),
    ("study_tip", "Give study tips for {subject} to {grade} students."),
    ("mistake_correct", "A {grade} student thinks {misconception}. Correct this gently."),
    ("real_world", "Show how {concept} applies in real life for {grade} students."),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    UnknownTemplate(String),
    #[error("Template '{template}' requires parameter '{parameter}'")]
    MissingParameter { template: String, parameter: String },
    #[error("Template '{template}' has no placeholder for parameter '{parameter}'")]
    UnusedParameter { template: String, parameter: String },
    #[error("Template '{template}' is malformed: {reason}")]
    Malformed { template: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// A parsed template: literal text interleaved with named slots
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `{name}` placeholders; `{{` and `}}` are literal braces
    pub fn parse(name: &str, text: &str) -> Result<Self, TemplateError> {
        let malformed = |reason: &str| TemplateError::Malformed {
            template: name.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut slot = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(malformed("nested '{' in placeholder")),
                            Some(ch) => slot.push(ch),
                            None => return Err(malformed("unclosed '{'")),
                        }
                    }
                    let slot = slot.trim();
                    if slot.is_empty() {
                        return Err(malformed("empty placeholder"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot.to_string()));
                }
                '}' => return Err(malformed("unmatched '}'")),
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Slot(slot) if seen.insert(slot.as_str()) => Some(slot.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fill every placeholder from `params`; every param must be used
    pub fn render(&self, params: &BTreeMap<String, String>) -> Result<String, TemplateError> {
        let placeholders = self.placeholders();

        if let Some(missing) = placeholders.iter().find(|p| !params.contains_key(**p)) {
            return Err(TemplateError::MissingParameter {
                template: self.name.clone(),
                parameter: missing.to_string(),
            });
        }

        if let Some(unused) = params.keys().find(|k| !placeholders.contains(&k.as_str())) {
            return Err(TemplateError::UnusedParameter {
                template: self.name.clone(),
                parameter: unused.clone(),
            });
        }

        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Slot(slot) => rendered.push_str(&params[slot]),
            }
        }
        Ok(rendered)
    }
}

/// Named templates available to a run
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    templates: BTreeMap<String, Template>,
}

impl PromptCatalog {
    /// Catalog holding only the built-in templates
    pub fn builtin() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .filter_map(|(name, text)| Template::parse(name, text).ok())
            .map(|template| (template.name.clone(), template))
            .collect();

        Self { templates }
    }

    /// Add or replace a template
    pub fn register(&mut self, name: &str, text: &str) -> Result<(), TemplateError> {
        let template = Template::parse(name, text)?;
        if self.templates.insert(name.to_string(), template).is_some() {
            log::debug!("Template '{}' overridden", name);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Template, TemplateError> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
    }

    /// Render the named template with the given parameters
    pub fn render(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        self.get(name)?.render(params)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}
