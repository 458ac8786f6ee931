use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

mod generation;
mod knowledge;

pub use generation::{
    Complexity, ContextEntry, EntryOrigin, Enhancement, GenerationStrategy, QualityReport,
    RetrievalContext, Strictness,
};
pub use knowledge::{
    DocumentMetadata, DomainProfile, KnowledgeDocument, KnowledgeKind, QueryFilters,
};

/// Upper bound on the number of named inputs accepted per request.
pub const MAX_INPUTS: usize = 64;

/// Business vertical a piece of text belongs to.
///
/// Variant order is the canonical iteration order of the knowledge table and
/// therefore the classifier's tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Healthcare,
    Banking,
    Ecommerce,
    Marketing,
    Insurance,
    Education,
    Logistics,
    Fintech,
    MutualFunds,
    Aif,
    CardsPayment,
    General,
}

impl Domain {
    /// Every domain that carries a profile, in canonical order. `General` is excluded.
    pub const SCORED: [Domain; 11] = [
        Domain::Healthcare,
        Domain::Banking,
        Domain::Ecommerce,
        Domain::Marketing,
        Domain::Insurance,
        Domain::Education,
        Domain::Logistics,
        Domain::Fintech,
        Domain::MutualFunds,
        Domain::Aif,
        Domain::CardsPayment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Healthcare => "healthcare",
            Domain::Banking => "banking",
            Domain::Ecommerce => "ecommerce",
            Domain::Marketing => "marketing",
            Domain::Insurance => "insurance",
            Domain::Education => "education",
            Domain::Logistics => "logistics",
            Domain::Fintech => "fintech",
            Domain::MutualFunds => "mutual_funds",
            Domain::Aif => "aif",
            Domain::CardsPayment => "cards_payment",
            Domain::General => "general",
        }
    }

    /// Human readable name used in prompts and rendered documents.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Healthcare => "Healthcare",
            Domain::Banking => "Banking",
            Domain::Ecommerce => "E-commerce",
            Domain::Marketing => "Marketing",
            Domain::Insurance => "Insurance",
            Domain::Education => "Education",
            Domain::Logistics => "Logistics",
            Domain::Fintech => "Fintech",
            Domain::MutualFunds => "Mutual Funds",
            Domain::Aif => "Alternative Investment Funds",
            Domain::CardsPayment => "Cards & Payments",
            Domain::General => "General",
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, Domain::General)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Domain::SCORED
            .iter()
            .chain(std::iter::once(&Domain::General))
            .find(|domain| domain.as_str() == normalized)
            .copied()
            .ok_or_else(|| DomainError::validation(format!("unknown domain `{value}`")))
    }
}

/// Kind of document the pipeline is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Brd,
    Frd,
    Srs,
    Wireframe,
    Prototype,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Brd,
        DocumentType::Frd,
        DocumentType::Srs,
        DocumentType::Wireframe,
        DocumentType::Prototype,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Brd => "BRD",
            DocumentType::Frd => "FRD",
            DocumentType::Srs => "SRS",
            DocumentType::Wireframe => "WIREFRAME",
            DocumentType::Prototype => "PROTOTYPE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentType::Brd => "Business Requirements Document",
            DocumentType::Frd => "Functional Requirements Document",
            DocumentType::Srs => "Software Requirements Specification",
            DocumentType::Wireframe => "Wireframe Specification",
            DocumentType::Prototype => "Prototype Specification",
        }
    }

    /// Section outline used when the document is assembled from templates.
    pub fn outline(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Brd => &[
                "Executive Summary",
                "Project Scope",
                "Business Objectives",
                "Requirements",
                "Assumptions",
                "Constraints",
            ],
            DocumentType::Frd => &[
                "Functional Overview",
                "User Stories",
                "Acceptance Criteria",
                "Data Models",
                "Interfaces",
            ],
            DocumentType::Srs | DocumentType::Wireframe | DocumentType::Prototype => &[
                "Executive Summary",
                "Project Scope",
                "Objectives",
                "Requirements",
            ],
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        DocumentType::ALL
            .iter()
            .find(|doc_type| doc_type.as_str() == normalized)
            .copied()
            .ok_or_else(|| DomainError::validation(format!("unknown document type `{value}`")))
    }
}

/// A single named input: free text or a list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    pub fn is_blank(&self) -> bool {
        match self {
            InputValue::Text(text) => text.trim().is_empty(),
            InputValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// Non-empty, trimmed fragments carried by this value.
    pub fn fragments(&self) -> Vec<&str> {
        match self {
            InputValue::Text(text) => Some(text.trim())
                .filter(|t| !t.is_empty())
                .into_iter()
                .collect(),
            InputValue::List(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }

    pub fn char_count(&self) -> usize {
        match self {
            InputValue::Text(text) => text.chars().count(),
            InputValue::List(items) => items.iter().map(|item| item.chars().count()).sum(),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragments().join(", "))
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<Vec<String>> for InputValue {
    fn from(value: Vec<String>) -> Self {
        InputValue::List(value)
    }
}

/// Named inputs of a generation request. Ordered so every derived text is stable.
pub type GenerationInputs = BTreeMap<String, InputValue>;

/// Joins every textual fragment of the inputs into one analysis string.
pub fn input_text(inputs: &GenerationInputs) -> String {
    inputs
        .values()
        .flat_map(|value| value.fragments())
        .collect::<Vec<_>>()
        .join(" ")
}
