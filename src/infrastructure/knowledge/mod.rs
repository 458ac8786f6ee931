//! Read-only domain knowledge table and its bridge into the search index.

mod catalog;

use std::path::Path;

use tracing::{debug, info};

use crate::{
    domain::{Domain, DomainError, DomainProfile, KnowledgeDocument},
    infrastructure::index::InMemoryIndex,
};

pub use catalog::{builtin_profiles, ANCHOR_WEIGHT};

pub const GENERAL_TEMPLATE: &str = "General business document template";
pub const GENERAL_BEST_PRACTICES: [&str; 3] = [
    "Follow industry standards",
    "Ensure clear requirements",
    "Maintain traceability",
];
pub const GENERAL_EXAMPLES: [&str; 2] = [
    "Standard business requirements",
    "User acceptance criteria",
];
pub const GENERAL_VALIDATION_RULES: [&str; 2] =
    ["Validate input completeness", "Ensure requirement clarity"];
pub const GENERAL_STAKEHOLDERS: [&str; 3] = ["Business Users", "IT Team", "Project Manager"];

/// Owns one profile per scored domain, kept in canonical domain order.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    profiles: Vec<DomainProfile>,
}

impl KnowledgeStore {
    /// Store backed by the built-in table.
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }

    /// Validates and orders externally supplied profiles.
    pub fn from_profiles(profiles: Vec<DomainProfile>) -> Result<Self, DomainError> {
        if profiles.is_empty() {
            return Err(DomainError::knowledge("knowledge table is empty"));
        }

        let mut normalized = profiles
            .into_iter()
            .map(DomainProfile::normalized)
            .collect::<Result<Vec<_>, _>>()?;
        normalized.sort_by_key(|profile| profile.name);

        if let Some(pair) = normalized.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(DomainError::knowledge(format!(
                "domain `{}` is defined more than once",
                pair[0].name
            )));
        }

        Ok(Self {
            profiles: normalized,
        })
    }

    /// Loads a JSON array of profiles, replacing the built-in table.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DomainError::knowledge(format!("failed to read {}: {err}", path.display()))
        })?;
        let profiles: Vec<DomainProfile> = serde_json::from_str(&raw).map_err(|err| {
            DomainError::knowledge(format!("failed to parse {}: {err}", path.display()))
        })?;

        let store = Self::from_profiles(profiles)?;
        info!(
            target: "docsmith::knowledge",
            path = %path.display(),
            domains = store.profiles.len(),
            "loaded knowledge table"
        );
        Ok(store)
    }

    /// Profiles in canonical domain order.
    pub fn profiles(&self) -> &[DomainProfile] {
        &self.profiles
    }

    pub fn profile(&self, domain: Domain) -> Option<&DomainProfile> {
        self.profiles.iter().find(|profile| profile.name == domain)
    }

    pub fn domains(&self) -> Vec<Domain> {
        self.profiles.iter().map(|profile| profile.name).collect()
    }

    pub fn documents(&self) -> Vec<KnowledgeDocument> {
        self.profiles
            .iter()
            .flat_map(DomainProfile::documents)
            .collect()
    }

    /// Flattens every profile into the index. Returns how many documents were stored.
    pub fn seed_index(&self, index: &mut InMemoryIndex) -> Result<usize, DomainError> {
        let (texts, metadata): (Vec<_>, Vec<_>) = self
            .documents()
            .into_iter()
            .map(|doc| {
                let metadata = doc.metadata();
                (doc.text, metadata)
            })
            .unzip();

        let added = index.add(texts, metadata)?;
        debug!(target: "docsmith::knowledge", added, "seeded index");
        Ok(added)
    }
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::builtin()
    }
}
