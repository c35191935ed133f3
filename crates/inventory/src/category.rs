use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{CategoryId, DomainError, DomainResult, Entity};

/// Product category (administrative grouping).
///
/// Names are unique across the store and immutable once any product
/// references the category; only the description may be edited afterwards.
/// Both rules are enforced by the write store, which owns the uniqueness and
/// referential indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    id: CategoryId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl ProductCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        Ok(Self {
            id: CategoryId::new(),
            name,
            description: description.into(),
            created_at: Utc::now(),
        })
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the description. The name stays fixed; a category is renamed
    /// only by retiring it and creating a new one.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }
}

impl Entity for ProductCategory {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
