//! Stores and the "create store" draft.

use serde::{Deserialize, Serialize};

use ecms_core::{DomainResult, Entity, StoreId, UserId, ValidationErrors};

/// A store owned by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "ID")]
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub admin_id: UserId,
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A store about to be created. The backend assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StoreDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Store name is required");
        errors.into_result()
    }

    pub fn to_payload(&self) -> DomainResult<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
