//! Category draft: a category with the variants (and option labels) it offers.

use serde::{Deserialize, Serialize};

use ecms_core::{CategoryId, DomainResult, StoreId, ValidationErrors};

/// A variant being defined alongside a new category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub name: String,
    pub options: Vec<String>,
}

impl VariantDraft {
    pub fn new(name: impl Into<String>, options: &[&str]) -> Self {
        Self {
            name: name.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<CategoryId>,
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub variants: Vec<VariantDraft>,
}

impl CategoryDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name, "Category name is required");
        if self.store_id.is_none() {
            errors.push("storeId", "Store is required");
        }

        for (i, variant) in self.variants.iter().enumerate() {
            errors.require(format!("variants.{i}.name"), &variant.name, "Variant name is required");
            if variant.options.is_empty() {
                errors.push(format!("variants.{i}.options"), "At least one option is required");
            }
            for (j, option) in variant.options.iter().enumerate() {
                errors.require(
                    format!("variants.{i}.options.{j}"),
                    option,
                    "Option value is required",
                );
            }
        }

        errors.into_result()
    }

    pub fn to_payload(&self) -> DomainResult<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
