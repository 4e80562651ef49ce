//! Product draft: the typed record behind the "create product" form.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use ecms_core::{CategoryId, DomainResult, StoreId, ValidationErrors, VariantId};

use crate::engine::VariantSelection;
use crate::item::ProductItem;

pub const MAX_RATING: f32 = 5.0;

/// A product as submitted to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    pub is_featured: bool,
    pub is_archived: bool,
    pub category_id: Option<CategoryId>,
    pub store_id: Option<StoreId>,
    pub selected_variants: Vec<VariantId>,
    #[serde(default)]
    pub items: Vec<ProductItem>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn for_store(mut self, store_id: StoreId) -> Self {
        self.store_id = Some(store_id);
        self
    }

    /// Copy the selected variant ids and rows out of a selection session.
    pub fn with_selection(mut self, selection: &VariantSelection) -> Self {
        self.sync_selection(selection);
        self
    }

    pub fn sync_selection(&mut self, selection: &VariantSelection) {
        self.selected_variants = selection.selected_ids();
        self.items = selection.items().to_vec();
    }

    /// Collect every field violation.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name, "Name is required");
        errors.require("description", &self.description, "Description is required");

        if self.rating.is_some_and(|r| !(0.0..=MAX_RATING).contains(&r)) {
            errors.push("rating", format!("Rating must be between 0 and {MAX_RATING}"));
        }

        if self.category_id.as_ref().is_none_or(CategoryId::is_blank) {
            errors.push("categoryId", "Category is required");
        }
        if self.store_id.is_none() {
            errors.push("storeId", "Store is required");
        }

        let mut skus = HashSet::new();
        for (i, item) in self.items.iter().enumerate() {
            let at = format!("items.{i}");
            errors.require(format!("{at}.sku"), &item.sku, "SKU is required");
            if !item.sku.trim().is_empty() && !skus.insert(item.sku.trim()) {
                errors.push(format!("{at}.sku"), format!("SKU '{}' is used by another item", item.sku));
            }
            if item.discounted_price.is_some_and(|d| d > item.price) {
                errors.push(
                    format!("{at}.discountedPrice"),
                    "Discounted price must not exceed price",
                );
            }
            for (j, option) in item.variant_options.iter().enumerate() {
                let at = format!("{at}.variantOptions.{j}");
                if option.id.is_blank() {
                    errors.push(format!("{at}.id"), "ID is required");
                }
                errors.require(format!("{at}.value"), &option.value, "Value is required");
                if option.variant_id.is_blank() {
                    errors.push(format!("{at}.variantId"), "Variant ID is required");
                }
            }
        }

        errors.into_result()
    }

    /// Validate, then render the JSON body for the create-product call.
    pub fn to_payload(&self) -> DomainResult<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
