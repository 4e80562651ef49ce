//! SKU rows derived from combinations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combination::{Combination, CombinationKey, ItemOption};
use crate::config::{EngineConfig, ItemSync};

/// One sellable unit derived from a combination.
///
/// Prices are in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub sku: String,
    pub quantity: u32,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<u64>,
    pub variant_options: Vec<ItemOption>,
}

impl ProductItem {
    /// A fresh row for `combination` at `index`: placeholder SKU, zero quantity and price.
    pub fn placeholder(config: &EngineConfig, index: usize, combination: &Combination) -> Self {
        Self {
            sku: config.placeholder_sku(index),
            quantity: 0,
            price: 0,
            discounted_price: None,
            variant_options: combination.picks().to_vec(),
        }
    }

    pub fn key(&self) -> CombinationKey {
        self.variant_options
            .iter()
            .map(|o| (o.variant_id.clone(), o.id.clone()))
            .collect()
    }

    /// Copy user edits from `previous`, which sat at `previous_index` before.
    ///
    /// A SKU still equal to its old placeholder was never edited, so the row
    /// keeps its fresh placeholder instead.
    fn carry_edits_from(
        &mut self,
        config: &EngineConfig,
        previous_index: usize,
        previous: &ProductItem,
    ) {
        if previous.sku != config.placeholder_sku(previous_index) {
            self.sku = previous.sku.clone();
        }
        self.quantity = previous.quantity;
        self.price = previous.price;
        self.discounted_price = previous.discounted_price;
    }
}

/// Form edits to a single row. `None` fields are left untouched.
///
/// The option picks of a row are never editable; they follow the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEdit {
    pub sku: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<u64>,
    /// `Some(None)` clears the discounted price.
    pub discounted_price: Option<Option<u64>>,
}

impl ItemEdit {
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: u64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn discounted_price(mut self, discounted_price: Option<u64>) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }

    pub fn apply_to(&self, item: &mut ProductItem) {
        if let Some(sku) = &self.sku {
            item.sku = sku.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(discounted_price) = self.discounted_price {
            item.discounted_price = discounted_price;
        }
    }
}

/// Rebuild rows for `combinations`, honoring the configured sync policy.
pub fn rebuild_items(
    config: &EngineConfig,
    combinations: &[Combination],
    previous: &[ProductItem],
) -> Vec<ProductItem> {
    let mut items: Vec<ProductItem> = combinations
        .iter()
        .enumerate()
        .map(|(index, combination)| ProductItem::placeholder(config, index, combination))
        .collect();

    if config.item_sync == ItemSync::PreserveEdits && !previous.is_empty() {
        let by_key: HashMap<CombinationKey, (usize, &ProductItem)> = previous
            .iter()
            .enumerate()
            .map(|(index, item)| (item.key(), (index, item)))
            .collect();

        let mut carried = 0usize;
        for item in &mut items {
            if let Some(&(old_index, old)) = by_key.get(&item.key()) {
                item.carry_edits_from(config, old_index, old);
                carried += 1;
            }
        }
        tracing::debug!(carried, total = items.len(), "carried row edits across recomputation");
    }

    items
}
