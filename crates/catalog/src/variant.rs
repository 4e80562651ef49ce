use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use ecms_core::{CategoryId, DomainResult, Entity, OptionId, VariantId};

fn active_by_default() -> bool {
    true
}

/// One concrete value of a variant (e.g. `Red` for `Color`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub id: OptionId,
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: u32,
    /// Owning variant as recorded by the backend. The engine trusts the
    /// variant it found the option under, not this field.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Inactive options stay in the catalog but never appear in combinations.
    #[serde(default = "active_by_default")]
    pub active: bool,
}

impl VariantOption {
    pub fn new(id: impl Into<OptionId>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            description: String::new(),
            weight: 0,
            variant_id: None,
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Entity for VariantOption {
    type Id = OptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product attribute dimension (e.g. `Color`, `Size`) with its options in
/// their intrinsic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub options: Vec<VariantOption>,
}

impl Variant {
    pub fn new(id: impl Into<VariantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            weight: 0,
            category_id: None,
            options: Vec::new(),
        }
    }

    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_option(mut self, option: VariantOption) -> Self {
        self.options.push(option);
        self
    }

    /// Active options, in intrinsic order.
    pub fn active_options(&self) -> impl Iterator<Item = &VariantOption> {
        self.options.iter().filter(|o| o.active)
    }

    pub fn active_count(&self) -> usize {
        self.active_options().count()
    }

    pub fn option_by_value_mut(&mut self, value: &str) -> Option<&mut VariantOption> {
        self.options.iter_mut().find(|o| o.value == value)
    }

    pub fn option_by_value(&self, value: &str) -> Option<&VariantOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The static set of variants available to a product form session.
///
/// Serialized as the plain list of variant records the backend returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    variants: Vec<Variant>,
}

impl Catalog {
    /// Build a catalog, keeping the first record for any repeated variant id.
    pub fn new(variants: Vec<Variant>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(variants.len());
        for variant in variants {
            if !seen.insert(variant.id.clone()) {
                tracing::warn!(variant_id = %variant.id, "duplicate variant in catalog; keeping first record");
                continue;
            }
            if variant.options.is_empty() {
                tracing::warn!(variant_id = %variant.id, "variant has no options; selecting it yields no combinations");
            }
            kept.push(variant);
        }
        Self { variants: kept }
    }

    /// Parse the backend's list-of-records catalog.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let variants: Vec<Variant> = serde_json::from_str(json)?;
        Ok(Self::new(variants))
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(&self.variants)?)
    }

    /// Variants offered for a category. Variants with no category are shared
    /// by every category.
    pub fn for_category(&self, category_id: &CategoryId) -> Self {
        let variants = self
            .variants
            .iter()
            .filter(|v| v.category_id.as_ref().is_none_or(|c| c == category_id))
            .cloned()
            .collect();
        Self { variants }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn get(&self, id: &VariantId) -> Option<&Variant> {
        ecms_core::entity::find_by_id(&self.variants, id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }
}
