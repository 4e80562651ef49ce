//! Cartesian product of option sets.
//!
//! Kept free of any selection or form state so it can be tested and
//! benchmarked on its own.

use serde::{Deserialize, Serialize};

use ecms_core::{OptionId, ValueObject, VariantId};

use crate::variant::{Variant, VariantOption};

/// Every way to pick one element from each factor, in factor order.
///
/// The last factor varies fastest. No factors yields a single empty pick;
/// any empty factor yields no picks at all.
pub fn cartesian_product<'a, T>(factors: &[&'a [T]]) -> Vec<Vec<&'a T>> {
    let mut out: Vec<Vec<&'a T>> = vec![Vec::with_capacity(factors.len())];

    for &factor in factors {
        if factor.is_empty() {
            return Vec::new();
        }
        out = out
            .into_iter()
            .flat_map(|prefix| {
                factor.iter().map(move |element| {
                    let mut next = prefix.clone();
                    next.push(element);
                    next
                })
            })
            .collect();
    }

    out
}

/// One option in a SKU row, paired with the variant it was picked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOption {
    pub id: OptionId,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub variant_id: VariantId,
}

impl ItemOption {
    pub fn from_option(variant_id: &VariantId, option: &VariantOption) -> Self {
        Self {
            id: option.id.clone(),
            value: option.value.clone(),
            description: option.description.clone(),
            variant_id: variant_id.clone(),
        }
    }
}

impl ValueObject for ItemOption {}

/// Identity of a combination: the ordered `(variant, option)` picks.
pub type CombinationKey = Vec<(VariantId, OptionId)>;

/// One pick of an active option per selected variant, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    picks: Vec<ItemOption>,
}

impl Combination {
    pub fn new(picks: Vec<ItemOption>) -> Self {
        Self { picks }
    }

    pub fn picks(&self) -> &[ItemOption] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Option labels in selection order, e.g. `["Red", "S"]`.
    pub fn values(&self) -> Vec<&str> {
        self.picks.iter().map(|p| p.value.as_str()).collect()
    }

    pub fn key(&self) -> CombinationKey {
        self.picks
            .iter()
            .map(|p| (p.variant_id.clone(), p.id.clone()))
            .collect()
    }

    pub fn into_picks(self) -> Vec<ItemOption> {
        self.picks
    }
}

impl ValueObject for Combination {}

/// All combinations of the active options of `selected`, in selection order.
///
/// No selected variants, or any selected variant without active options,
/// yields no combinations.
pub fn combinations_of(selected: &[Variant]) -> Vec<Combination> {
    if selected.is_empty() {
        return Vec::new();
    }

    let active: Vec<Vec<VariantOption>> = selected
        .iter()
        .map(|v| v.active_options().cloned().collect())
        .collect();
    let factors: Vec<&[VariantOption]> = active.iter().map(Vec::as_slice).collect();

    cartesian_product(&factors)
        .into_iter()
        .map(|row| {
            let picks = row
                .into_iter()
                .zip(selected)
                .map(|(option, variant)| ItemOption::from_option(&variant.id, option))
                .collect();
            Combination::new(picks)
        })
        .collect()
}
