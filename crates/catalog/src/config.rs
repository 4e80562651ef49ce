//! Engine configuration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SKU_PREFIX_ENV: &str = "ECMS_SKU_PREFIX";
pub const ITEM_SYNC_ENV: &str = "ECMS_ITEM_SYNC";

/// What happens to SKU rows when the combination set is recomputed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSync {
    /// Every recomputation rebuilds all rows with placeholders, discarding
    /// SKU/quantity/price edits.
    #[default]
    Replace,
    /// Rows whose combination survives keep their edits; new rows get
    /// placeholders.
    #[serde(alias = "preserve")]
    PreserveEdits,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item sync policy `{0}` (expected `replace` or `preserve`)")]
pub struct UnknownItemSync(pub String);

impl FromStr for ItemSync {
    type Err = UnknownItemSync;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "preserve" | "preserve_edits" => Ok(Self::PreserveEdits),
            other => Err(UnknownItemSync(other.to_string())),
        }
    }
}

/// Settings for a [`VariantSelection`](crate::engine::VariantSelection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Placeholder SKUs are `<sku_prefix>-<1-based row index>`.
    pub sku_prefix: String,
    pub item_sync: ItemSync,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sku_prefix: "SKU".to_string(),
            item_sync: ItemSync::Replace,
        }
    }
}

impl EngineConfig {
    /// Read `ECMS_SKU_PREFIX` and `ECMS_ITEM_SYNC`, keeping defaults for
    /// anything unset or unrecognized.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(prefix) = lookup(SKU_PREFIX_ENV) {
            if prefix.trim().is_empty() {
                tracing::warn!("{SKU_PREFIX_ENV} is blank; using default SKU prefix");
            } else {
                config.sku_prefix = prefix.trim().to_string();
            }
        }

        if let Some(raw) = lookup(ITEM_SYNC_ENV) {
            match raw.parse::<ItemSync>() {
                Ok(policy) => config.item_sync = policy,
                Err(err) => tracing::warn!(%err, "ignoring {ITEM_SYNC_ENV}"),
            }
        }

        config
    }

    pub fn placeholder_sku(&self, index: usize) -> String {
        format!("{}-{}", self.sku_prefix, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_plain_placeholders() {
        let config = EngineConfig::default();
        assert_eq!(config.placeholder_sku(0), "SKU-1");
        assert_eq!(config.item_sync, ItemSync::Replace);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup(&[
            (SKU_PREFIX_ENV, "TSHIRT"),
            (ITEM_SYNC_ENV, "Preserve"),
        ]));
        assert_eq!(config.placeholder_sku(4), "TSHIRT-5");
        assert_eq!(config.item_sync, ItemSync::PreserveEdits);
    }

    #[test]
    fn unrecognized_env_values_fall_back_to_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            (SKU_PREFIX_ENV, "   "),
            (ITEM_SYNC_ENV, "merge"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: EngineConfig = serde_json::from_str(r#"{ "item_sync": "preserve" }"#).unwrap();
        assert_eq!(config.sku_prefix, "SKU");
        assert_eq!(config.item_sync, ItemSync::PreserveEdits);
    }

    #[test]
    fn unknown_policy_error_names_the_value() {
        let err = "merge".parse::<ItemSync>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown item sync policy `merge` (expected `replace` or `preserve`)"
        );
    }
}
