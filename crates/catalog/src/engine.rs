//! Variant combination engine.
//!
//! Owns the variant pool, the ordered selection, and the SKU rows derived
//! from them. Every mutation is decided as events (`handle`) and applied
//! (`apply`); applying an event that touches the selection recomputes the
//! combinations and rows before returning, so callers never observe stale
//! rows.
//!
//! Unknown variant ids or option values are not errors: the command decides
//! to no events and nothing changes.

use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use ecms_core::entity::position_of;
use ecms_core::{Aggregate, AggregateRoot, DomainError, DomainResult, SessionId, VariantId};

use crate::combination::{Combination, combinations_of};
use crate::config::EngineConfig;
use crate::item::{ItemEdit, ProductItem, rebuild_items};
use crate::variant::{Catalog, Variant};

/// Command: move a pooled variant to the end of the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectVariant {
    pub variant_id: VariantId,
}

/// Command: return a selected variant to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeselectVariant {
    pub variant_id: VariantId,
}

/// Command: toggle whether an option participates in combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOptionActive {
    pub variant_id: VariantId,
    pub option_value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionCommand {
    SelectVariant(SelectVariant),
    DeselectVariant(DeselectVariant),
    SetOptionActive(SetOptionActive),
}

/// Event: VariantSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelected {
    pub variant_id: VariantId,
}

/// Event: VariantDeselected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDeselected {
    pub variant_id: VariantId,
}

/// Event: OptionActivationChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionActivationChanged {
    pub variant_id: VariantId,
    pub option_value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    VariantSelected(VariantSelected),
    VariantDeselected(VariantDeselected),
    OptionActivationChanged(OptionActivationChanged),
}

impl SelectionEvent {
    /// Stable event name, used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            SelectionEvent::VariantSelected(_) => "catalog.selection.variant_selected",
            SelectionEvent::VariantDeselected(_) => "catalog.selection.variant_deselected",
            SelectionEvent::OptionActivationChanged(_) => "catalog.selection.option_activation_changed",
        }
    }
}

/// Aggregate root: the variant selection of one product form session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSelection {
    id: SessionId,
    config: EngineConfig,
    /// Catalog order, used to put deselected variants back where they were.
    catalog_order: Vec<VariantId>,
    pool: Vec<Variant>,
    selected: Vec<Variant>,
    combinations: Vec<Combination>,
    items: Vec<ProductItem>,
    version: u64,
}

impl VariantSelection {
    /// Start a session with every catalog variant in the pool.
    pub fn new(id: SessionId, catalog: Catalog) -> Self {
        Self::with_config(id, catalog, EngineConfig::default())
    }

    pub fn with_config(id: SessionId, catalog: Catalog, config: EngineConfig) -> Self {
        let pool = catalog.into_variants();
        let catalog_order = pool.iter().map(|v| v.id.clone()).collect();
        Self {
            id,
            config,
            catalog_order,
            pool,
            selected: Vec::new(),
            combinations: Vec::new(),
            items: Vec::new(),
            version: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Variants available for selection, in catalog order.
    pub fn pool(&self) -> &[Variant] {
        &self.pool
    }

    /// Selected variants, in selection order.
    pub fn selected(&self) -> &[Variant] {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<VariantId> {
        self.selected.iter().map(|v| v.id.clone()).collect()
    }

    pub fn is_selected(&self, variant_id: &VariantId) -> bool {
        position_of(&self.selected, variant_id).is_some()
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn items(&self) -> &[ProductItem] {
        &self.items
    }

    /// Any variant known to this session, pooled or selected.
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        ecms_core::entity::find_by_id(&self.selected, variant_id)
            .or_else(|| ecms_core::entity::find_by_id(&self.pool, variant_id))
    }

    /// Returns `true` if the variant moved into the selection.
    pub fn select_variant(&mut self, variant_id: impl Into<VariantId>) -> bool {
        self.dispatch(SelectionCommand::SelectVariant(SelectVariant {
            variant_id: variant_id.into(),
        }))
    }

    /// Returns `true` if the variant moved back to the pool.
    pub fn deselect_variant(&mut self, variant_id: impl Into<VariantId>) -> bool {
        self.dispatch(SelectionCommand::DeselectVariant(DeselectVariant {
            variant_id: variant_id.into(),
        }))
    }

    /// Returns `true` if the option's flag changed.
    pub fn set_option_active(
        &mut self,
        variant_id: impl Into<VariantId>,
        option_value: impl Into<String>,
        active: bool,
    ) -> bool {
        self.dispatch(SelectionCommand::SetOptionActive(SetOptionActive {
            variant_id: variant_id.into(),
            option_value: option_value.into(),
            active,
        }))
    }

    /// Decide and apply `command`. Returns whether anything changed.
    pub fn dispatch(&mut self, command: SelectionCommand) -> bool {
        let Ok(events) = self.execute(&command);
        if events.is_empty() {
            tracing::debug!(session_id = %self.id, ?command, "selection command ignored");
        }
        !events.is_empty()
    }

    /// Regenerate combinations and rows from the current selection.
    pub fn recompute(&mut self) {
        self.combinations = combinations_of(&self.selected);
        self.items = rebuild_items(&self.config, &self.combinations, &self.items);
        tracing::debug!(
            session_id = %self.id,
            selected = self.selected.len(),
            combinations = self.combinations.len(),
            "recomputed variant combinations"
        );
    }

    /// Apply form edits to the row at `index`.
    pub fn edit_item(&mut self, index: usize, edit: &ItemEdit) -> DomainResult<&ProductItem> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found(format!("item {index} (of {len})")))?;
        edit.apply_to(item);
        Ok(item)
    }

    fn decide_select(&self, cmd: &SelectVariant) -> Vec<SelectionEvent> {
        if self.is_selected(&cmd.variant_id) || position_of(&self.pool, &cmd.variant_id).is_none() {
            return Vec::new();
        }
        vec![SelectionEvent::VariantSelected(VariantSelected {
            variant_id: cmd.variant_id.clone(),
        })]
    }

    fn decide_deselect(&self, cmd: &DeselectVariant) -> Vec<SelectionEvent> {
        if !self.is_selected(&cmd.variant_id) {
            return Vec::new();
        }
        vec![SelectionEvent::VariantDeselected(VariantDeselected {
            variant_id: cmd.variant_id.clone(),
        })]
    }

    fn decide_option(&self, cmd: &SetOptionActive) -> Vec<SelectionEvent> {
        let Some(option) = self
            .variant(&cmd.variant_id)
            .and_then(|v| v.option_by_value(&cmd.option_value))
        else {
            return Vec::new();
        };
        if option.active == cmd.active {
            return Vec::new();
        }
        vec![SelectionEvent::OptionActivationChanged(OptionActivationChanged {
            variant_id: cmd.variant_id.clone(),
            option_value: cmd.option_value.clone(),
            active: cmd.active,
        })]
    }

    /// Index in the pool that keeps pooled variants in catalog order.
    fn pool_slot(&self, variant_id: &VariantId) -> usize {
        let rank = |id: &VariantId| self.catalog_order.iter().position(|c| c == id);
        let target = rank(variant_id);
        self.pool
            .iter()
            .position(|v| rank(&v.id) > target)
            .unwrap_or(self.pool.len())
    }
}

impl AggregateRoot for VariantSelection {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for VariantSelection {
    type Command = SelectionCommand;
    type Event = SelectionEvent;
    type Error = Infallible;

    fn apply(&mut self, event: &Self::Event) {
        let selection_changed = match event {
            SelectionEvent::VariantSelected(e) => match position_of(&self.pool, &e.variant_id) {
                Some(at) => {
                    let variant = self.pool.remove(at);
                    self.selected.push(variant);
                    true
                }
                None => false,
            },
            SelectionEvent::VariantDeselected(e) => {
                match position_of(&self.selected, &e.variant_id) {
                    Some(at) => {
                        let variant = self.selected.remove(at);
                        let slot = self.pool_slot(&variant.id);
                        self.pool.insert(slot, variant);
                        true
                    }
                    None => false,
                }
            }
            SelectionEvent::OptionActivationChanged(e) => {
                let selected = self.is_selected(&e.variant_id);
                let variants = if selected {
                    &mut self.selected
                } else {
                    &mut self.pool
                };
                if let Some(option) = variants
                    .iter_mut()
                    .find(|v| v.id == e.variant_id)
                    .and_then(|v| v.option_by_value_mut(&e.option_value))
                {
                    option.active = e.active;
                }
                // Pooled variants contribute nothing until selected.
                selected
            }
        };

        tracing::debug!(session_id = %self.id, event_type = event.event_type(), "applying selection event");
        if selection_changed {
            self.recompute();
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        Ok(match command {
            SelectionCommand::SelectVariant(cmd) => self.decide_select(cmd),
            SelectionCommand::DeselectVariant(cmd) => self.decide_deselect(cmd),
            SelectionCommand::SetOptionActive(cmd) => self.decide_option(cmd),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemSync;
    use crate::variant::VariantOption;
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Variant::new("color", "Color")
                .with_option(VariantOption::new("red", "Red"))
                .with_option(VariantOption::new("blue", "Blue")),
            Variant::new("size", "Size")
                .with_option(VariantOption::new("s", "S"))
                .with_option(VariantOption::new("m", "M"))
                .with_option(VariantOption::new("l", "L")),
            Variant::new("material", "Material"),
        ])
    }

    fn session() -> VariantSelection {
        VariantSelection::new(SessionId::new(), catalog())
    }

    fn rows(selection: &VariantSelection) -> Vec<Vec<&str>> {
        selection.combinations().iter().map(|c| c.values()).collect()
    }

    #[test]
    fn scenario_color_then_size_yields_six_rows_in_order() {
        let mut s = session();
        assert!(s.select_variant("color"));
        assert!(s.select_variant("size"));

        assert_eq!(
            rows(&s),
            vec![
                vec!["Red", "S"],
                vec!["Red", "M"],
                vec!["Red", "L"],
                vec!["Blue", "S"],
                vec!["Blue", "M"],
                vec!["Blue", "L"],
            ]
        );
        let skus: Vec<_> = s.items().iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["SKU-1", "SKU-2", "SKU-3", "SKU-4", "SKU-5", "SKU-6"]);
    }

    #[test]
    fn scenario_deactivating_blue_keeps_red_rows() {
        let mut s = session();
        s.select_variant("color");
        s.select_variant("size");
        assert!(s.set_option_active("color", "Blue", false));

        assert_eq!(
            rows(&s),
            vec![vec!["Red", "S"], vec!["Red", "M"], vec!["Red", "L"]]
        );
        assert_eq!(s.items().len(), 3);
    }

    #[test]
    fn scenario_color_only() {
        let mut s = session();
        s.select_variant("color");
        assert_eq!(rows(&s), vec![vec!["Red"], vec!["Blue"]]);
    }

    #[test]
    fn scenario_all_options_inactive_yields_nothing() {
        let mut s = session();
        s.select_variant("color");
        s.set_option_active("color", "Red", false);
        s.set_option_active("color", "Blue", false);

        assert!(s.combinations().is_empty());
        assert!(s.items().is_empty());
        // The options still exist and can come back.
        assert_eq!(s.variant(&"color".into()).unwrap().options.len(), 2);
        s.set_option_active("color", "Red", true);
        assert_eq!(rows(&s), vec![vec!["Red"]]);
    }

    #[test]
    fn selecting_a_variant_without_options_empties_the_rows() {
        let mut s = session();
        s.select_variant("color");
        s.select_variant("material");
        assert!(s.items().is_empty());

        s.deselect_variant("material");
        assert_eq!(s.items().len(), 2);
    }

    #[test]
    fn nothing_selected_means_no_rows() {
        let mut s = session();
        s.recompute();
        assert!(s.combinations().is_empty());
        assert!(s.items().is_empty());
    }

    #[test]
    fn unknown_or_repeated_commands_are_ignored() {
        let mut s = session();
        assert!(!s.select_variant("weight"));
        assert!(!s.deselect_variant("color"));
        assert!(!s.set_option_active("color", "Green", false));
        assert!(!s.set_option_active("weight", "Red", false));
        assert_eq!(s.version(), 0);

        assert!(s.select_variant("color"));
        assert!(!s.select_variant("color"));
        assert!(!s.set_option_active("color", "Red", true));
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let s = session();
        let before = s.clone();
        let cmd = SelectionCommand::SelectVariant(SelectVariant {
            variant_id: "size".into(),
        });

        let events = s.handle(&cmd).unwrap();
        assert_eq!(s, before);
        assert_eq!(
            events,
            vec![SelectionEvent::VariantSelected(VariantSelected {
                variant_id: "size".into()
            })]
        );
    }

    #[test]
    fn pool_changes_apply_once_selected() {
        let mut s = session();
        assert!(s.set_option_active("size", "M", false));
        assert!(s.items().is_empty());

        s.select_variant("size");
        assert_eq!(rows(&s), vec![vec!["S"], vec!["L"]]);
    }

    #[test]
    fn deselect_returns_variant_to_catalog_position() {
        let mut s = session();
        s.select_variant("size");
        s.select_variant("color");
        s.deselect_variant("color");
        s.deselect_variant("size");

        let pool: Vec<_> = s.pool().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(pool, vec!["color", "size", "material"]);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn deselect_preserves_option_flags() {
        let mut s = session();
        s.select_variant("color");
        s.set_option_active("color", "Red", false);
        s.deselect_variant("color");
        s.select_variant("color");

        assert_eq!(rows(&s), vec![vec!["Blue"]]);
    }

    #[test]
    fn selection_order_sets_column_order() {
        let mut s = session();
        s.select_variant("size");
        s.select_variant("color");

        assert_eq!(rows(&s)[0], vec!["S", "Red"]);
        assert_eq!(s.selected_ids(), vec![VariantId::new("size"), VariantId::new("color")]);
        let first = &s.items()[0].variant_options;
        assert_eq!(first[0].variant_id, VariantId::new("size"));
        assert_eq!(first[1].variant_id, VariantId::new("color"));
    }

    #[test]
    fn edits_are_discarded_on_recompute_by_default() {
        let mut s = session();
        s.select_variant("color");
        s.edit_item(0, &ItemEdit::default().sku("RED").price(1500)).unwrap();
        assert_eq!(s.items()[0].sku, "RED");

        s.select_variant("size");
        assert_eq!(s.items()[0].sku, "SKU-1");
        assert_eq!(s.items()[0].price, 0);
    }

    #[test]
    fn edits_survive_when_preserving() {
        let config = EngineConfig {
            item_sync: ItemSync::PreserveEdits,
            ..EngineConfig::default()
        };
        let mut s = VariantSelection::with_config(SessionId::new(), catalog(), config);
        s.select_variant("color");
        s.select_variant("size");
        // (Blue, L)
        s.edit_item(5, &ItemEdit::default().sku("TEE-BL").quantity(3)).unwrap();

        s.set_option_active("size", "S", false);
        let blue_l = s
            .items()
            .iter()
            .find(|i| i.variant_options.iter().map(|o| o.value.as_str()).eq(["Blue", "L"]))
            .unwrap();
        assert_eq!(blue_l.sku, "TEE-BL");
        assert_eq!(blue_l.quantity, 3);
    }

    #[test]
    fn editing_a_missing_row_is_not_found() {
        let mut s = session();
        let err = s.edit_item(0, &ItemEdit::default().quantity(1)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn custom_prefix_is_used_for_placeholders() {
        let config = EngineConfig {
            sku_prefix: "TEE".to_string(),
            ..EngineConfig::default()
        };
        let mut s = VariantSelection::with_config(SessionId::new(), catalog(), config);
        s.select_variant("color");
        assert_eq!(s.items()[1].sku, "TEE-2");
    }

    fn arb_command() -> impl Strategy<Value = SelectionCommand> {
        let variant = prop::sample::select(vec!["color", "size", "material", "weight"]);
        let value = prop::sample::select(vec!["Red", "Blue", "S", "M", "L", "XL"]);
        prop_oneof![
            variant.clone().prop_map(|v| SelectionCommand::SelectVariant(SelectVariant {
                variant_id: v.into()
            })),
            variant.clone().prop_map(|v| SelectionCommand::DeselectVariant(DeselectVariant {
                variant_id: v.into()
            })),
            (variant, value, any::<bool>()).prop_map(|(v, o, active)| {
                SelectionCommand::SetOptionActive(SetOptionActive {
                    variant_id: v.into(),
                    option_value: o.to_string(),
                    active,
                })
            }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: rows always equal the product of the current selection.
        #[test]
        fn rows_track_the_selection(commands in prop::collection::vec(arb_command(), 0..20)) {
            let mut s = session();
            for cmd in commands {
                s.dispatch(cmd);

                let expected = combinations_of(s.selected());
                prop_assert_eq!(s.combinations(), expected.as_slice());
                prop_assert_eq!(s.items().len(), expected.len());

                let count = if s.selected().is_empty() {
                    0
                } else {
                    s.selected().iter().map(Variant::active_count).product::<usize>()
                };
                prop_assert_eq!(s.combinations().len(), count);

                for (item, combo) in s.items().iter().zip(s.combinations()) {
                    prop_assert_eq!(item.variant_options.as_slice(), combo.picks());
                }
            }
        }

        /// Property: a variant is pooled or selected, never both, never lost.
        #[test]
        fn pool_and_selection_partition_the_catalog(
            commands in prop::collection::vec(arb_command(), 0..20)
        ) {
            let mut s = session();
            for cmd in commands {
                s.dispatch(cmd);
                let mut ids: Vec<_> = s
                    .pool()
                    .iter()
                    .chain(s.selected())
                    .map(|v| v.id.as_str().to_string())
                    .collect();
                ids.sort();
                prop_assert_eq!(ids, vec!["color", "material", "size"]);
            }
        }

        /// Property: recompute with no intervening mutation is idempotent.
        #[test]
        fn recompute_is_idempotent(commands in prop::collection::vec(arb_command(), 0..20)) {
            let mut s = session();
            for cmd in commands {
                s.dispatch(cmd);
            }
            let combos = s.combinations().to_vec();
            let items = s.items().to_vec();
            s.recompute();
            prop_assert_eq!(s.combinations(), combos.as_slice());
            prop_assert_eq!(s.items(), items.as_slice());
        }

        /// Property: select then deselect restores the previous combinations.
        #[test]
        fn select_then_deselect_restores_combinations(
            commands in prop::collection::vec(arb_command(), 0..20),
            candidate in prop::sample::select(vec!["color", "size", "material"])
        ) {
            let mut s = session();
            for cmd in commands {
                s.dispatch(cmd);
            }
            prop_assume!(!s.is_selected(&candidate.into()));

            let before = s.combinations().to_vec();
            let before_items = s.items().to_vec();
            prop_assert!(s.select_variant(candidate));
            prop_assert!(s.deselect_variant(candidate));
            prop_assert_eq!(s.combinations(), before.as_slice());
            prop_assert_eq!(s.items(), before_items.as_slice());
        }

        /// Property: without edits, preserving rows never duplicates a SKU.
        #[test]
        fn preserving_untouched_rows_keeps_skus_unique(
            commands in prop::collection::vec(arb_command(), 0..20)
        ) {
            let config = EngineConfig {
                item_sync: ItemSync::PreserveEdits,
                ..EngineConfig::default()
            };
            let mut s = VariantSelection::with_config(SessionId::new(), catalog(), config);
            for cmd in commands {
                s.dispatch(cmd);
                let skus: std::collections::HashSet<&str> =
                    s.items().iter().map(|i| i.sku.as_str()).collect();
                prop_assert_eq!(skus.len(), s.items().len());
            }
        }
    }
}
