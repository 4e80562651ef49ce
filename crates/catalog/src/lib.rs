//! Catalog domain module: variants, SKU combinations and product drafts.
//!
//! Pure, deterministic domain logic (no HTTP, no rendering, no storage). The
//! embedding form loads a [`Catalog`], drives a [`VariantSelection`], and
//! submits a [`ProductDraft`].

pub mod category;
pub mod combination;
pub mod config;
pub mod engine;
pub mod item;
pub mod product;
pub mod variant;

pub use category::{CategoryDraft, VariantDraft};
pub use combination::{Combination, CombinationKey, ItemOption, cartesian_product, combinations_of};
pub use config::{EngineConfig, ItemSync};
pub use engine::{
    DeselectVariant, OptionActivationChanged, SelectVariant, SelectionCommand, SelectionEvent,
    SetOptionActive, VariantDeselected, VariantSelected, VariantSelection,
};
pub use item::{ItemEdit, ProductItem};
pub use product::ProductDraft;
pub use variant::{Catalog, Variant, VariantOption};
