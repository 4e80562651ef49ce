//! The signed-in user and their selected store.

use serde::{Deserialize, Serialize};

use ecms_core::entity::find_by_id;
use ecms_core::{DomainError, DomainResult, SessionId, StoreId, UserId};

use crate::store::Store;

/// The authenticated admin as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub stores: Vec<Store>,
}

impl User {
    pub fn from_json(json: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn store(&self, id: StoreId) -> Option<&Store> {
        find_by_id(&self.stores, &id)
    }

    pub fn owns(&self, id: StoreId) -> bool {
        self.store(id).is_some()
    }
}

/// Explicit session state: who is signed in and which store they are editing.
///
/// Created by [`SessionContext::start`], consumed by [`SessionContext::end`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: SessionId,
    user: User,
    selected_store: Option<StoreId>,
}

impl SessionContext {
    /// Start a session, selecting the user's first store if they own any.
    pub fn start(user: User) -> Self {
        Self::resume(user, None)
    }

    /// Start a session, preferring `remembered` when the user still owns it.
    ///
    /// Falls back to the first store, then to no selection.
    pub fn resume(user: User, remembered: Option<StoreId>) -> Self {
        Self::start_with_id(SessionId::new(), user, remembered)
    }

    pub fn start_with_id(id: SessionId, user: User, remembered: Option<StoreId>) -> Self {
        let selected_store = remembered
            .filter(|store_id| user.owns(*store_id))
            .or_else(|| user.stores.first().map(|store| store.id));

        if remembered.is_some() && remembered != selected_store {
            tracing::debug!(
                session_id = %id,
                remembered = ?remembered,
                "remembered store no longer owned"
            );
        }
        tracing::info!(
            session_id = %id,
            user_id = %user.id,
            stores = user.stores.len(),
            selected_store = ?selected_store,
            "session started"
        );

        Self {
            id,
            user,
            selected_store,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn stores(&self) -> &[Store] {
        &self.user.stores
    }

    /// True when the user owns no stores and has to create one first.
    pub fn needs_store(&self) -> bool {
        self.user.stores.is_empty()
    }

    pub fn select_store(&mut self, store_id: StoreId) -> DomainResult<&Store> {
        let Some(store) = find_by_id(&self.user.stores, &store_id) else {
            return Err(DomainError::not_found(format!("store {store_id}")));
        };
        self.selected_store = Some(store_id);
        tracing::info!(session_id = %self.id, store_id = %store_id, "store selected");
        Ok(store)
    }

    /// Record a freshly created store and make it the selection.
    pub fn add_store(&mut self, store: Store) -> DomainResult<&Store> {
        if self.user.owns(store.id) {
            return Err(DomainError::conflict(format!("store {} already exists", store.id)));
        }
        if store.admin_id != self.user.id {
            return Err(DomainError::validation(format!(
                "store {} belongs to admin {}",
                store.id, store.admin_id
            )));
        }

        let store_id = store.id;
        self.user.stores.push(store);
        self.selected_store = Some(store_id);
        tracing::info!(session_id = %self.id, store_id = %store_id, "store created");

        let index = self.user.stores.len() - 1;
        Ok(&self.user.stores[index])
    }

    pub fn clear_store(&mut self) {
        self.selected_store = None;
    }

    pub fn selected_store(&self) -> Option<&Store> {
        self.selected_store.and_then(|id| self.user.store(id))
    }

    /// The selected store, or a validation error when none is selected.
    pub fn require_store(&self) -> DomainResult<&Store> {
        self.selected_store()
            .ok_or_else(|| DomainError::validation("no store selected"))
    }

    pub fn end(self) -> User {
        tracing::info!(session_id = %self.id, user_id = %self.user.id, "session ended");
        self.user
    }
}
