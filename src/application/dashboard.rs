//! Coordinates the "my listings" panel: one listing store, a persistent
//! create form and at most one edit form at a time.

use crate::application::form::{CardForm, SubmitOutcome};
use crate::application::store::ListingStore;
use crate::domain::{FormError, StoreError};
use crate::infra::channel::{Channel, ChannelError};
use crate::infra::protocol::{self, Profile};
use crate::infra::session::Session;
use std::sync::Arc;

/// Orchestrator behind the dashboard panel.
///
/// Only one of {create form, edit form} is visible at a time. Entering edit
/// mode suppresses the create form but keeps its in-progress state, so a
/// half-typed draft survives a detour through editing.
pub struct Dashboard {
    channel: Arc<dyn Channel>,
    store: Arc<ListingStore>,
    create_form: CardForm,
    editing: Option<CardForm>,
}

impl Dashboard {
    pub fn new(channel: Arc<dyn Channel>, session: Session) -> Self {
        let store = Arc::new(ListingStore::new(Arc::clone(&channel), session));
        Self {
            channel,
            store,
            create_form: CardForm::new_create(),
            editing: None,
        }
    }

    pub fn store(&self) -> &ListingStore {
        &self.store
    }

    /// Username of the signed-in user. [`ChannelError::SessionRejected`]
    /// means the caller must route back to login.
    pub async fn profile(&self) -> Result<Profile, ChannelError> {
        protocol::fetch_profile(self.channel.as_ref()).await
    }

    /// Reload both snapshots.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.store.load_feed().await?;
        self.store.load_mine().await
    }

    /// Switch the single editing slot to `id` and open an edit form bound to
    /// it. Any previous editing target is dropped.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), StoreError> {
        let listing = self
            .store
            .find_mine(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.editing = Some(CardForm::new_edit(&listing));
        Ok(())
    }

    /// Close the edit view without saving.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Id currently occupying the editing slot.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().and_then(|form| form.editing_id())
    }

    /// The form occupying the panel's single visible slot: the edit form
    /// while one is open, the create form otherwise.
    pub fn visible_form(&self) -> &CardForm {
        self.editing.as_ref().unwrap_or(&self.create_form)
    }

    pub fn visible_form_mut(&mut self) -> &mut CardForm {
        match &mut self.editing {
            Some(form) => form,
            None => &mut self.create_form,
        }
    }

    /// Submit whichever form is visible. A saved edit closes the edit view; a
    /// failure keeps the form open for correction.
    pub async fn submit_visible(&mut self) -> Result<SubmitOutcome, FormError> {
        let store = Arc::clone(&self.store);
        let form = match &mut self.editing {
            Some(form) => form,
            None => &mut self.create_form,
        };
        let outcome = form.submit(&store).await?;
        if matches!(outcome, SubmitOutcome::Saved(_)) {
            self.editing = None;
        }
        Ok(outcome)
    }

    /// Delete directly, without entering edit mode. Deleting the listing
    /// currently under edit also closes the edit view, since the form would
    /// otherwise be bound to a removed entry.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        if self.editing_id() == Some(id) {
            self.editing = None;
        }
        Ok(())
    }
}
