//! Canonical listing state for one session: the global feed snapshot and the
//! user's own listings, synchronized over the request/ack channel.

use crate::domain::{
    Listing, ListingDraft, ListingId, ListingImage, ListingPatch, StoreError, filter,
    listing::{ImageUpload, new_listing_id},
};
use crate::infra::channel::Channel;
use crate::infra::protocol::{self, CardsAck, CreateAck, ImageReplacement, UpdateAck};
use crate::infra::session::Session;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
struct StoreState {
    feed: Vec<Listing>,
    mine: Vec<Listing>,
    price_ceiling: f64,
    in_flight: HashSet<ListingId>,
}

/// Holds the feed and "mine" snapshots and applies create/update/delete.
///
/// Mutations are ack-gated, not optimistic: local state changes only after
/// the server confirms, because the image field has no final form until the
/// server returns its storage path. A listing therefore never shows up with
/// an image that cannot be fetched.
///
/// Methods take `&self`; the snapshots sit behind a mutex that is never held
/// across an await, so concurrent callers are safe. A second `update`/`delete`
/// for an id whose mutation is still outstanding is rejected instead of
/// racing the first one.
pub struct ListingStore {
    channel: Arc<dyn Channel>,
    session: Session,
    state: Mutex<StoreState>,
}

impl ListingStore {
    pub fn new(channel: Arc<dyn Channel>, session: Session) -> Self {
        Self {
            channel,
            session,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Current global feed snapshot.
    pub fn feed(&self) -> Vec<Listing> {
        self.state.lock().feed.clone()
    }

    /// Current snapshot of the user's own listings.
    pub fn mine(&self) -> Vec<Listing> {
        self.state.lock().mine.clone()
    }

    /// Upper bound for the price filter slider, recomputed on every feed load.
    pub fn price_ceiling(&self) -> f64 {
        self.state.lock().price_ceiling
    }

    /// Look up one of the user's own listings.
    pub fn find_mine(&self, id: &str) -> Option<Listing> {
        self.state.lock().mine.iter().find(|l| l.id == id).cloned()
    }

    /// Fetch the global feed, replacing the whole snapshot on success. A
    /// failed fetch leaves the previous snapshot untouched.
    pub async fn load_feed(&self) -> Result<(), StoreError> {
        let ack: CardsAck =
            protocol::call(self.channel.as_ref(), protocol::GET_ALL_CARDS, Value::Null).await?;
        let ceiling = filter::price_ceiling(&ack.cards);
        let mut state = self.state.lock();
        state.feed = ack.cards;
        state.price_ceiling = ceiling;
        log::debug!("feed reloaded: {} listings", state.feed.len());
        Ok(())
    }

    /// Fetch the user's own listings, replacing the "mine" snapshot.
    pub async fn load_mine(&self) -> Result<(), StoreError> {
        let payload = json!({"token": self.session.token()});
        let ack: CardsAck =
            protocol::call(self.channel.as_ref(), protocol::GET_USER_CARDS, payload).await?;
        self.state.lock().mine = ack.cards;
        Ok(())
    }

    /// Publish a new listing. The entry joins "mine" (prepended) only after
    /// the server confirms and returns the stored image path; a failure
    /// leaves the snapshot untouched.
    pub async fn create(&self, draft: ListingDraft) -> Result<Listing, StoreError> {
        let card = Listing {
            id: new_listing_id(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            phone: draft.phone,
            price: draft.price,
            persons: draft.persons,
            wifi: draft.wifi,
            image: ListingImage::Pending {
                content_type: draft.image.content_type,
                bytes: draft.image.bytes,
            },
            owner_username: None,
        };
        let payload = json!({"token": self.session.token(), "card": card});
        let ack: CreateAck =
            protocol::call(self.channel.as_ref(), protocol::CREATE_CARD, payload).await?;

        let confirmed = Listing {
            image: ListingImage::Path(ack.image_path),
            ..card
        };
        self.state.lock().mine.insert(0, confirmed.clone());
        Ok(confirmed)
    }

    /// Apply `patch` to one of the user's listings. When `new_image` is
    /// `None` the request omits the image payload and the stored reference is
    /// preserved unchanged; otherwise the acked server path is stored with a
    /// cache-busting suffix so stale client-side caches refetch it.
    pub async fn update(
        &self,
        id: &str,
        patch: ListingPatch,
        new_image: Option<ImageUpload>,
    ) -> Result<Listing, StoreError> {
        let existing = self.begin_mutation(id)?;
        let result = self.update_confirmed(&existing, patch, new_image).await;
        self.state.lock().in_flight.remove(id);
        result
    }

    async fn update_confirmed(
        &self,
        existing: &Listing,
        patch: ListingPatch,
        new_image: Option<ImageUpload>,
    ) -> Result<Listing, StoreError> {
        let card = Listing {
            id: existing.id.clone(),
            title: patch.title,
            description: patch.description,
            location: patch.location,
            phone: patch.phone,
            price: patch.price,
            persons: patch.persons,
            wifi: patch.wifi,
            image: existing.image.clone(),
            owner_username: None,
        };
        let replacement = new_image.as_ref().map(|upload| ImageReplacement {
            buffer: upload.bytes.clone(),
            extension: upload.extension().to_string(),
        });
        let payload = json!({
            "token": self.session.token(),
            "card": card,
            "image": replacement,
        });
        let ack: UpdateAck =
            protocol::call(self.channel.as_ref(), protocol::UPDATE_CARD, payload).await?;

        let image = if new_image.is_some() {
            ListingImage::Path(cache_busted(&ack.image_url))
        } else {
            existing.image.clone()
        };
        let updated = Listing { image, ..card };
        let mut state = self.state.lock();
        if let Some(slot) = state.mine.iter_mut().find(|l| l.id == existing.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Remove one of the user's listings. Unknown ids are rejected explicitly
    /// and the store is left untouched; removal happens only after the
    /// server's ack.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.begin_mutation(id)?;
        let payload = json!({"token": self.session.token(), "id": id});
        let result =
            protocol::call::<Value>(self.channel.as_ref(), protocol::DELETE_CARD, payload).await;

        let mut state = self.state.lock();
        state.in_flight.remove(id);
        match result {
            Ok(_) => {
                state.mine.retain(|l| l.id != id);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Check the target exists and claim the per-id single-flight slot.
    fn begin_mutation(&self, id: &str) -> Result<Listing, StoreError> {
        let mut state = self.state.lock();
        let Some(existing) = state.mine.iter().find(|l| l.id == id).cloned() else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        if !state.in_flight.insert(id.to_string()) {
            return Err(StoreError::MutationInFlight(id.to_string()));
        }
        Ok(existing)
    }
}

fn cache_busted(url: &str) -> String {
    format!("{url}?v={}", chrono::Utc::now().timestamp_millis())
}
