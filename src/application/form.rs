//! Create-or-edit form state machine: raw field strings, per-field validity,
//! image payload preparation and submit-readiness.

use crate::application::store::ListingStore;
use crate::domain::{
    FormError, Listing, ListingDraft, ListingId, ListingImage, ListingPatch,
    listing::ImageUpload,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Russian-style phone number: +7/8/7 prefix, then 10 digits with
    /// optional spaces, parentheses and dashes.
    static ref PHONE_RE: Regex =
        Regex::new(r"^(\+7|8|7)[\s(]*(?:\d{3})[\s)]*\s*\d{3}[\s-]?\d{2}[\s-]?\d{2}$")
            .expect("phone pattern is valid");
    static ref PRICE_RE: Regex =
        Regex::new(r"^(0|[1-9]\d*)(\.\d+)?$").expect("price pattern is valid");
    static ref PERSONS_RE: Regex = Regex::new(r"^\d+$").expect("persons pattern is valid");
}

/// Upload size cap, applied before any network contact.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for a brand-new listing image. Edit mode accepts
/// any declared `image/*` replacement.
const CREATE_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Whether the form creates a new listing or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ListingId),
}

/// What a successful submit did, so the orchestrator can react.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A new listing was published; the form has been reset to empty.
    Published(Listing),
    /// The edited listing was saved; the edit view should close.
    Saved(Listing),
}

/// Form state for one card. Field setters keep the raw strings the user
/// typed plus a validity flag per constrained field; readiness is recomputed
/// from scratch on every query, never cached.
#[derive(Debug, Clone)]
pub struct CardForm {
    mode: FormMode,
    title: String,
    description: String,
    location: String,
    price: String,
    phone: String,
    persons: String,
    wifi: bool,
    image: Option<ImageUpload>,
    /// Image inherited from the entry being edited; counts as present for
    /// readiness until a new file replaces it.
    existing_image: Option<ListingImage>,
    phone_valid: bool,
    price_valid: bool,
    persons_valid: bool,
}

impl CardForm {
    /// An empty create-mode form.
    pub fn new_create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            location: String::new(),
            price: String::new(),
            phone: String::new(),
            persons: String::new(),
            wifi: false,
            image: None,
            existing_image: None,
            phone_valid: true,
            price_valid: true,
            persons_valid: true,
        }
    }

    /// An edit-mode form pre-populated from an existing "mine" entry.
    pub fn new_edit(listing: &Listing) -> Self {
        Self {
            mode: FormMode::Edit(listing.id.clone()),
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: listing.location.clone(),
            price: format_price(listing.price),
            phone: listing.phone.clone(),
            persons: listing.persons.to_string(),
            wifi: listing.wifi,
            image: None,
            existing_image: Some(listing.image.clone()),
            phone_valid: true,
            price_valid: true,
            persons_valid: true,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Id of the listing being edited, if any.
    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.location = value.into();
    }

    pub fn set_wifi(&mut self, value: bool) {
        self.wifi = value;
    }

    /// Empty input is "not yet filled", never an error.
    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.phone = value.into();
        self.phone_valid = self.phone.is_empty() || PHONE_RE.is_match(&self.phone);
    }

    pub fn set_price(&mut self, value: impl Into<String>) {
        self.price = value.into();
        self.price_valid = self.price.is_empty()
            || (PRICE_RE.is_match(&self.price)
                && self.price.parse::<f64>().is_ok_and(|p| p > 0.0));
    }

    pub fn set_persons(&mut self, value: impl Into<String>) {
        self.persons = value.into();
        self.persons_valid = self.persons.is_empty()
            || (PERSONS_RE.is_match(&self.persons)
                && self.persons.parse::<u32>().is_ok_and(|n| n > 0));
    }

    /// Retain the raw bytes of a selected file together with its declared
    /// content type and file-name hint.
    pub fn select_image(&mut self, upload: ImageUpload) {
        self.image = Some(upload);
    }

    pub fn phone_valid(&self) -> bool {
        self.phone_valid
    }

    pub fn price_valid(&self) -> bool {
        self.price_valid
    }

    pub fn persons_valid(&self) -> bool {
        self.persons_valid
    }

    pub fn wifi(&self) -> bool {
        self.wifi
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether an image is available for submission: a fresh selection, or
    /// the inherited one in edit mode.
    pub fn has_image(&self) -> bool {
        self.image.is_some() || (matches!(self.mode, FormMode::Edit(_)) && self.existing_image.is_some())
    }

    /// Submit-readiness: image present, every field non-empty and every
    /// validity flag true, all at once.
    pub fn is_ready(&self) -> bool {
        self.has_image()
            && !self.title.is_empty()
            && !self.description.is_empty()
            && !self.location.is_empty()
            && !self.price.is_empty()
            && !self.phone.is_empty()
            && !self.persons.is_empty()
            && self.phone_valid
            && self.price_valid
            && self.persons_valid
    }

    /// Validate and send the form. Nothing touches the network when local
    /// validation fails; the field state is kept for correction either way.
    pub async fn submit(&mut self, store: &ListingStore) -> Result<SubmitOutcome, FormError> {
        if !self.is_ready() {
            return Err(FormError::NotReady);
        }
        self.check_image()?;

        match self.mode.clone() {
            FormMode::Create => {
                let image = self.image.clone().ok_or(FormError::MissingImage)?;
                let draft = ListingDraft {
                    title: self.title.clone(),
                    description: self.description.clone(),
                    location: self.location.clone(),
                    phone: self.phone.clone(),
                    price: self.parsed_price()?,
                    persons: self.parsed_persons()?,
                    wifi: self.wifi,
                    image,
                };
                let listing = store.create(draft).await.map_err(FormError::Store)?;
                self.reset();
                Ok(SubmitOutcome::Published(listing))
            }
            FormMode::Edit(id) => {
                let patch = ListingPatch {
                    title: self.title.clone(),
                    description: self.description.clone(),
                    location: self.location.clone(),
                    phone: self.phone.clone(),
                    price: self.parsed_price()?,
                    persons: self.parsed_persons()?,
                    wifi: self.wifi,
                };
                let listing = store
                    .update(&id, patch, self.image.clone())
                    .await
                    .map_err(FormError::Store)?;
                Ok(SubmitOutcome::Saved(listing))
            }
        }
    }

    /// Enforce the size cap and content-type policy on a selected file.
    fn check_image(&self) -> Result<(), FormError> {
        match self.mode {
            FormMode::Create => {
                let Some(image) = &self.image else {
                    return Err(FormError::MissingImage);
                };
                if image.bytes.len() > MAX_IMAGE_BYTES {
                    return Err(FormError::ImageTooLarge);
                }
                if !CREATE_IMAGE_TYPES.contains(&image.content_type.as_str()) {
                    return Err(FormError::UnsupportedImageType(image.content_type.clone()));
                }
            }
            FormMode::Edit(_) => {
                // Replacement is optional; the stored image stands otherwise.
                if let Some(image) = &self.image {
                    if !image.content_type.starts_with("image/") {
                        return Err(FormError::NotAnImage(image.content_type.clone()));
                    }
                    if image.bytes.len() > MAX_IMAGE_BYTES {
                        return Err(FormError::ImageTooLarge);
                    }
                }
            }
        }
        Ok(())
    }

    fn parsed_price(&self) -> Result<f64, FormError> {
        self.price.parse().map_err(|_| FormError::NotReady)
    }

    fn parsed_persons(&self) -> Result<u32, FormError> {
        self.persons.parse().map_err(|_| FormError::NotReady)
    }

    /// Clear every field back to the empty create state.
    fn reset(&mut self) {
        *self = CardForm::new_create();
    }
}

impl Default for CardForm {
    fn default() -> Self {
        Self::new_create()
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}
