use serde::{Deserialize, Serialize};

/// Unique identifier for a listing, generated client-side at creation time
/// and never reused.
pub type ListingId = String;

/// Mint a fresh listing id.
pub fn new_listing_id() -> ListingId {
    uuid::Uuid::new_v4().to_string()
}

/// Image attached to a listing.
///
/// The serialized form matches the wire protocol: a bare string for a
/// server-hosted path, or a `{type, data}` object for a binary payload that
/// has not been confirmed by the server yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListingImage {
    /// Opaque relative path to server-hosted image content.
    Path(String),
    /// In-flight binary payload awaiting server confirmation.
    Pending {
        #[serde(rename = "type")]
        content_type: String,
        #[serde(rename = "data")]
        bytes: Vec<u8>,
    },
}

impl ListingImage {
    /// Server-hosted path, if this image has been confirmed.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            ListingImage::Path(path) => Some(path),
            ListingImage::Pending { .. } => None,
        }
    }
}

/// A rental unit advertisement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    /// Unique identifier for the listing.
    pub id: ListingId,
    /// Headline shown in the feed; searched by the filter engine.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Free-text location.
    pub location: String,
    /// Contact phone number.
    pub phone: String,
    /// Price per night; finite and positive once persisted.
    pub price: f64,
    /// Sleeping capacity.
    pub persons: u32,
    /// Wi-Fi amenity flag.
    pub wifi: bool,
    /// Attached image; a server path once the listing is confirmed.
    pub image: ListingImage,
    /// Present only on feed entries owned by other users.
    #[serde(
        default,
        rename = "username",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_username: Option<String>,
}

/// A file selected for upload, held in memory until the server confirms it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Declared MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Original file name; only its extension matters to the server.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File-extension hint the server uses when storing a replacement image.
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }
}

/// Validated field bundle for a create submission. The image payload is
/// mandatory here; a listing is never created without one.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub phone: String,
    pub price: f64,
    pub persons: u32,
    pub wifi: bool,
    pub image: ImageUpload,
}

/// Field bundle for an edit submission. The image is carried separately so
/// an unchanged image can be omitted from the request entirely.
#[derive(Debug, Clone)]
pub struct ListingPatch {
    pub title: String,
    pub description: String,
    pub location: String,
    pub phone: String,
    pub price: f64,
    pub persons: u32,
    pub wifi: bool,
}
