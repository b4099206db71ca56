//! Domain error types for the Stayboard core.
//!
//! These errors represent failures of listing operations and form
//! submissions. Local validation failures never reach the network; request
//! failures carry the server-supplied message and are terminal for that
//! attempt, so retrying takes a new user action.

use crate::domain::ListingId;
use crate::infra::channel::ChannelError;
use thiserror::Error;

/// Errors surfaced by the listing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    #[error("Another change to listing {0} is still awaiting the server")]
    MutationInFlight(ListingId),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Channel(ChannelError),
}

impl From<ChannelError> for StoreError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Rejected(message) => StoreError::Rejected(message),
            other => StoreError::Channel(other),
        }
    }
}

/// Errors surfaced by the card form, next to the offending field.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Select an image first")]
    MissingImage,

    #[error("Image is too large (10 MiB maximum)")]
    ImageTooLarge,

    #[error("Unsupported image format {0}; use JPEG, PNG or WEBP")]
    UnsupportedImageType(String),

    #[error("Selected file is not an image ({0})")]
    NotAnImage(String),

    #[error("Form has empty or invalid fields")]
    NotReady,

    #[error(transparent)]
    Store(#[from] StoreError),
}
