//! Domain types for the Stayboard core.
//! Defines the listing data model, the filter/sort derivation and the error
//! taxonomy shared by the application layer.

pub mod error;
pub mod filter;
pub mod listing;

pub use error::*;
pub use filter::*;
pub use listing::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sort_order_display_parse() {
        assert_eq!(SortOrder::PriceAscending.to_string(), "asc");
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::PriceDescending);
        assert_eq!(SortOrder::from_str("").unwrap(), SortOrder::None);
        assert!(SortOrder::from_str("invalid").is_err());
    }

    #[test]
    fn test_new_listing_ids_are_unique() {
        assert_ne!(new_listing_id(), new_listing_id());
    }
}
