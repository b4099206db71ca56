//! Pure derivation of the visible feed from independent filter criteria.

use super::Listing;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the visible feed is ordered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Preserve feed order.
    #[default]
    None,
    /// Cheapest first.
    PriceAscending,
    /// Most expensive first.
    PriceDescending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::None => "",
            SortOrder::PriceAscending => "asc",
            SortOrder::PriceDescending => "desc",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(SortOrder::None),
            "asc" => Ok(SortOrder::PriceAscending),
            "desc" => Ok(SortOrder::PriceDescending),
            other => Err(format!("Unknown sort order: {other}")),
        }
    }
}

/// Ephemeral filter state held by the view layer; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against listing titles.
    pub query: String,
    /// Inclusive lower bound on price.
    pub price_min: f64,
    /// Inclusive upper bound on price.
    pub price_max: f64,
    /// Minimum sleeping capacity; `None` means no constraint.
    pub min_persons: Option<u32>,
    /// Ordering of the surviving subset.
    pub sort: SortOrder,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            query: String::new(),
            price_min: 0.0,
            price_max: f64::INFINITY,
            min_persons: None,
            sort: SortOrder::None,
        }
    }
}

/// Derive the ordered visible subset of `feed` under `criteria`.
///
/// Pure and side-effect free; invoked on every render of criteria or feed, so
/// it must stay cheap and never cache. Sorting is stable: ties keep their
/// relative feed order.
pub fn visible<'a>(feed: &'a [Listing], criteria: &FilterCriteria) -> Vec<&'a Listing> {
    let query = criteria.query.to_lowercase();
    let mut matched: Vec<&Listing> = feed
        .iter()
        .filter(|listing| listing.title.to_lowercase().contains(&query))
        .filter(|listing| {
            listing.price >= criteria.price_min && listing.price <= criteria.price_max
        })
        .filter(|listing| {
            criteria
                .min_persons
                .is_none_or(|min| listing.persons >= min)
        })
        .collect();

    match criteria.sort {
        SortOrder::None => {}
        SortOrder::PriceAscending => matched.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceDescending => matched.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    matched
}

/// Smallest round-hundred value covering the highest price in the feed, used
/// as the price slider's upper bound. An empty feed yields 0.
pub fn price_ceiling(feed: &[Listing]) -> f64 {
    let max = feed.iter().map(|listing| listing.price).fold(0.0, f64::max);
    (max / 100.0).ceil() * 100.0
}
