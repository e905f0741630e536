use std::collections::HashSet;

use super::domain::{Area, Listing, ListingStatus, UserId};
use super::store::{ListingPredicate, MarketplaceStore, StoreError};

/// Status constraint for a search. Defaults to available-only; `Any`
/// corresponds to the `status=all` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Only(ListingStatus),
}

impl StatusFilter {
    fn as_equality(self) -> Option<ListingStatus> {
        match self {
            StatusFilter::Any => None,
            StatusFilter::Only(status) => Some(status),
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(ListingStatus::Available)
    }
}

/// Public search parameters. Absent fields impose no constraint; price and
/// bedroom bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub status: StatusFilter,
    pub area: Option<Area>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub min_bedrooms: Option<u8>,
}

/// Run a public search: push the equality predicates to the store, then
/// make one in-order pass over the result applying the remaining filters.
/// The suspended-landlord set is refetched per query so a suspension takes
/// effect on the very next search.
pub fn execute<S: MarketplaceStore + ?Sized>(
    store: &S,
    query: &ListingQuery,
) -> Result<Vec<Listing>, StoreError> {
    let suspended = store.suspended_landlords()?;

    let predicate = ListingPredicate {
        status: query.status.as_equality(),
        area: query.area,
    };
    let rows = store.query_listings(&predicate)?;

    // Single left-to-right pass; the store's created-at-descending order
    // carries through untouched.
    Ok(rows
        .into_iter()
        .filter(|listing| retain(listing, query, &suspended))
        .collect())
}

fn retain(listing: &Listing, query: &ListingQuery, suspended: &HashSet<UserId>) -> bool {
    if suspended.contains(&listing.landlord_id) {
        return false;
    }
    if let Some(min) = query.min_price {
        if listing.monthly_rent < min {
            return false;
        }
    }
    if let Some(max) = query.max_price {
        if listing.monthly_rent > max {
            return false;
        }
    }
    if let Some(min) = query.min_bedrooms {
        if listing.bedrooms < min {
            return false;
        }
    }
    true
}
