use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::domain::{
    Area, Inquiry, InquiryId, Landlord, Listing, ListingId, ListingStatus, Role, User, UserId,
};

/// Equality predicates pushed down to the document store. Implementations
/// must return matches ordered by creation time, newest first; everything
/// else (price, bedrooms, suspension) is filtered in memory by the query
/// engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingPredicate {
    pub status: Option<ListingStatus>,
    pub area: Option<Area>,
}

/// One write inside an atomic batch. A batch commits as a unit or not at
/// all; implementations must not leave partial effects behind.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    InsertListing(Listing),
    SetLandlordApproval {
        landlord: UserId,
        approved_by: UserId,
        approved_at: DateTime<Utc>,
    },
    SetUserRole {
        user: UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    },
    /// Absolute counter values computed by the caller from a previously
    /// read landlord snapshot, not a store-side increment.
    SetLandlordCounters {
        landlord: UserId,
        total_listings: u32,
        active_listings: u32,
    },
}

/// Storage abstraction over the external document store so the service and
/// query modules can be exercised against in-memory implementations.
pub trait MarketplaceStore: Send + Sync {
    fn insert_user(&self, user: User) -> Result<(), StoreError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    fn insert_landlord(&self, landlord: Landlord) -> Result<(), StoreError>;
    fn fetch_landlord(&self, id: &UserId) -> Result<Option<Landlord>, StoreError>;
    fn update_landlord(&self, landlord: Landlord) -> Result<(), StoreError>;
    fn delete_landlord(&self, id: &UserId) -> Result<(), StoreError>;
    /// Ids of every currently-suspended landlord. Recomputed on each call;
    /// callers must not cache the result across requests.
    fn suspended_landlords(&self) -> Result<HashSet<UserId>, StoreError>;

    fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;
    fn query_listings(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, StoreError>;
    fn listings_by_landlord(&self, landlord: &UserId) -> Result<Vec<Listing>, StoreError>;
    fn set_listing_view_count(&self, id: &ListingId, view_count: u64) -> Result<(), StoreError>;
    /// Store-native atomic increment of the inquiry counter.
    fn increment_listing_inquiries(&self, id: &ListingId) -> Result<(), StoreError>;

    fn insert_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError>;
    fn fetch_inquiry(&self, id: &InquiryId) -> Result<Option<Inquiry>, StoreError>;
    fn update_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError>;

    /// Commit every op or none. Targets missing at commit time must abort
    /// the whole batch with [`StoreError::MutationFailed`].
    fn apply_batch(&self, batch: Vec<BatchOp>) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document already exists")]
    Conflict,
    #[error("document not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("atomic batch aborted: {0}")]
    MutationFailed(String),
}
