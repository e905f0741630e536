//! Marketplace core: session verification, authorization, suspension-aware
//! visibility, the listing query pipeline, and atomic mutation batches.
//!
//! Handlers never reach for ambient state: a request's credential is
//! verified once at the edge and the resulting claims are passed down into
//! every operation that needs them.

pub mod auth;
pub mod domain;
pub mod guard;
pub mod mutation;
pub mod query;
pub mod router;
pub mod service;
pub mod store;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, IdentityProvider, IssuedSession, SessionClaims, SESSION_COOKIE};
pub use domain::{
    Area, FurnishedStatus, Inquiry, InquiryId, InquiryStatus, Landlord, Listing, ListingId,
    ListingStatus, NotificationFrequency, ParkingType, PetPolicy, Role, User, UserId, Utilities,
    UtilityIncluded,
};
pub use guard::{authorize, AccessDenied, Action, AuthorizedSubject};
pub use query::{ListingQuery, StatusFilter};
pub use router::marketplace_router;
pub use service::{
    ApplicationForm, InquiryForm, LandlordSummary, ListingDetail, ListingForm, MarketplaceError,
    MarketplaceService,
};
pub use store::{BatchOp, ListingPredicate, MarketplaceStore, StoreError};
