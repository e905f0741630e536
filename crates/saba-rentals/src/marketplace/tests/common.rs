use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::auth::{AuthError, IdentityProvider, IssuedSession, SessionClaims};
use crate::marketplace::domain::{
    Area, FurnishedStatus, Inquiry, InquiryId, Landlord, Listing, ListingId, ListingStatus,
    NotificationFrequency, ParkingType, PetPolicy, Role, User, UserId, Utilities,
};
use crate::marketplace::service::MarketplaceService;
use crate::marketplace::store::{
    BatchOp, ListingPredicate, MarketplaceStore, StoreError,
};

/// Fixed reference instant so fixtures get deterministic, ordered
/// creation times.
pub(super) fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).single().expect("valid instant")
        + Duration::minutes(minutes)
}

pub(super) fn user(id: &str, role: Role) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        display_name: format!("User {id}"),
        role,
        verified_tenant: false,
        email_notifications: true,
        notification_frequency: NotificationFrequency::Instant,
        saved_listings: Vec::new(),
        created_at: at(0),
        updated_at: at(0),
    }
}

pub(super) fn landlord_record(id: &str, approved: bool, suspended: bool) -> Landlord {
    Landlord {
        id: UserId(id.to_string()),
        approved,
        approved_at: approved.then(|| at(1)),
        approved_by: approved.then(|| UserId("admin-1".to_string())),
        suspended,
        suspended_at: suspended.then(|| at(2)),
        suspended_by: suspended.then(|| UserId("admin-1".to_string())),
        application_date: at(0),
        profile_description: Some("Long-time island resident".to_string()),
        contact_email: format!("{id}@example.com"),
        contact_phone: Some("+599 416 5678".to_string()),
        show_contact_publicly: true,
        total_listings: 0,
        active_listings: 0,
        average_rating: None,
        review_count: 0,
    }
}

pub(super) fn listing(
    id: &str,
    landlord: &str,
    area: Area,
    rent: u32,
    bedrooms: u8,
    created_minutes: i64,
) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        landlord_id: UserId(landlord.to_string()),
        title: format!("Listing {id}"),
        description: "Cozy cottage with ocean views".to_string(),
        monthly_rent: rent,
        area,
        address: "Booby Hill Road 12".to_string(),
        bedrooms,
        bathrooms: 1.0,
        square_footage: None,
        status: ListingStatus::Available,
        furnished: FurnishedStatus::No,
        pets: PetPolicy::No,
        parking: ParkingType::Street,
        utilities: Utilities::default(),
        photos: Vec::new(),
        primary_photo_index: 0,
        contact_form_enabled: true,
        show_contact_info: true,
        featured: false,
        view_count: 0,
        inquiry_count: 0,
        created_at: at(created_minutes),
        updated_at: at(created_minutes),
    }
}

pub(super) fn claims(id: &str) -> SessionClaims {
    SessionClaims {
        subject: UserId(id.to_string()),
        email: format!("{id}@example.com"),
    }
}

/// Sign a user in without going through the identity provider: insert the
/// user document and hand back ready-made claims.
pub(super) fn signed_in(store: &MemoryStore, id: &str, role: Role) -> SessionClaims {
    store.insert_user(user(id, role)).expect("user inserts");
    claims(id)
}

pub(super) fn build_service() -> (
    MarketplaceService<MemoryStore, MemoryProvider>,
    Arc<MemoryStore>,
    Arc<MemoryProvider>,
) {
    let store = Arc::new(MemoryStore::default());
    let provider = Arc::new(MemoryProvider::default());
    let service = MarketplaceService::new(store.clone(), provider.clone(), Duration::days(5));
    (service, store, provider)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    landlords: Arc<Mutex<HashMap<UserId, Landlord>>>,
    listings: Arc<Mutex<HashMap<ListingId, Listing>>>,
    inquiries: Arc<Mutex<HashMap<InquiryId, Inquiry>>>,
}

impl MemoryStore {
    pub(super) fn put_listing(&self, listing: Listing) {
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .insert(listing.id.clone(), listing);
    }

    pub(super) fn landlord(&self, id: &UserId) -> Option<Landlord> {
        self.landlords
            .lock()
            .expect("landlord mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn user(&self, id: &UserId) -> Option<User> {
        self.users
            .lock()
            .expect("user mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn listing(&self, id: &ListingId) -> Option<Listing> {
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn inquiries(&self) -> Vec<Inquiry> {
        self.inquiries
            .lock()
            .expect("inquiry mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl MarketplaceStore for MemoryStore {
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut guard = self.users.lock().expect("user mutex poisoned");
        if guard.contains_key(&user.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let guard = self.users.lock().expect("user mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_landlord(&self, landlord: Landlord) -> Result<(), StoreError> {
        let mut guard = self.landlords.lock().expect("landlord mutex poisoned");
        if guard.contains_key(&landlord.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(landlord.id.clone(), landlord);
        Ok(())
    }

    fn fetch_landlord(&self, id: &UserId) -> Result<Option<Landlord>, StoreError> {
        let guard = self.landlords.lock().expect("landlord mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_landlord(&self, landlord: Landlord) -> Result<(), StoreError> {
        let mut guard = self.landlords.lock().expect("landlord mutex poisoned");
        if !guard.contains_key(&landlord.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(landlord.id.clone(), landlord);
        Ok(())
    }

    fn delete_landlord(&self, id: &UserId) -> Result<(), StoreError> {
        let mut guard = self.landlords.lock().expect("landlord mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn suspended_landlords(&self) -> Result<HashSet<UserId>, StoreError> {
        let guard = self.landlords.lock().expect("landlord mutex poisoned");
        Ok(guard
            .values()
            .filter(|landlord| landlord.suspended)
            .map(|landlord| landlord.id.clone())
            .collect())
    }

    fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn query_listings(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, StoreError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        let mut rows: Vec<Listing> = guard
            .values()
            .filter(|listing| {
                predicate
                    .status
                    .map_or(true, |status| listing.status == status)
                    && predicate.area.map_or(true, |area| listing.area == area)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(rows)
    }

    fn listings_by_landlord(&self, landlord: &UserId) -> Result<Vec<Listing>, StoreError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        let mut rows: Vec<Listing> = guard
            .values()
            .filter(|listing| listing.landlord_id == *landlord)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn set_listing_view_count(&self, id: &ListingId, view_count: u64) -> Result<(), StoreError> {
        let mut guard = self.listings.lock().expect("listing mutex poisoned");
        let listing = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        listing.view_count = view_count;
        Ok(())
    }

    fn increment_listing_inquiries(&self, id: &ListingId) -> Result<(), StoreError> {
        let mut guard = self.listings.lock().expect("listing mutex poisoned");
        let listing = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        listing.inquiry_count += 1;
        Ok(())
    }

    fn insert_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError> {
        let mut guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        if guard.contains_key(&inquiry.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(inquiry.id.clone(), inquiry);
        Ok(())
    }

    fn fetch_inquiry(&self, id: &InquiryId) -> Result<Option<Inquiry>, StoreError> {
        let guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError> {
        let mut guard = self.inquiries.lock().expect("inquiry mutex poisoned");
        if !guard.contains_key(&inquiry.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(inquiry.id.clone(), inquiry);
        Ok(())
    }

    fn apply_batch(&self, batch: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut users = self.users.lock().expect("user mutex poisoned");
        let mut landlords = self.landlords.lock().expect("landlord mutex poisoned");
        let mut listings = self.listings.lock().expect("listing mutex poisoned");

        // Validate every target before touching anything so a failing op
        // aborts the whole batch.
        for op in &batch {
            match op {
                BatchOp::InsertListing(listing) => {
                    if listings.contains_key(&listing.id) {
                        return Err(StoreError::MutationFailed(format!(
                            "listing {} already exists",
                            listing.id.0
                        )));
                    }
                }
                BatchOp::SetLandlordApproval { landlord, .. }
                | BatchOp::SetLandlordCounters { landlord, .. } => {
                    if !landlords.contains_key(landlord) {
                        return Err(StoreError::MutationFailed(format!(
                            "landlord {} missing",
                            landlord.0
                        )));
                    }
                }
                BatchOp::SetUserRole { user, .. } => {
                    if !users.contains_key(user) {
                        return Err(StoreError::MutationFailed(format!(
                            "user {} missing",
                            user.0
                        )));
                    }
                }
            }
        }

        for op in batch {
            match op {
                BatchOp::InsertListing(listing) => {
                    listings.insert(listing.id.clone(), listing);
                }
                BatchOp::SetLandlordApproval {
                    landlord,
                    approved_by,
                    approved_at,
                } => {
                    if let Some(record) = landlords.get_mut(&landlord) {
                        record.approved = true;
                        record.approved_at = Some(approved_at);
                        record.approved_by = Some(approved_by);
                    }
                }
                BatchOp::SetUserRole {
                    user,
                    role,
                    updated_at,
                } => {
                    if let Some(record) = users.get_mut(&user) {
                        record.role = role;
                        record.updated_at = updated_at;
                    }
                }
                BatchOp::SetLandlordCounters {
                    landlord,
                    total_listings,
                    active_listings,
                } => {
                    if let Some(record) = landlords.get_mut(&landlord) {
                        record.total_listings = total_listings;
                        record.active_listings = active_listings;
                    }
                }
            }
        }
        Ok(())
    }
}

struct SessionRecord {
    claims: SessionClaims,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

#[derive(Default)]
pub(super) struct MemoryProvider {
    identities: Mutex<HashMap<String, SessionClaims>>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    sequence: AtomicU64,
}

impl MemoryProvider {
    pub(super) fn register_identity(&self, id_token: &str, user: &UserId, email: &str) {
        self.identities
            .lock()
            .expect("identity mutex poisoned")
            .insert(
                id_token.to_string(),
                SessionClaims {
                    subject: user.clone(),
                    email: email.to_string(),
                },
            );
    }

    pub(super) fn revoke(&self, credential: &str) {
        if let Some(record) = self
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .get_mut(credential)
        {
            record.revoked = true;
        }
    }
}

impl IdentityProvider for MemoryProvider {
    fn create_session(&self, id_token: &str, ttl: Duration) -> Result<IssuedSession, AuthError> {
        let claims = self
            .identities
            .lock()
            .expect("identity mutex poisoned")
            .get(id_token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)?;

        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let credential = format!("sess-{id:06}");
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(
                credential.clone(),
                SessionRecord {
                    claims: claims.clone(),
                    expires_at: Utc::now() + ttl,
                    revoked: false,
                },
            );
        Ok(IssuedSession { credential, claims })
    }

    fn verify_session(&self, credential: &str) -> Result<SessionClaims, AuthError> {
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        let record = sessions.get(credential).ok_or(AuthError::Unauthenticated)?;
        if record.revoked || record.expires_at <= Utc::now() {
            return Err(AuthError::Unauthenticated);
        }
        Ok(record.claims.clone())
    }
}

/// Store double that reports the backend as offline for every call.
pub(super) struct UnavailableStore;

impl MarketplaceStore for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_user(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_landlord(&self, _landlord: Landlord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_landlord(&self, _id: &UserId) -> Result<Option<Landlord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_landlord(&self, _landlord: Landlord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete_landlord(&self, _id: &UserId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn suspended_landlords(&self) -> Result<HashSet<UserId>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_listing(&self, _id: &ListingId) -> Result<Option<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn query_listings(&self, _predicate: &ListingPredicate) -> Result<Vec<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn listings_by_landlord(&self, _landlord: &UserId) -> Result<Vec<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn set_listing_view_count(&self, _id: &ListingId, _view_count: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn increment_listing_inquiries(&self, _id: &ListingId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_inquiry(&self, _inquiry: Inquiry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_inquiry(&self, _id: &InquiryId) -> Result<Option<Inquiry>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_inquiry(&self, _inquiry: Inquiry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn apply_batch(&self, _batch: Vec<BatchOp>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
