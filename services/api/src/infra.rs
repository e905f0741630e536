use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use saba_rentals::marketplace::{
    AuthError, BatchOp, IdentityProvider, Inquiry, InquiryId, IssuedSession, Landlord, Listing,
    ListingId, ListingPredicate, MarketplaceStore, SessionClaims, StoreError, User, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mutex-map store standing in for the managed document database. Batches
/// validate every target before applying so a failing op aborts the whole
/// write, matching the transactional contract of the real backend.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMarketplaceStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    landlords: Arc<Mutex<HashMap<UserId, Landlord>>>,
    listings: Arc<Mutex<HashMap<ListingId, Listing>>>,
    inquiries: Arc<Mutex<HashMap<InquiryId, Inquiry>>>,
}

impl MarketplaceStore for InMemoryMarketplaceStore {
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

/// Identity provider double: proof-of-identity tokens are registered up
/// front (seed data or tests) and exchanged for revocable, expiring
/// session credentials.
#[derive(Default)]
pub(crate) struct InMemoryIdentityProvider {
    identities: Mutex<HashMap<String, SessionClaims>>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    sequence: AtomicU64,
}

impl InMemoryIdentityProvider {
    pub(crate) fn register_identity(&self, id_token: &str, user: &UserId, email: &str) {
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
}

impl IdentityProvider for InMemoryIdentityProvider {
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
