use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::auth::{self, AuthError, IdentityProvider, IssuedSession, SessionClaims};
use super::domain::{
    Area, FurnishedStatus, Inquiry, InquiryId, InquiryStatus, Landlord, Listing, ListingId,
    ListingStatus, ParkingType, PetPolicy, User, UserId, Utilities,
};
use super::guard::{authorize, AccessDenied, Action, AuthorizedSubject};
use super::mutation::{approve_landlord_batch, create_listing_batch};
use super::query::{self, ListingQuery};
use super::store::{MarketplaceStore, StoreError};
use super::visibility;

/// Landlord application payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub profile_description: Option<String>,
    #[serde(default = "default_true")]
    pub show_contact_publicly: bool,
}

/// Listing creation payload. Everything but the descriptive core is
/// optional and falls back to the catalogue defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub monthly_rent: u32,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub bedrooms: u8,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(default)]
    pub square_footage: Option<u32>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub furnished: Option<FurnishedStatus>,
    #[serde(default, rename = "petsAllowed")]
    pub pets: Option<PetPolicy>,
    #[serde(default)]
    pub parking: Option<ParkingType>,
    #[serde(default)]
    pub utilities: Option<Utilities>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub primary_photo_index: usize,
    #[serde(default)]
    pub contact_form_enabled: Option<bool>,
    #[serde(default)]
    pub show_contact_info: Option<bool>,
}

/// Tenant inquiry payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

fn default_true() -> bool {
    true
}

/// Landlord block embedded in the public detail view. Contact fields are
/// present only when the landlord shares them publicly.
#[derive(Debug, Clone, Serialize)]
pub struct LandlordSummary {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,
    pub review_count: u32,
}

/// Public listing detail response.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub landlord: LandlordSummary,
}

/// Failure taxonomy surfaced to the HTTP layer. Collaborator errors are
/// converted at this boundary and never retried here.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("mutation failed: {0}")]
    MutationFailed(String),
}

impl From<StoreError> for MarketplaceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            StoreError::Conflict => Self::Conflict("document already exists".to_string()),
            StoreError::Unavailable(detail) => Self::Unavailable(detail),
            StoreError::MutationFailed(detail) => Self::MutationFailed(detail),
        }
    }
}

impl From<AuthError> for MarketplaceError {
    fn from(_: AuthError) -> Self {
        Self::Unauthenticated
    }
}

impl From<AccessDenied> for MarketplaceError {
    fn from(value: AccessDenied) -> Self {
        match value {
            AccessDenied::ApplicationExists => Self::Conflict(value.to_string()),
            AccessDenied::AdminRequired
            | AccessDenied::LandlordRequired
            | AccessDenied::NotApproved
            | AccessDenied::Suspended
            | AccessDenied::NotOwner => Self::Forbidden(value.to_string()),
        }
    }
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INQUIRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("lst-{id:06}"))
}

fn next_inquiry_id() -> InquiryId {
    let id = INQUIRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InquiryId(format!("inq-{id:06}"))
}

/// Service facade composing the store, identity provider, guard, query
/// engine, and mutation batches. Every operation that acts on behalf of a
/// caller takes already-verified [`SessionClaims`] as an argument.
pub struct MarketplaceService<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    session_ttl: Duration,
}

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    pub fn new(store: Arc<S>, provider: Arc<P>, session_ttl: Duration) -> Self {
        Self {
            store,
            provider,
            session_ttl,
        }
    }

    /// Exchange a proof-of-identity token for a session credential.
    pub fn create_session(&self, id_token: &str) -> Result<IssuedSession, MarketplaceError> {
        let issued = self.provider.create_session(id_token, self.session_ttl)?;
        Ok(issued)
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Verify an optional bearer credential to claims. Missing and invalid
    /// credentials fail identically.
    pub fn verify_session(
        &self,
        credential: Option<&str>,
    ) -> Result<SessionClaims, MarketplaceError> {
        Ok(auth::verify_bearer(self.provider.as_ref(), credential)?)
    }

    /// Introspect a session without failing: an unusable credential reads
    /// as "nobody signed in".
    pub fn current_session(&self, credential: Option<&str>) -> Option<SessionClaims> {
        auth::verify_bearer(self.provider.as_ref(), credential).ok()
    }

    fn subject(&self, claims: &SessionClaims) -> Result<AuthorizedSubject, MarketplaceError> {
        let user = self
            .store
            .fetch_user(&claims.subject)?
            .ok_or(MarketplaceError::NotFound)?;
        Ok(AuthorizedSubject {
            id: user.id,
            role: user.role,
        })
    }

    /// Submit a landlord application for the calling user.
    pub fn submit_application(
        &self,
        claims: &SessionClaims,
        form: ApplicationForm,
    ) -> Result<Landlord, MarketplaceError> {
        if form.contact_email.trim().is_empty() {
            return Err(MarketplaceError::Validation(
                "contact email is required".to_string(),
            ));
        }

        let subject = self.subject(claims)?;
        let existing = self.store.fetch_landlord(&subject.id)?;
        authorize(&subject, &Action::SubmitApplication, existing.as_ref())?;

        let now = Utc::now();
        let landlord = Landlord {
            id: subject.id,
            approved: false,
            approved_at: None,
            approved_by: None,
            suspended: false,
            suspended_at: None,
            suspended_by: None,
            application_date: now,
            profile_description: form.profile_description,
            contact_email: form.contact_email,
            contact_phone: form.contact_phone,
            show_contact_publicly: form.show_contact_publicly,
            total_listings: 0,
            active_listings: 0,
            average_rating: None,
            review_count: 0,
        };

        match self.store.insert_landlord(landlord.clone()) {
            Ok(()) => Ok(landlord),
            Err(StoreError::Conflict) => Err(MarketplaceError::Conflict(
                AccessDenied::ApplicationExists.to_string(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    /// Approve a pending application: approval flag and role promotion
    /// commit as one batch.
    pub fn approve_landlord(
        &self,
        claims: &SessionClaims,
        landlord_id: &UserId,
    ) -> Result<(), MarketplaceError> {
        let subject = self.subject(claims)?;
        authorize(&subject, &Action::AdminOnly, None)?;

        let landlord = self
            .store
            .fetch_landlord(landlord_id)?
            .ok_or(MarketplaceError::NotFound)?;
        if landlord.approved {
            return Err(MarketplaceError::Conflict(
                "application already approved".to_string(),
            ));
        }

        let batch = approve_landlord_batch(&landlord, &subject.id, Utc::now());
        self.store.apply_batch(batch)?;
        Ok(())
    }

    /// Reject (delete) a pending application.
    pub fn reject_landlord(
        &self,
        claims: &SessionClaims,
        landlord_id: &UserId,
    ) -> Result<(), MarketplaceError> {
        let subject = self.subject(claims)?;
        authorize(&subject, &Action::AdminOnly, None)?;

        let landlord = self
            .store
            .fetch_landlord(landlord_id)?
            .ok_or(MarketplaceError::NotFound)?;
        if landlord.approved {
            return Err(MarketplaceError::Conflict(
                "cannot reject an approved application".to_string(),
            ));
        }

        self.store.delete_landlord(landlord_id)?;
        Ok(())
    }

    /// Suspend or reinstate an approved landlord. Listings are untouched;
    /// the visibility filter hides them from public reads while the flag
    /// is set.
    pub fn set_landlord_suspension(
        &self,
        claims: &SessionClaims,
        landlord_id: &UserId,
        suspend: bool,
    ) -> Result<(), MarketplaceError> {
        let subject = self.subject(claims)?;
        authorize(&subject, &Action::AdminOnly, None)?;

        let landlord = self
            .store
            .fetch_landlord(landlord_id)?
            .ok_or(MarketplaceError::NotFound)?;
        if !landlord.approved {
            return Err(MarketplaceError::Conflict(
                "cannot suspend an unapproved landlord".to_string(),
            ));
        }

        let now = Utc::now();
        let updated = Landlord {
            suspended: suspend,
            suspended_at: suspend.then_some(now),
            suspended_by: suspend.then(|| subject.id.clone()),
            ..landlord
        };
        self.store.update_landlord(updated)?;
        Ok(())
    }

    /// Create a listing under the caller's landlord record. The insert and
    /// the landlord counter write commit as one batch.
    pub fn create_listing(
        &self,
        claims: &SessionClaims,
        form: ListingForm,
    ) -> Result<Listing, MarketplaceError> {
        let subject = self.subject(claims)?;
        let landlord = self.store.fetch_landlord(&subject.id)?;
        authorize(&subject, &Action::CreateListing, landlord.as_ref())?;
        let Some(landlord) = landlord else {
            return Err(AccessDenied::LandlordRequired.into());
        };

        if form.title.trim().is_empty()
            || form.description.trim().is_empty()
            || form.address.trim().is_empty()
            || form.monthly_rent == 0
        {
            return Err(MarketplaceError::Validation(
                "missing required fields".to_string(),
            ));
        }
        let Some(area) = form.area else {
            return Err(MarketplaceError::Validation(
                "missing required fields".to_string(),
            ));
        };

        let now = Utc::now();
        let listing = Listing {
            id: next_listing_id(),
            landlord_id: landlord.id.clone(),
            title: form.title,
            description: form.description,
            monthly_rent: form.monthly_rent,
            area,
            address: form.address,
            bedrooms: form.bedrooms,
            bathrooms: form.bathrooms.unwrap_or(1.0),
            square_footage: form.square_footage,
            status: form.status.unwrap_or(ListingStatus::Available),
            furnished: form.furnished.unwrap_or(FurnishedStatus::No),
            pets: form.pets.unwrap_or(PetPolicy::No),
            parking: form.parking.unwrap_or(ParkingType::Street),
            utilities: form.utilities.unwrap_or_default(),
            photos: form.photos,
            primary_photo_index: form.primary_photo_index,
            contact_form_enabled: form.contact_form_enabled.unwrap_or(true),
            show_contact_info: form.show_contact_info.unwrap_or(true),
            featured: false,
            view_count: 0,
            inquiry_count: 0,
            created_at: now,
            updated_at: now,
        };

        let batch = create_listing_batch(listing.clone(), &landlord);
        self.store.apply_batch(batch)?;
        Ok(listing)
    }

    /// Public search; suspended landlords' listings never appear.
    pub fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, MarketplaceError> {
        Ok(query::execute(self.store.as_ref(), query)?)
    }

    /// Public detail view. Listings of suspended landlords read as absent.
    /// The view counter bumps best-effort; a failed bump never fails the
    /// read.
    pub fn listing_detail(&self, id: &ListingId) -> Result<ListingDetail, MarketplaceError> {
        let listing = self
            .store
            .fetch_listing(id)?
            .ok_or(MarketplaceError::NotFound)?;

        let landlord = self.store.fetch_landlord(&listing.landlord_id)?;
        if let Some(record) = landlord.as_ref() {
            if !visibility::is_public(record) {
                return Err(MarketplaceError::NotFound);
            }
        }

        let owner = self.store.fetch_user(&listing.landlord_id)?;
        let summary = landlord_summary(landlord.as_ref(), owner.as_ref());

        if let Err(error) = self
            .store
            .set_listing_view_count(&listing.id, listing.view_count + 1)
        {
            tracing::debug!(%error, listing = %listing.id.0, "view count update failed");
        }

        Ok(ListingDetail {
            listing,
            landlord: summary,
        })
    }

    /// Admin-scoped listing of record for one landlord: raw statuses, no
    /// suspension filtering.
    pub fn listings_of_record(
        &self,
        claims: &SessionClaims,
        landlord_id: &UserId,
    ) -> Result<Vec<Listing>, MarketplaceError> {
        let subject = self.subject(claims)?;
        authorize(&subject, &Action::AdminOnly, None)?;

        self.store
            .fetch_landlord(landlord_id)?
            .ok_or(MarketplaceError::NotFound)?;
        Ok(self.store.listings_by_landlord(landlord_id)?)
    }

    /// Submit a tenant inquiry, anonymously or signed in. Disabled contact
    /// forms reject before anything is written.
    pub fn submit_inquiry(
        &self,
        claims: Option<&SessionClaims>,
        listing_id: &ListingId,
        form: InquiryForm,
    ) -> Result<Inquiry, MarketplaceError> {
        if form.name.trim().is_empty()
            || form.email.trim().is_empty()
            || form.message.trim().is_empty()
        {
            return Err(MarketplaceError::Validation(
                "name, email, and message are required".to_string(),
            ));
        }

        let listing = self
            .store
            .fetch_listing(listing_id)?
            .ok_or(MarketplaceError::NotFound)?;

        if !listing.contact_form_enabled {
            return Err(MarketplaceError::Forbidden(
                "contact form is disabled for this listing".to_string(),
            ));
        }

        if let Some(landlord) = self.store.fetch_landlord(&listing.landlord_id)? {
            if !visibility::is_public(&landlord) {
                return Err(MarketplaceError::NotFound);
            }
        }

        let now = Utc::now();
        let inquiry = Inquiry {
            id: next_inquiry_id(),
            listing_id: listing.id.clone(),
            landlord_id: listing.landlord_id.clone(),
            user_id: claims.map(|c| c.subject.clone()),
            name: form.name,
            email: form.email,
            phone: form.phone,
            message: form.message,
            status: InquiryStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_inquiry(inquiry.clone())?;
        self.store.increment_listing_inquiries(&listing.id)?;
        Ok(inquiry)
    }

    /// Advance an inquiry through its forward-only lifecycle. Only the
    /// receiving landlord (or an admin) may move it, and no reverse
    /// transition exists.
    pub fn update_inquiry_status(
        &self,
        claims: &SessionClaims,
        inquiry_id: &InquiryId,
        status: InquiryStatus,
    ) -> Result<Inquiry, MarketplaceError> {
        let subject = self.subject(claims)?;
        let inquiry = self
            .store
            .fetch_inquiry(inquiry_id)?
            .ok_or(MarketplaceError::NotFound)?;
        authorize(
            &subject,
            &Action::ModerateOwnListing {
                landlord_id: &inquiry.landlord_id,
            },
            None,
        )?;

        if !inquiry.status.can_advance_to(status) {
            return Err(MarketplaceError::Conflict(format!(
                "inquiry cannot move from {} to {}",
                inquiry.status.label(),
                status.label()
            )));
        }

        let updated = Inquiry {
            status,
            updated_at: Utc::now(),
            ..inquiry
        };
        self.store.update_inquiry(updated.clone())?;
        Ok(updated)
    }
}

fn landlord_summary(landlord: Option<&Landlord>, owner: Option<&User>) -> LandlordSummary {
    let display_name = owner
        .map(|user| user.display_name.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    match landlord {
        Some(record) => {
            let share = record.show_contact_publicly;
            LandlordSummary {
                display_name,
                profile_description: record.profile_description.clone(),
                contact_email: share.then(|| record.contact_email.clone()),
                contact_phone: record.contact_phone.clone().filter(|_| share),
                average_rating: record.average_rating,
                review_count: record.review_count,
            }
        }
        None => LandlordSummary {
            display_name,
            profile_description: None,
            contact_email: None,
            contact_phone: None,
            average_rating: None,
            review_count: 0,
        },
    }
}
