use chrono::{DateTime, Utc};

use super::domain::{Landlord, Listing, ListingStatus, Role, UserId};
use super::store::BatchOp;

/// Batch for approving a landlord application: flip the approval flag and
/// promote the owning user's role, both or neither.
pub fn approve_landlord_batch(
    landlord: &Landlord,
    approver: &UserId,
    now: DateTime<Utc>,
) -> Vec<BatchOp> {
    vec![
        BatchOp::SetLandlordApproval {
            landlord: landlord.id.clone(),
            approved_by: approver.clone(),
            approved_at: now,
        },
        BatchOp::SetUserRole {
            user: landlord.id.clone(),
            role: Role::Landlord,
            updated_at: now,
        },
    ]
}

/// Batch for creating a listing: insert the document and write the owning
/// landlord's counters. The counter values come from the snapshot read
/// during authorization, so two concurrent creates for the same landlord
/// can write the same total and lose an increment.
pub fn create_listing_batch(listing: Listing, landlord_snapshot: &Landlord) -> Vec<BatchOp> {
    let active_delta = u32::from(listing.status == ListingStatus::Available);
    let counters = BatchOp::SetLandlordCounters {
        landlord: landlord_snapshot.id.clone(),
        total_listings: landlord_snapshot.total_listings + 1,
        active_listings: landlord_snapshot.active_listings + active_delta,
    };
    vec![BatchOp::InsertListing(listing), counters]
}
