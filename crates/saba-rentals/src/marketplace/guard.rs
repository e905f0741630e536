use super::domain::{Landlord, Role, UserId};

/// A subject whose session has already been verified and whose user
/// document has been loaded. Core operations receive this explicitly;
/// nothing reads the current user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedSubject {
    pub id: UserId,
    pub role: Role,
}

/// Actions gated by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// Approve/reject/suspend landlords.
    AdminOnly,
    /// Create a listing under the subject's own landlord record.
    CreateListing,
    /// Submit a landlord application.
    SubmitApplication,
    /// Edit or manage a specific landlord's listing.
    ModerateOwnListing { landlord_id: &'a UserId },
}

/// Denial reasons. `CreateListing` keeps "not approved" and "suspended"
/// distinct; tenant-facing authentication failures never carry that much
/// detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("admin access required")]
    AdminRequired,
    #[error("landlord access required")]
    LandlordRequired,
    #[error("landlord account not approved")]
    NotApproved,
    #[error("landlord account is suspended")]
    Suspended,
    #[error("an application has already been submitted for this account")]
    ApplicationExists,
    #[error("only the owning landlord may manage this listing")]
    NotOwner,
}

/// Authorize `action` for `subject`. Rules are evaluated in order and the
/// first match wins. `landlord` is the subject's own landlord record, if
/// one exists; it is only consulted for the actions that need it.
pub fn authorize(
    subject: &AuthorizedSubject,
    action: &Action<'_>,
    landlord: Option<&Landlord>,
) -> Result<(), AccessDenied> {
    match action {
        Action::AdminOnly => match subject.role {
            Role::Admin => Ok(()),
            Role::User | Role::Landlord => Err(AccessDenied::AdminRequired),
        },
        Action::CreateListing => match landlord {
            None => Err(AccessDenied::LandlordRequired),
            Some(record) if !record.approved => Err(AccessDenied::NotApproved),
            Some(record) if record.suspended => Err(AccessDenied::Suspended),
            Some(_) => Ok(()),
        },
        Action::SubmitApplication => match landlord {
            Some(_) => Err(AccessDenied::ApplicationExists),
            None => Ok(()),
        },
        Action::ModerateOwnListing { landlord_id } => match subject.role {
            Role::Admin => Ok(()),
            Role::User | Role::Landlord if **landlord_id == subject.id => Ok(()),
            Role::User | Role::Landlord => Err(AccessDenied::NotOwner),
        },
    }
}
