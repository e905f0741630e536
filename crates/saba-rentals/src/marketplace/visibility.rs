use super::domain::Landlord;

/// Whether a landlord's listings are servable to unprivileged callers.
///
/// Suspension is evaluated here on every read instead of being written
/// onto listings, so flipping the flag hides or restores a landlord's
/// whole catalogue instantly. Detail fetches of hidden listings report
/// not-found, never forbidden.
pub fn is_public(landlord: &Landlord) -> bool {
    !landlord.suspended
}
