use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user accounts. Landlord records share the id of
/// their owning user, so the same wrapper addresses both collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for listing documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Identifier wrapper for inquiry documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InquiryId(pub String);

/// Closed role set; promotion to `Landlord` only happens through the
/// approve-landlord transaction, never by direct edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Landlord,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Landlord => "landlord",
            Role::Admin => "admin",
        }
    }
}

/// The eleven villages listings can be located in. The set is fixed; query
/// parameters outside it are rejected rather than matched loosely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    Windwardside,
    StJohns,
    TheBottom,
    BoobyHill,
    TheLevel,
    UpperHellsGate,
    LowerHellsGate,
    EnglishQuarter,
    MountainRoad,
    WellsBayRoad,
    TroyHill,
}

impl Area {
    pub const ALL: [Area; 11] = [
        Area::Windwardside,
        Area::StJohns,
        Area::TheBottom,
        Area::BoobyHill,
        Area::TheLevel,
        Area::UpperHellsGate,
        Area::LowerHellsGate,
        Area::EnglishQuarter,
        Area::MountainRoad,
        Area::WellsBayRoad,
        Area::TroyHill,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Area::Windwardside => "windwardside",
            Area::StJohns => "st-johns",
            Area::TheBottom => "the-bottom",
            Area::BoobyHill => "booby-hill",
            Area::TheLevel => "the-level",
            Area::UpperHellsGate => "upper-hells-gate",
            Area::LowerHellsGate => "lower-hells-gate",
            Area::EnglishQuarter => "english-quarter",
            Area::MountainRoad => "mountain-road",
            Area::WellsBayRoad => "wells-bay-road",
            Area::TroyHill => "troy-hill",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Area::Windwardside => "Windwardside",
            Area::StJohns => "St. Johns",
            Area::TheBottom => "The Bottom",
            Area::BoobyHill => "Booby Hill",
            Area::TheLevel => "The Level",
            Area::UpperHellsGate => "Upper Hell's Gate",
            Area::LowerHellsGate => "Lower Hell's Gate",
            Area::EnglishQuarter => "English Quarter",
            Area::MountainRoad => "Mountain Road",
            Area::WellsBayRoad => "Wells Bay Road",
            Area::TroyHill => "Troy Hill",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|area| area.slug() == value)
    }
}

/// Lifecycle states a listing moves through. There is no deleted state;
/// retired listings go off-market instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    ComingSoon,
    Available,
    Pending,
    OffMarket,
}

impl ListingStatus {
    pub const fn slug(self) -> &'static str {
        match self {
            ListingStatus::ComingSoon => "coming-soon",
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::OffMarket => "off-market",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "coming-soon" => Some(Self::ComingSoon),
            "available" => Some(Self::Available),
            "pending" => Some(Self::Pending),
            "off-market" => Some(Self::OffMarket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnishedStatus {
    Yes,
    Partial,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetPolicy {
    Yes,
    No,
    Negotiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParkingType {
    OnProperty,
    Street,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityIncluded {
    Yes,
    Partial,
    No,
}

/// Per-utility inclusion flags with optional free-text detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilities {
    pub electric: UtilityIncluded,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electric_allowance: Option<String>,
    pub water: UtilityIncluded,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_details: Option<String>,
    pub internet: UtilityIncluded,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_details: Option<String>,
}

impl Default for Utilities {
    fn default() -> Self {
        Self {
            electric: UtilityIncluded::No,
            electric_allowance: None,
            water: UtilityIncluded::No,
            water_details: None,
            internet: UtilityIncluded::No,
            other_details: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    Instant,
    Daily,
    Weekly,
}

/// Account document created at signup. Never hard-deleted; the role field
/// is only mutated by the approve-landlord transaction or admin edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub verified_tenant: bool,
    pub email_notifications: bool,
    pub notification_frequency: NotificationFrequency,
    pub saved_listings: Vec<ListingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Landlord record, one-to-one with a user via shared id. Created
/// unapproved on application; deleted on rejection; suspension is a flag
/// read at query time, never propagated onto listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landlord {
    pub id: UserId,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
    pub suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_by: Option<UserId>,
    pub application_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_description: Option<String>,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    pub show_contact_publicly: bool,
    pub total_listings: u32,
    pub active_listings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,
    pub review_count: u32,
}

/// Listing document. `view_count` and `inquiry_count` only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub landlord_id: UserId,
    pub title: String,
    pub description: String,
    pub monthly_rent: u32,
    pub area: Area,
    pub address: String,
    pub bedrooms: u8,
    pub bathrooms: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<u32>,
    pub status: ListingStatus,
    pub furnished: FurnishedStatus,
    pub pets: PetPolicy,
    pub parking: ParkingType,
    pub utilities: Utilities,
    pub photos: Vec<String>,
    pub primary_photo_index: usize,
    pub contact_form_enabled: bool,
    pub show_contact_info: bool,
    pub featured: bool,
    pub view_count: u64,
    pub inquiry_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Forward-only inquiry lifecycle: pending, then replied, then closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    Pending,
    Replied,
    Closed,
}

impl InquiryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Replied => "replied",
            InquiryStatus::Closed => "closed",
        }
    }

    /// Whether `next` is a legal transition; no reverse moves exist.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (InquiryStatus::Pending, InquiryStatus::Replied)
                | (InquiryStatus::Pending, InquiryStatus::Closed)
                | (InquiryStatus::Replied, InquiryStatus::Closed)
        )
    }
}

/// Tenant inquiry against a listing. `user_id` is `None` for anonymous
/// submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub listing_id: ListingId,
    pub landlord_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
