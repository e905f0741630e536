use crate::infra::{InMemoryIdentityProvider, InMemoryMarketplaceStore};
use chrono::{Duration, Utc};
use clap::Args;
use saba_rentals::error::AppError;
use saba_rentals::marketplace::{
    ApplicationForm, Area, InquiryForm, ListingForm, ListingQuery, MarketplaceError,
    MarketplaceService, NotificationFrequency, Role, SessionClaims, StatusFilter, User, UserId,
};
use std::sync::Arc;

type DemoService = MarketplaceService<InMemoryMarketplaceStore, InMemoryIdentityProvider>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Restrict the catalogue walkthrough to one village (slug, e.g. "windwardside")
    #[arg(long)]
    pub(crate) area: Option<String>,
    /// Upper bound on monthly rent for the catalogue walkthrough
    #[arg(long)]
    pub(crate) max_price: Option<u32>,
    /// Skip the suspension/reinstatement portion of the demo
    #[arg(long)]
    pub(crate) skip_moderation: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SeedSummary {
    pub(crate) landlords: usize,
    pub(crate) listings: usize,
}

fn seed_user(
    store: &InMemoryMarketplaceStore,
    id: &str,
    display_name: &str,
    email: &str,
    role: Role,
) -> Result<SessionClaims, MarketplaceError> {
    use saba_rentals::marketplace::MarketplaceStore as _;

    let now = Utc::now();
    store.insert_user(User {
        id: UserId(id.to_string()),
        email: email.to_string(),
        display_name: display_name.to_string(),
        role,
        verified_tenant: false,
        email_notifications: true,
        notification_frequency: NotificationFrequency::Instant,
        saved_listings: Vec::new(),
        created_at: now,
        updated_at: now,
    })?;
    Ok(SessionClaims {
        subject: UserId(id.to_string()),
        email: email.to_string(),
    })
}

fn cottage_listing() -> ListingForm {
    ListingForm {
        title: "Charming Windwardside Cottage with Ocean Views".to_string(),
        description: "Two-bedroom cottage in the heart of Windwardside with a wrap-around \
                      veranda, hardwood floors, and reliable internet. Walking distance to \
                      restaurants and the Mount Scenery trailhead."
            .to_string(),
        monthly_rent: 1800,
        area: Some(Area::Windwardside),
        address: "Booby Hill Road 12, Windwardside".to_string(),
        bedrooms: 2,
        bathrooms: Some(1.0),
        square_footage: Some(850),
        status: None,
        furnished: None,
        pets: None,
        parking: None,
        utilities: None,
        photos: Vec::new(),
        primary_photo_index: 0,
        contact_form_enabled: None,
        show_contact_info: None,
    }
}

fn studio_listing() -> ListingForm {
    ListingForm {
        title: "Sunny Studio in The Bottom".to_string(),
        description: "Compact studio near the government quarter, ideal for medical school \
                      students. Shared garden and cistern water included."
            .to_string(),
        monthly_rent: 950,
        area: Some(Area::TheBottom),
        address: "Queens Highway 3, The Bottom".to_string(),
        bedrooms: 0,
        bathrooms: Some(1.0),
        square_footage: Some(420),
        status: None,
        furnished: None,
        pets: None,
        parking: None,
        utilities: None,
        photos: Vec::new(),
        primary_photo_index: 0,
        contact_form_enabled: None,
        show_contact_info: None,
    }
}

/// Hydrate an empty store with a small, realistic dataset: one approved
/// landlord with two listings, one pending application, and registered
/// identities for the demo session tokens.
pub(crate) fn seed_marketplace(
    service: &DemoService,
    store: &InMemoryMarketplaceStore,
    provider: &InMemoryIdentityProvider,
) -> Result<SeedSummary, MarketplaceError> {
    let admin = seed_user(
        store,
        "admin-saba",
        "Site Admin",
        "admin@liveonsaba.com",
        Role::Admin,
    )?;
    provider.register_identity("token-admin", &admin.subject, &admin.email);

    let maria = seed_user(
        store,
        "maria-santos",
        "Maria Santos",
        "maria.santos@example.com",
        Role::User,
    )?;
    provider.register_identity("token-maria", &maria.subject, &maria.email);

    service.submit_application(
        &maria,
        ApplicationForm {
            contact_email: maria.email.clone(),
            contact_phone: Some("+599 416 5678".to_string()),
            profile_description: Some(
                "Long-time Saba resident with beautifully maintained rental properties."
                    .to_string(),
            ),
            show_contact_publicly: true,
        },
    )?;
    service.approve_landlord(&admin, &maria.subject)?;

    service.create_listing(&maria, cottage_listing())?;
    service.create_listing(&maria, studio_listing())?;

    // A second applicant left pending so the moderation endpoints have
    // something to act on.
    let johan = seed_user(
        store,
        "johan-peters",
        "Johan Peters",
        "johan.peters@example.com",
        Role::User,
    )?;
    provider.register_identity("token-johan", &johan.subject, &johan.email);
    service.submit_application(
        &johan,
        ApplicationForm {
            contact_email: johan.email.clone(),
            contact_phone: None,
            profile_description: Some("Renovating a family cottage in St. Johns.".to_string()),
            show_contact_publicly: false,
        },
    )?;

    Ok(SeedSummary {
        landlords: 2,
        listings: 2,
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        area,
        max_price,
        skip_moderation,
    } = args;

    let store = Arc::new(InMemoryMarketplaceStore::default());
    let provider = Arc::new(InMemoryIdentityProvider::default());
    let service: DemoService =
        MarketplaceService::new(store.clone(), provider.clone(), Duration::days(5));

    println!("LiveOnSaba marketplace demo");
    let summary = match seed_marketplace(&service, store.as_ref(), provider.as_ref()) {
        Ok(summary) => summary,
        Err(error) => {
            println!("  Seed failed: {error}");
            return Ok(());
        }
    };
    println!(
        "- Seeded {} landlords ({} approved) and {} listings",
        summary.landlords,
        summary.landlords - 1,
        summary.listings
    );

    let area_filter = match area.as_deref() {
        None => None,
        Some(value) => match Area::parse(value) {
            Some(parsed) => Some(parsed),
            None => {
                println!("- Unknown area '{value}', searching all villages instead");
                None
            }
        },
    };
    let query = ListingQuery {
        status: StatusFilter::default(),
        area: area_filter,
        min_price: None,
        max_price,
        min_bedrooms: None,
    };

    println!("\nPublic catalogue");
    render_catalogue(&service, &query);

    let maria = UserId("maria-santos".to_string());
    let spotlight = match service.search_listings(&ListingQuery::default()) {
        Ok(listings) => listings.into_iter().find(|l| l.landlord_id == maria),
        Err(error) => {
            println!("  Search unavailable: {error}");
            return Ok(());
        }
    };
    let Some(spotlight) = spotlight else {
        println!("  No seeded listing found");
        return Ok(());
    };

    println!("\nTenant inquiry");
    match service.submit_inquiry(
        None,
        &spotlight.id,
        InquiryForm {
            name: "Jan de Vries".to_string(),
            email: "jan.devries@example.com".to_string(),
            phone: None,
            message: "Is this still available from October? I work remotely.".to_string(),
        },
    ) {
        Ok(inquiry) => println!(
            "- Inquiry {} recorded against '{}' (status {})",
            inquiry.id.0,
            spotlight.title,
            inquiry.status.label()
        ),
        Err(error) => println!("- Inquiry rejected: {error}"),
    }

    if skip_moderation {
        return Ok(());
    }

    println!("\nModeration: suspension hides the catalogue instantly");
    let admin = SessionClaims {
        subject: UserId("admin-saba".to_string()),
        email: "admin@liveonsaba.com".to_string(),
    };
    if let Err(error) = service.set_landlord_suspension(&admin, &maria, true) {
        println!("- Suspension failed: {error}");
        return Ok(());
    }
    println!("- Maria Santos suspended; public search now returns:");
    render_catalogue(&service, &query);
    match service.listing_detail(&spotlight.id) {
        Err(MarketplaceError::NotFound) => {
            println!("- Detail fetch of '{}' reads as not found", spotlight.title);
        }
        Ok(_) => println!("- Unexpected: detail still visible"),
        Err(error) => println!("- Detail fetch failed: {error}"),
    }

    if let Err(error) = service.set_landlord_suspension(&admin, &maria, false) {
        println!("- Reinstatement failed: {error}");
        return Ok(());
    }
    println!("- Reinstated; public search again returns:");
    render_catalogue(&service, &query);

    Ok(())
}

fn render_catalogue(service: &DemoService, query: &ListingQuery) {
    match service.search_listings(query) {
        Ok(listings) if listings.is_empty() => println!("  (no listings match)"),
        Ok(listings) => {
            for listing in listings {
                let bedrooms = match listing.bedrooms {
                    0 => "studio".to_string(),
                    n => format!("{n} bd"),
                };
                println!(
                    "  - {} | {} | ${}/mo | {}",
                    listing.title,
                    listing.area.label(),
                    listing.monthly_rent,
                    bedrooms
                );
            }
        }
        Err(error) => println!("  Search unavailable: {error}"),
    }
}
