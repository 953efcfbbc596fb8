//! Shared test utilities for `donation-desk`.
//!
//! Helpers for setting up test databases and building fixtures with sensible
//! defaults. Most fixtures describe the same person (Asha in Colombo) so that
//! scenario tests read naturally.

use crate::{
    core::{
        addresses::{self, AddressInput},
        items::{self, NewCatalogItem, NewDonation},
        profiles::{self, ProfileUpdate},
        requests::NewRequest,
        shipping::ContactFields,
    },
    errors::Result,
    models::{
        AddressLabel, Category, DEFAULT_CONDITION, DonationItem, ShippingSnapshot, UserAddress,
        UserProfile, UserRole,
    },
    session::{AuthUser, SessionState},
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Id of the admin created by [`admin_session`]
pub const ADMIN_ID: &str = "admin";
/// Id of the user in the Asha fixtures
pub const ASHA_ID: &str = "asha";

/// Routes tracing output to the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a plain user profile with no contact details.
///
/// # Defaults
/// * `email`: `{id}@example.com`
/// * `role`: user
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<UserProfile> {
    let email = format!("{user_id}@example.com");
    profiles::create_profile(db, user_id, &email, name, UserRole::User).await
}

/// Signed-in state for an existing profile.
pub async fn session_for(db: &DatabaseConnection, user_id: &str) -> Result<SessionState> {
    let profile = profiles::get_profile(db, user_id).await?;
    let email = profile
        .as_ref()
        .map_or_else(|| format!("{user_id}@example.com"), |p| p.email.clone());
    let user = AuthUser {
        id: user_id.to_string(),
        email,
    };
    Ok(SessionState::signed_in(user, profile))
}

/// Creates an admin profile and returns its signed-in state.
pub async fn admin_session(db: &DatabaseConnection) -> Result<SessionState> {
    let profile =
        profiles::create_profile(db, ADMIN_ID, "admin@example.com", "Admin", UserRole::Admin)
            .await?;
    let user = AuthUser {
        id: profile.id.clone(),
        email: profile.email.clone(),
    };
    Ok(SessionState::signed_in(user, Some(profile)))
}

/// Admin signed-in state without touching a database.
pub fn admin_state() -> SessionState {
    let now = chrono::Utc::now();
    let profile = UserProfile {
        id: ADMIN_ID.to_string(),
        email: "admin@example.com".to_string(),
        name: "Admin".to_string(),
        role: UserRole::Admin,
        phone: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
        country: None,
        created_at: now,
        updated_at: now,
    };
    let user = AuthUser {
        id: profile.id.clone(),
        email: profile.email.clone(),
    };
    SessionState::signed_in(user, Some(profile))
}

fn asha_profile_update() -> ProfileUpdate {
    ProfileUpdate {
        name: "Asha".to_string(),
        phone: Some("0770000000".to_string()),
        address: Some("12 Lake Rd".to_string()),
        city: Some("Colombo".to_string()),
        country: Some("Sri Lanka".to_string()),
        ..ProfileUpdate::default()
    }
}

/// Asha's signed-in state without touching a database.
pub fn asha_session() -> SessionState {
    let update = asha_profile_update();
    let now = chrono::Utc::now();
    let profile = UserProfile {
        id: ASHA_ID.to_string(),
        email: "asha@example.com".to_string(),
        name: update.name,
        role: UserRole::User,
        phone: update.phone,
        address: update.address,
        city: update.city,
        state: None,
        zip_code: None,
        country: update.country,
        created_at: now,
        updated_at: now,
    };
    let user = AuthUser {
        id: profile.id.clone(),
        email: profile.email.clone(),
    };
    SessionState::signed_in(user, Some(profile))
}

/// Stores Asha's profile and returns her signed-in state.
pub async fn asha_session_in(db: &DatabaseConnection) -> Result<SessionState> {
    profiles::upsert_profile(db, ASHA_ID, "asha@example.com", &asha_profile_update()).await?;
    session_for(db, ASHA_ID).await
}

/// Complete address input at 12 Lake Rd, Colombo.
pub fn test_address_input(label: AddressLabel, is_primary: bool) -> AddressInput {
    AddressInput {
        label,
        name: "Asha".to_string(),
        phone: "0770000000".to_string(),
        address: "12 Lake Rd".to_string(),
        city: "Colombo".to_string(),
        state: Some("Western".to_string()),
        zip_code: Some("00100".to_string()),
        country: "Sri Lanka".to_string(),
        is_primary,
    }
}

/// Saves [`test_address_input`] for `user_id`. The profile must exist.
pub async fn create_test_address(
    db: &DatabaseConnection,
    user_id: &str,
    label: AddressLabel,
    is_primary: bool,
) -> Result<UserAddress> {
    addresses::create_address(db, user_id, &test_address_input(label, is_primary)).await
}

/// In-memory saved address with the [`test_address_input`] fields.
pub fn address_fixture(id: i64, label: AddressLabel, is_primary: bool) -> UserAddress {
    let input = test_address_input(label, is_primary);
    UserAddress {
        id,
        user_id: ASHA_ID.to_string(),
        label,
        name: input.name,
        phone: input.phone,
        address: input.address,
        city: input.city,
        state: input.state,
        zip_code: input.zip_code,
        country: input.country,
        is_primary,
        created_at: chrono::Utc::now(),
    }
}

/// A fully filled contact form for an address in Kandy.
pub fn complete_contact() -> ContactFields {
    ContactFields {
        name: "Kamal Perera".to_string(),
        phone: "0711234567".to_string(),
        email: String::new(),
        address: "5 Temple Rd".to_string(),
        city: "Kandy".to_string(),
        state: "Central".to_string(),
        zip: "20000".to_string(),
        country: "Sri Lanka".to_string(),
    }
}

/// In-memory available catalog item described as "{name} in good shape".
pub fn item_fixture(id: i64, name: &str, category: Category) -> DonationItem {
    let now = chrono::Utc::now();
    DonationItem {
        id,
        name: name.to_string(),
        description: format!("{name} in good shape"),
        category,
        quantity: 1,
        condition: DEFAULT_CONDITION.to_string(),
        image_url: None,
        is_available: true,
        donor_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// A book donation from `donor-1`.
pub fn test_donation(name: &str) -> NewDonation {
    NewDonation {
        name: name.to_string(),
        description: "Gently used".to_string(),
        category: Category::Book,
        quantity: 1,
        condition: DEFAULT_CONDITION.to_string(),
        image_url: None,
        donor_id: "donor-1".to_string(),
    }
}

/// Adds an available catalog item described as "{name} in good shape".
pub async fn create_test_catalog_item(
    db: &DatabaseConnection,
    name: &str,
    category: Category,
) -> Result<DonationItem> {
    let item = NewCatalogItem {
        name: name.to_string(),
        description: format!("{name} in good shape"),
        category,
        quantity: 1,
        condition: DEFAULT_CONDITION.to_string(),
        image_url: None,
    };
    items::add_catalog_item(db, item).await
}

/// A request for one book, shipping to Colombo.
pub fn test_request(user_id: &str, item_name: &str) -> NewRequest {
    NewRequest {
        user_id: user_id.to_string(),
        user_email: format!("{user_id}@example.com"),
        user_name: "Asha".to_string(),
        item_name: item_name.to_string(),
        category: Category::Book,
        quantity: 1,
        description: "Needed for school".to_string(),
        shipping: ShippingSnapshot {
            name: "Asha".to_string(),
            phone: "0770000000".to_string(),
            email: Some(format!("{user_id}@example.com")),
            address: "12 Lake Rd".to_string(),
            city: "Colombo".to_string(),
            state: String::new(),
            zip: String::new(),
            country: "Sri Lanka".to_string(),
        },
    }
}
