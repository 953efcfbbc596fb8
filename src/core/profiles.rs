//! Profile data access.
//!
//! One profile row exists per identity. Profiles are created on sign-up and edited
//! only by their owner; the contact columns feed the wizard's fallback when the user
//! has no saved addresses.

use crate::{
    entities::{UserProfile as ProfileEntity, user_profile},
    errors::{Error, Result},
    models::{UserProfile, UserRole},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, instrument};

/// Editable profile fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or province
    pub state: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// Country
    pub country: Option<String>,
}

fn clean(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetches the profile for an identity, if one exists.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<Option<UserProfile>> {
    ProfileEntity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map(UserProfile::try_from)
        .transpose()
}

/// Creates the profile row for a freshly signed-up identity.
#[instrument(skip(db))]
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: &str,
    email: &str,
    name: &str,
    role: UserRole,
) -> Result<UserProfile> {
    if user_id.trim().is_empty() {
        return Err(Error::validation("user id", "cannot be empty"));
    }

    let now = chrono::Utc::now();
    let profile = user_profile::ActiveModel {
        id: Set(user_id.to_string()),
        email: Set(email.trim().to_string()),
        name: Set(name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        phone: Set(None),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        zip_code: Set(None),
        country: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let row = profile.insert(db).await?;
    debug!("Created profile for {}", row.id);
    UserProfile::try_from(row)
}

/// Inserts or updates the owner's profile. The role of an existing profile is kept.
#[instrument(skip(db, update))]
pub async fn upsert_profile(
    db: &DatabaseConnection,
    user_id: &str,
    email: &str,
    update: &ProfileUpdate,
) -> Result<UserProfile> {
    if update.name.trim().is_empty() {
        return Err(Error::validation("name", "cannot be empty"));
    }

    let now = chrono::Utc::now();
    let row = match ProfileEntity::find_by_id(user_id.to_string()).one(db).await? {
        Some(existing) => {
            let mut profile: user_profile::ActiveModel = existing.into();
            profile.email = Set(email.trim().to_string());
            profile.name = Set(update.name.trim().to_string());
            profile.phone = Set(clean(update.phone.as_ref()));
            profile.address = Set(clean(update.address.as_ref()));
            profile.city = Set(clean(update.city.as_ref()));
            profile.state = Set(clean(update.state.as_ref()));
            profile.zip_code = Set(clean(update.zip_code.as_ref()));
            profile.country = Set(clean(update.country.as_ref()));
            profile.updated_at = Set(now);
            profile.update(db).await?
        }
        None => {
            user_profile::ActiveModel {
                id: Set(user_id.to_string()),
                email: Set(email.trim().to_string()),
                name: Set(update.name.trim().to_string()),
                role: Set(UserRole::User.as_str().to_string()),
                phone: Set(clean(update.phone.as_ref())),
                address: Set(clean(update.address.as_ref())),
                city: Set(clean(update.city.as_ref())),
                state: Set(clean(update.state.as_ref())),
                zip_code: Set(clean(update.zip_code.as_ref())),
                country: Set(clean(update.country.as_ref())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    UserProfile::try_from(row)
}
