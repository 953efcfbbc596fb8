//! Saved address data access.
//!
//! Addresses are listed primary first, then newest first; the wizard's default
//! selection depends on that order. Every write that marks an address primary clears
//! the flag on the owner's other addresses inside the same transaction, so a user never
//! ends up with two primary addresses.

use crate::{
    entities::{UserAddress as AddressEntity, user_address},
    errors::{Error, Result},
    models::{AddressLabel, UserAddress, parse_rows},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Fields of an address as entered by its owner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    /// Home, work or other
    pub label: AddressLabel,
    /// Recipient name
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    /// Makes this the owner's only primary address
    pub is_primary: bool,
}

impl AddressInput {
    fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(Error::validation(*field, "is required")),
            None => Ok(()),
        }
    }
}

fn optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clears the primary flag on every address the user owns.
async fn clear_primary<C>(db: &C, user_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    AddressEntity::update_many()
        .col_expr(user_address::Column::IsPrimary, Expr::value(false))
        .filter(user_address::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn find_owned<C>(db: &C, user_id: &str, address_id: i64) -> Result<user_address::Model>
where
    C: ConnectionTrait,
{
    AddressEntity::find_by_id(address_id)
        .filter(user_address::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("address", address_id))
}

/// Lists a user's addresses, primary first, then newest first.
pub async fn list_addresses(db: &DatabaseConnection, user_id: &str) -> Result<Vec<UserAddress>> {
    let rows = AddressEntity::find()
        .filter(user_address::Column::UserId.eq(user_id))
        .order_by_desc(user_address::Column::IsPrimary)
        .order_by_desc(user_address::Column::CreatedAt)
        .order_by_desc(user_address::Column::Id)
        .all(db)
        .await?;
    parse_rows(rows)
}

/// Saves a new address for the user.
#[instrument(skip(db, input))]
pub async fn create_address(
    db: &DatabaseConnection,
    user_id: &str,
    input: &AddressInput,
) -> Result<UserAddress> {
    input.validate()?;

    let txn = db.begin().await?;
    if input.is_primary {
        clear_primary(&txn, user_id).await?;
    }

    let now = chrono::Utc::now();
    let row = user_address::ActiveModel {
        user_id: Set(user_id.to_string()),
        label: Set(input.label.as_str().to_string()),
        name: Set(input.name.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        address: Set(input.address.trim().to_string()),
        city: Set(input.city.trim().to_string()),
        state: Set(optional(input.state.as_ref())),
        zip_code: Set(optional(input.zip_code.as_ref())),
        country: Set(input.country.trim().to_string()),
        is_primary: Set(input.is_primary),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    debug!("Saved address {} for {}", row.id, user_id);
    UserAddress::try_from(row)
}

/// Replaces the fields of one of the user's addresses.
#[instrument(skip(db, input))]
pub async fn update_address(
    db: &DatabaseConnection,
    user_id: &str,
    address_id: i64,
    input: &AddressInput,
) -> Result<UserAddress> {
    input.validate()?;

    let txn = db.begin().await?;
    let existing = find_owned(&txn, user_id, address_id).await?;
    if input.is_primary {
        clear_primary(&txn, user_id).await?;
    }

    let mut address: user_address::ActiveModel = existing.into();
    address.label = Set(input.label.as_str().to_string());
    address.name = Set(input.name.trim().to_string());
    address.phone = Set(input.phone.trim().to_string());
    address.address = Set(input.address.trim().to_string());
    address.city = Set(input.city.trim().to_string());
    address.state = Set(optional(input.state.as_ref()));
    address.zip_code = Set(optional(input.zip_code.as_ref()));
    address.country = Set(input.country.trim().to_string());
    address.is_primary = Set(input.is_primary);
    address.updated_at = Set(chrono::Utc::now());
    let row = address.update(&txn).await?;

    txn.commit().await?;
    UserAddress::try_from(row)
}

/// Deletes one of the user's addresses.
#[instrument(skip(db))]
pub async fn delete_address(db: &DatabaseConnection, user_id: &str, address_id: i64) -> Result<()> {
    let existing = find_owned(db, user_id, address_id).await?;
    existing.delete(db).await?;
    Ok(())
}

/// Makes one address the user's only primary address.
#[instrument(skip(db))]
pub async fn set_primary_address(
    db: &DatabaseConnection,
    user_id: &str,
    address_id: i64,
) -> Result<UserAddress> {
    let txn = db.begin().await?;
    let existing = find_owned(&txn, user_id, address_id).await?;
    clear_primary(&txn, user_id).await?;

    let mut address: user_address::ActiveModel = existing.into();
    address.is_primary = Set(true);
    address.updated_at = Set(chrono::Utc::now());
    let row = address.update(&txn).await?;

    txn.commit().await?;
    UserAddress::try_from(row)
}
