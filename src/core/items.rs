//! Donation item data access.
//!
//! Donor submissions are inserted unavailable and wait for admin review. Approval flips
//! the availability flag; rejection deletes the row. Admins can also add catalog items
//! directly, which are available immediately.

use crate::{
    config::settings::CatalogItemConfig,
    core::admin::Confirmation,
    entities::{DonationItem as ItemEntity, donation_item},
    errors::{Error, Result},
    models::{Category, DEFAULT_CONDITION, DonationItem, parse_rows},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, info, instrument};

/// A donor's submission, built by the submission wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    /// Item name
    pub name: String,
    /// Item description including the donor contact footer
    pub description: String,
    /// Catalog category
    pub category: Category,
    /// At least 1
    pub quantity: u32,
    /// One of the suggested conditions or free text
    pub condition: String,
    /// Optional picture of the item
    pub image_url: Option<String>,
    /// Identity id of the donor
    pub donor_id: String,
}

/// An item an admin adds straight to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogItem {
    /// Item name
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Units on hand
    pub quantity: u32,
    pub condition: String,
    pub image_url: Option<String>,
}

impl From<&CatalogItemConfig> for NewCatalogItem {
    fn from(config: &CatalogItemConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            category: config.category,
            quantity: config.quantity,
            condition: config.condition.clone(),
            image_url: config.image_url.clone(),
        }
    }
}

fn validate_item(name: &str, description: &str, quantity: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("item name", "cannot be empty"));
    }
    if description.trim().is_empty() {
        return Err(Error::validation("description", "cannot be empty"));
    }
    if quantity == 0 {
        return Err(Error::validation("quantity", "must be at least 1"));
    }
    Ok(())
}

fn quantity_column(quantity: u32) -> Result<i32> {
    i32::try_from(quantity).map_err(|_| Error::validation("quantity", "is too large"))
}

fn condition_or_default(condition: &str) -> String {
    let condition = condition.trim();
    if condition.is_empty() {
        DEFAULT_CONDITION.to_string()
    } else {
        condition.to_string()
    }
}

async fn insert_item(
    db: &DatabaseConnection,
    item: NewCatalogItem,
    is_available: bool,
    donor_id: Option<String>,
) -> Result<DonationItem> {
    validate_item(&item.name, &item.description, item.quantity)?;

    let now = chrono::Utc::now();
    let row = donation_item::ActiveModel {
        name: Set(item.name.trim().to_string()),
        description: Set(item.description.trim().to_string()),
        category: Set(item.category.as_str().to_string()),
        quantity: Set(quantity_column(item.quantity)?),
        condition: Set(condition_or_default(&item.condition)),
        image_url: Set(item
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())),
        is_available: Set(is_available),
        donor_id: Set(donor_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    DonationItem::try_from(row)
}

/// Inserts a donor submission in the pending (unavailable) state.
#[instrument(skip(db, donation), fields(name = %donation.name))]
pub async fn create_donation(db: &DatabaseConnection, donation: NewDonation) -> Result<DonationItem> {
    let donor_id = Some(donation.donor_id);
    let item = NewCatalogItem {
        name: donation.name,
        description: donation.description,
        category: donation.category,
        quantity: donation.quantity,
        condition: donation.condition,
        image_url: donation.image_url,
    };
    let created = insert_item(db, item, false, donor_id).await?;
    info!("Donation {} submitted for review", created.id);
    Ok(created)
}

/// Adds an available item to the catalog.
#[instrument(skip(db, item), fields(name = %item.name))]
pub async fn add_catalog_item(db: &DatabaseConnection, item: NewCatalogItem) -> Result<DonationItem> {
    insert_item(db, item, true, None).await
}

/// Finds an item by id, whatever its availability.
pub async fn get_item(db: &DatabaseConnection, item_id: i64) -> Result<Option<DonationItem>> {
    ItemEntity::find_by_id(item_id)
        .one(db)
        .await?
        .map(DonationItem::try_from)
        .transpose()
}

async fn list_by_availability(db: &DatabaseConnection, available: bool) -> Result<Vec<DonationItem>> {
    let rows = ItemEntity::find()
        .filter(donation_item::Column::IsAvailable.eq(available))
        .order_by_desc(donation_item::Column::CreatedAt)
        .order_by_desc(donation_item::Column::Id)
        .all(db)
        .await?;
    parse_rows(rows)
}

/// Every available item, newest first.
pub async fn list_available(db: &DatabaseConnection) -> Result<Vec<DonationItem>> {
    list_by_availability(db, true).await
}

/// Every donation still waiting for review, newest first.
pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<DonationItem>> {
    list_by_availability(db, false).await
}

/// Other available items in the same category as `item`.
pub async fn related_items(
    db: &DatabaseConnection,
    item: &DonationItem,
    limit: u64,
) -> Result<Vec<DonationItem>> {
    let rows = ItemEntity::find()
        .filter(donation_item::Column::Category.eq(item.category.as_str()))
        .filter(donation_item::Column::Id.ne(item.id))
        .filter(donation_item::Column::IsAvailable.eq(true))
        .order_by_desc(donation_item::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;
    parse_rows(rows)
}

async fn set_availability(
    db: &DatabaseConnection,
    item_id: i64,
    available: bool,
) -> Result<DonationItem> {
    let existing = ItemEntity::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("donation item", item_id))?;

    let mut item: donation_item::ActiveModel = existing.into();
    item.is_available = Set(available);
    item.updated_at = Set(chrono::Utc::now());
    DonationItem::try_from(item.update(db).await?)
}

/// Makes a donation visible in the catalog. Approving an available item succeeds
/// and leaves it available.
#[instrument(skip(db))]
pub async fn approve_donation(db: &DatabaseConnection, item_id: i64) -> Result<DonationItem> {
    let item = set_availability(db, item_id, true).await?;
    info!("Donation {} approved", item_id);
    Ok(item)
}

/// Deletes a pending donation. Irreversible; requires confirmation.
#[instrument(skip(db))]
pub async fn reject_donation(
    db: &DatabaseConnection,
    item_id: i64,
    confirmation: Confirmation,
) -> Result<()> {
    delete_item(db, item_id, confirmation).await?;
    info!("Donation {} rejected", item_id);
    Ok(())
}

/// Flips the availability of a catalog item.
#[instrument(skip(db))]
pub async fn toggle_item_availability(db: &DatabaseConnection, item_id: i64) -> Result<DonationItem> {
    let current = get_item(db, item_id)
        .await?
        .ok_or_else(|| Error::not_found("donation item", item_id))?;
    set_availability(db, item_id, !current.is_available).await
}

/// Deletes an item. Irreversible; requires confirmation.
#[instrument(skip(db))]
pub async fn delete_item(
    db: &DatabaseConnection,
    item_id: i64,
    confirmation: Confirmation,
) -> Result<()> {
    confirmation.require()?;
    let result = ItemEntity::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("donation item", item_id));
    }
    debug!("Deleted donation item {}", item_id);
    Ok(())
}

/// Inserts the configured catalog when the items table is empty.
///
/// Returns the number of items inserted.
#[instrument(skip_all)]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &[CatalogItemConfig]) -> Result<usize> {
    let existing = ItemEntity::find().count(db).await?;
    if existing > 0 {
        debug!("Catalog already has {} items, skipping seed", existing);
        return Ok(0);
    }

    for entry in catalog {
        add_catalog_item(db, NewCatalogItem::from(entry)).await?;
    }
    info!("Seeded {} catalog items", catalog.len());
    Ok(catalog.len())
}
