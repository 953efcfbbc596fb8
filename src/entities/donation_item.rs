//! Donation item entity - A donated school supply.
//!
//! Donor submissions start unavailable (pending review) and become visible once an
//! admin approves them. The category is stored as its lowercase string form.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donation item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donation_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item name (e.g., "Math Textbook")
    pub name: String,
    /// Free-text description; donor submissions carry a contact footer
    pub description: String,
    /// `"book"`, `"pencil"` or `"school_supplies"`
    pub category: String,
    /// Number of units on offer
    pub quantity: i32,
    /// Free-text condition, `"Good"` unless the donor says otherwise
    pub condition: String,
    /// Optional image URL
    pub image_url: Option<String>,
    /// Whether the item is visible in the catalog
    pub is_available: bool,
    /// Identity id of the donor, None for admin-added catalog items
    pub donor_id: Option<String>,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

/// Donation items have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
