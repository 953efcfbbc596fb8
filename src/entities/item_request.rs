//! Item request entity - A user's request for supplies.
//!
//! The requester identity and the shipping address are stored by value, so later
//! edits to the profile or to a saved address never change a past request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity id of the requester
    pub user_id: String,
    /// Requester email at submission time
    pub user_email: String,
    /// Requester display name at submission time
    pub user_name: String,
    /// Name of the requested item
    pub item_name: String,
    /// `"book"`, `"pencil"` or `"school_supplies"`
    pub category: String,
    /// Requested quantity
    pub quantity: i32,
    /// Why the item is needed
    pub description: String,
    /// `"pending"`, `"approved"`, `"rejected"` or `"fulfilled"`
    pub status: String,
    /// Optional note left by an admin
    pub admin_notes: Option<String>,
    pub shipping_name: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    /// When the request was created
    pub created_at: DateTimeUtc,
    /// When the request was last modified
    pub updated_at: DateTimeUtc,
}

/// Item requests have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
