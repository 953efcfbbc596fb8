//! User address entity - Saved shipping/contact addresses.
//!
//! Each address belongs to exactly one user. At most one of a user's addresses is
//! primary; `core::addresses` keeps that invariant inside a transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Saved address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_addresses")]
pub struct Model {
    /// Unique identifier for the address
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning identity id
    pub user_id: String,
    /// `"Home"`, `"Work"`, `"School"` or `"Other"`
    pub label: String,
    /// Contact name for deliveries
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Street address
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    /// Whether this is the user's default address
    pub is_primary: bool,
    /// When the address was created
    pub created_at: DateTimeUtc,
    /// When the address was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between addresses and profiles
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each address belongs to one profile
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::UserId",
        to = "super::user_profile::Column::Id"
    )]
    UserProfile,
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
