//! User profile entity - One row per identity.
//!
//! The optional contact columns are a legacy fallback, read only when the user has no
//! saved addresses.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    /// Identity id issued by the identity provider
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Email address of the identity
    pub email: String,
    /// Display name
    pub name: String,
    /// `"user"` or `"admin"`
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between profiles and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile has many saved addresses
    #[sea_orm(has_many = "super::user_address::Entity")]
    UserAddresses,
}

impl Related<super::user_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAddresses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
