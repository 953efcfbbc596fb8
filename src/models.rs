//! Validated domain values.
//!
//! Storage rows from [`crate::entities`] are parsed into these types before they reach
//! any caller. Enumerations are stored as strings, so an unknown value in the store
//! surfaces as [`Error::InvalidRow`] instead of leaking through.

use crate::{
    entities::{donation_item, item_request, user_address, user_profile},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three fixed item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Textbooks, notebooks, story books
    Book,
    /// Pens, pencils, erasers, rulers
    Pencil,
    /// Bags, uniforms, other supplies
    SchoolSupplies,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 3] = [Self::Book, Self::Pencil, Self::SchoolSupplies];

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Pencil => "pencil",
            Self::SchoolSupplies => "school_supplies",
        }
    }

    /// Label shown in category pickers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Book => "Books",
            Self::Pencil => "Stationery",
            Self::SchoolSupplies => "School Supplies",
        }
    }

    /// Short description shown under the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Book => "Textbooks, notebooks, story books",
            Self::Pencil => "Pens, pencils, erasers, rulers",
            Self::SchoolSupplies => "Bags, uniforms, other supplies",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "book" => Ok(Self::Book),
            "pencil" => Ok(Self::Pencil),
            "school_supplies" => Ok(Self::SchoolSupplies),
            other => Err(Error::validation(
                "category",
                format!("unknown category '{other}'"),
            )),
        }
    }
}

/// Lifecycle of an item request. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting admin review
    Pending,
    /// Accepted by an admin
    Approved,
    /// Declined by an admin
    Rejected,
    /// Item delivered
    Fulfilled,
}

impl RequestStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
        }
    }

    /// Statuses reachable from this one.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Fulfilled],
            Self::Rejected | Self::Fulfilled => &[],
        }
    }

    /// Whether `next` is an allowed transition from this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "fulfilled" => Ok(Self::Fulfilled),
            other => Err(Error::validation(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// Role attached to a profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular donor/requester
    #[default]
    User,
    /// Administrator with access to the triage panel
    Admin,
}

impl UserRole {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(Error::validation("role", format!("unknown role '{other}'"))),
        }
    }
}

/// Label for a saved address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressLabel {
    /// Home address
    #[default]
    Home,
    /// Work address
    Work,
    /// School address
    School,
    /// Anything else
    Other,
}

impl AddressLabel {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::School => "School",
            Self::Other => "Other",
        }
    }
}

impl FromStr for AddressLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Home" => Ok(Self::Home),
            "Work" => Ok(Self::Work),
            "School" => Ok(Self::School),
            "Other" => Ok(Self::Other),
            other => Err(Error::validation(
                "label",
                format!("unknown address label '{other}'"),
            )),
        }
    }
}

/// Default condition for a donated item.
pub const DEFAULT_CONDITION: &str = "Good";

/// Suggested item conditions, best first.
pub const CONDITIONS: [&str; 4] = ["New", "Like New", "Good", "Fair"];

/// A donated item, pending or available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Units on hand
    pub quantity: u32,
    pub condition: String,
    pub image_url: Option<String>,
    /// False while a donation waits for review or an admin hides it
    pub is_available: bool,
    /// Set for donated items; `None` for items an admin added
    pub donor_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipping snapshot stored on a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSnapshot {
    pub name: String,
    pub phone: String,
    /// Contact email, taken from the session rather than the address record
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A request for an item, with the requester and shipping details frozen at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub id: i64,
    /// Identity id of the requester
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub item_name: String,
    pub category: Category,
    pub quantity: u32,
    pub description: String,
    /// Where the request is in its lifecycle
    pub status: RequestStatus,
    /// Note left by an admin when changing the status
    pub admin_notes: Option<String>,
    pub shipping: ShippingSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved address owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddress {
    pub id: i64,
    /// Owner
    pub user_id: String,
    pub label: AddressLabel,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    /// At most one address per owner is primary
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile attached to an identity. The contact fields are only used as a fallback
/// when the user has no saved addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Admins see the triage panel
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_field<T: FromStr<Err = Error>>(table: &'static str, raw: &str) -> Result<T> {
    raw.parse().map_err(|e: Error| Error::InvalidRow {
        table,
        message: e.to_string(),
    })
}

fn parse_quantity(table: &'static str, raw: i32) -> Result<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| Error::InvalidRow {
            table,
            message: format!("quantity must be positive, got {raw}"),
        })
}

impl TryFrom<donation_item::Model> for DonationItem {
    type Error = Error;

    fn try_from(row: donation_item::Model) -> Result<Self> {
        const TABLE: &str = "donation_items";
        Ok(Self {
            id: row.id,
            category: parse_field(TABLE, &row.category)?,
            quantity: parse_quantity(TABLE, row.quantity)?,
            name: row.name,
            description: row.description,
            condition: row.condition,
            image_url: row.image_url.filter(|url| !url.is_empty()),
            is_available: row.is_available,
            donor_id: row.donor_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<item_request::Model> for ItemRequest {
    type Error = Error;

    fn try_from(row: item_request::Model) -> Result<Self> {
        const TABLE: &str = "item_requests";
        Ok(Self {
            id: row.id,
            category: parse_field(TABLE, &row.category)?,
            status: parse_field(TABLE, &row.status)?,
            quantity: parse_quantity(TABLE, row.quantity)?,
            shipping: ShippingSnapshot {
                name: row.shipping_name,
                phone: row.shipping_phone,
                email: Some(row.user_email.clone()),
                address: row.shipping_address,
                city: row.shipping_city,
                state: row.shipping_state,
                zip: row.shipping_zip,
                country: row.shipping_country,
            },
            user_id: row.user_id,
            user_email: row.user_email,
            user_name: row.user_name,
            item_name: row.item_name,
            description: row.description,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<user_address::Model> for UserAddress {
    type Error = Error;

    fn try_from(row: user_address::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            label: parse_field("user_addresses", &row.label)?,
            user_id: row.user_id,
            name: row.name,
            phone: row.phone,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            is_primary: row.is_primary,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<user_profile::Model> for UserProfile {
    type Error = Error;

    fn try_from(row: user_profile::Model) -> Result<Self> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Ok(Self {
            role: parse_field("user_profiles", &row.role)?,
            id: row.id,
            email: row.email,
            name: row.name,
            phone: non_empty(row.phone),
            address: non_empty(row.address),
            city: non_empty(row.city),
            state: non_empty(row.state),
            zip_code: non_empty(row.zip_code),
            country: non_empty(row.country),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Parses a batch of rows, failing on the first invalid one.
pub(crate) fn parse_rows<M, T>(rows: Vec<M>) -> Result<Vec<T>>
where
    T: TryFrom<M, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn item_row(category: &str, quantity: i32) -> donation_item::Model {
        let now = Utc::now();
        donation_item::Model {
            id: 1,
            name: "Atlas".to_string(),
            description: "World atlas".to_string(),
            category: category.to_string(),
            quantity,
            condition: DEFAULT_CONDITION.to_string(),
            image_url: Some(String::new()),
            is_available: true,
            donor_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_row_parses() {
        let item = DonationItem::try_from(item_row("school_supplies", 2)).unwrap();
        assert_eq!(item.category, Category::SchoolSupplies);
        assert_eq!(item.quantity, 2);
        assert!(item.image_url.is_none());
    }

    #[test]
    fn test_unknown_category_fails_parse_boundary() {
        let err = DonationItem::try_from(item_row("crayons", 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRow {
                table: "donation_items",
                ..
            }
        ));
    }

    #[test]
    fn test_non_positive_quantity_fails_parse_boundary() {
        assert!(DonationItem::try_from(item_row("book", 0)).is_err());
        assert!(DonationItem::try_from(item_row("book", -3)).is_err());
    }

    #[test]
    fn test_status_transition_table() {
        use RequestStatus::{Approved, Fulfilled, Pending, Rejected};

        assert_eq!(Pending.next_statuses(), &[Approved, Rejected]);
        assert_eq!(Approved.next_statuses(), &[Fulfilled]);
        assert!(Rejected.next_statuses().is_empty());
        assert!(Fulfilled.next_statuses().is_empty());

        assert!(!Approved.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Fulfilled));
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }
}
