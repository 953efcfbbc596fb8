//! Admin triage: donation approval, request status changes and catalog upkeep.
//!
//! Every operation takes the caller's [`SessionState`] and checks the admin role before
//! touching the store. The check keeps non-admins away from the actions; it is not an
//! access policy.
//!
//! Mutations report back as a [`Notification`]. Store failures are logged where they
//! happen and shown as one short per-action message.

use crate::{
    core::{
        items::{self, NewCatalogItem},
        requests,
        wizard::Notification,
    },
    errors::{Error, Result},
    models::{DonationItem, ItemRequest, RequestStatus},
    session::SessionState,
};
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Explicit user confirmation for irreversible operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The admin confirmed the action
    Confirmed,
    /// No confirmation was given
    Unconfirmed,
}

impl Confirmation {
    /// Ok only when confirmed.
    pub const fn require(self) -> Result<()> {
        match self {
            Self::Confirmed => Ok(()),
            Self::Unconfirmed => Err(Error::ConfirmationRequired),
        }
    }
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Status actions an admin is offered for a request in `status`.
#[must_use]
pub const fn offered_actions(status: RequestStatus) -> &'static [RequestStatus] {
    status.next_statuses()
}

/// Everything the admin panel shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDashboard {
    /// All requests, newest first
    pub requests: Vec<ItemRequest>,
    /// Donations waiting for review, newest first
    pub pending_donations: Vec<DonationItem>,
    /// Items visible in the catalog, newest first
    pub available_items: Vec<DonationItem>,
}

impl AdminDashboard {
    /// Loads the three admin lists.
    #[instrument(skip_all)]
    pub async fn load(db: &DatabaseConnection, session: &SessionState) -> Result<Self> {
        session.require_admin()?;
        let dashboard = Self {
            requests: requests::list_all_requests(db).await?,
            pending_donations: items::list_pending(db).await?,
            available_items: items::list_available(db).await?,
        };
        info!(
            "Admin dashboard: {} requests ({} pending), {} donations to review",
            dashboard.requests.len(),
            dashboard.pending_count(),
            dashboard.pending_donations.len()
        );
        Ok(dashboard)
    }

    /// Requests still waiting for a decision.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count()
    }
}

/// Turns the outcome of a store write into the notification the admin sees.
///
/// Local failures (role, confirmation, status table) come back as `Err` for the caller
/// to show inline. Store failures are logged here and collapse into `failure`.
fn notify<T>(
    action: &'static str,
    outcome: Result<T>,
    success: impl FnOnce(&T) -> String,
    failure: &'static str,
) -> Result<Notification> {
    match outcome {
        Ok(value) => Ok(Notification::success(success(&value))),
        Err(e) if e.is_local() => Err(e),
        Err(e) => {
            error!("Error trying to {}: {}", action, e);
            Ok(Notification::error(failure))
        }
    }
}

/// Publishes a pending donation.
#[instrument(skip(db, session))]
pub async fn approve_donation(
    db: &DatabaseConnection,
    session: &SessionState,
    item_id: i64,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "approve donation",
        items::approve_donation(db, item_id).await,
        |_| "Donation approved and now visible!".to_string(),
        "Failed to approve donation",
    )
}

/// Deletes a pending donation.
#[instrument(skip(db, session))]
pub async fn reject_donation(
    db: &DatabaseConnection,
    session: &SessionState,
    item_id: i64,
    confirmation: Confirmation,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "reject donation",
        items::reject_donation(db, item_id, confirmation).await,
        |_| "Donation rejected".to_string(),
        "Failed to reject donation",
    )
}

/// Moves a request along the status table.
#[instrument(skip(db, session, admin_notes))]
pub async fn update_request_status(
    db: &DatabaseConnection,
    session: &SessionState,
    request_id: i64,
    new_status: RequestStatus,
    admin_notes: Option<String>,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "update request",
        requests::update_request_status(db, request_id, new_status, admin_notes).await,
        |request: &ItemRequest| format!("Request {}!", request.status),
        "Failed to update request",
    )
}

/// Adds an item straight to the catalog.
#[instrument(skip(db, session, item), fields(name = %item.name))]
pub async fn add_catalog_item(
    db: &DatabaseConnection,
    session: &SessionState,
    item: NewCatalogItem,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "add item",
        items::add_catalog_item(db, item).await,
        |_| "Item added successfully!".to_string(),
        "Failed to add item",
    )
}

/// Shows or hides a catalog item.
#[instrument(skip(db, session))]
pub async fn toggle_item_availability(
    db: &DatabaseConnection,
    session: &SessionState,
    item_id: i64,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "update item",
        items::toggle_item_availability(db, item_id).await,
        |item: &DonationItem| {
            if item.is_available {
                "Item enabled".to_string()
            } else {
                "Item disabled".to_string()
            }
        },
        "Failed to update item",
    )
}

/// Deletes a catalog item.
#[instrument(skip(db, session))]
pub async fn delete_item(
    db: &DatabaseConnection,
    session: &SessionState,
    item_id: i64,
    confirmation: Confirmation,
) -> Result<Notification> {
    session.require_admin()?;
    notify(
        "delete item",
        items::delete_item(db, item_id, confirmation).await,
        |_| "Item deleted".to_string(),
        "Failed to delete item",
    )
}
