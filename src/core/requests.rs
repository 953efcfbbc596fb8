//! Item request data access.
//!
//! Requests are created pending and only move forward through the status table in
//! [`RequestStatus::next_statuses`]. The table is enforced here rather than left to
//! the admin screen: the write is conditional on the status it was read with, so a
//! concurrent change makes the second writer fail instead of overwriting.

use crate::{
    entities::{ItemRequest as RequestEntity, item_request},
    errors::{Error, Result},
    models::{Category, ItemRequest, RequestStatus, ShippingSnapshot, parse_rows},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// A request built by the submission wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    /// Identity id of the requester
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub item_name: String,
    pub category: Category,
    /// At least 1
    pub quantity: u32,
    /// Why the item is needed
    pub description: String,
    /// Where to send the item, copied by value
    pub shipping: ShippingSnapshot,
}

/// Inserts a pending request.
#[instrument(skip(db, request), fields(item = %request.item_name, user = %request.user_id))]
pub async fn create_request(db: &DatabaseConnection, request: NewRequest) -> Result<ItemRequest> {
    if request.item_name.trim().is_empty() {
        return Err(Error::validation("item name", "cannot be empty"));
    }
    if request.quantity == 0 {
        return Err(Error::validation("quantity", "must be at least 1"));
    }
    let quantity = i32::try_from(request.quantity)
        .map_err(|_| Error::validation("quantity", "is too large"))?;

    let now = chrono::Utc::now();
    let shipping = request.shipping;
    let row = item_request::ActiveModel {
        user_id: Set(request.user_id),
        user_email: Set(request.user_email),
        user_name: Set(request.user_name),
        item_name: Set(request.item_name.trim().to_string()),
        category: Set(request.category.as_str().to_string()),
        quantity: Set(quantity),
        description: Set(request.description.trim().to_string()),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        admin_notes: Set(None),
        shipping_name: Set(shipping.name),
        shipping_phone: Set(shipping.phone),
        shipping_address: Set(shipping.address),
        shipping_city: Set(shipping.city),
        shipping_state: Set(shipping.state),
        shipping_zip: Set(shipping.zip),
        shipping_country: Set(shipping.country),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Request {} created", row.id);
    ItemRequest::try_from(row)
}

/// Every request, newest first.
pub async fn list_all_requests(db: &DatabaseConnection) -> Result<Vec<ItemRequest>> {
    let rows = RequestEntity::find()
        .order_by_desc(item_request::Column::CreatedAt)
        .order_by_desc(item_request::Column::Id)
        .all(db)
        .await?;
    parse_rows(rows)
}

/// One user's requests, newest first.
pub async fn list_requests_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<ItemRequest>> {
    let rows = RequestEntity::find()
        .filter(item_request::Column::UserId.eq(user_id))
        .order_by_desc(item_request::Column::CreatedAt)
        .order_by_desc(item_request::Column::Id)
        .all(db)
        .await?;
    parse_rows(rows)
}

/// Finds a request by id.
pub async fn get_request(db: &DatabaseConnection, request_id: i64) -> Result<Option<ItemRequest>> {
    RequestEntity::find_by_id(request_id)
        .one(db)
        .await?
        .map(ItemRequest::try_from)
        .transpose()
}

/// Moves a request to `new_status`, optionally recording an admin note.
///
/// # Errors
/// - [`Error::NotFound`] if the request does not exist
/// - [`Error::InvalidTransition`] if the move is not in the status table, or the
///   status changed underneath this call
#[instrument(skip(db, admin_notes))]
pub async fn update_request_status(
    db: &DatabaseConnection,
    request_id: i64,
    new_status: RequestStatus,
    admin_notes: Option<String>,
) -> Result<ItemRequest> {
    let current = get_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("request", request_id))?;

    if !current.status.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            from: current.status,
            to: new_status,
        });
    }

    let mut update = RequestEntity::update_many()
        .col_expr(item_request::Column::Status, Expr::value(new_status.as_str()))
        .col_expr(
            item_request::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        );
    if let Some(note) = admin_notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        update = update.col_expr(item_request::Column::AdminNotes, Expr::value(note));
    }

    let result = update
        .filter(item_request::Column::Id.eq(request_id))
        .filter(item_request::Column::Status.eq(current.status.as_str()))
        .exec(db)
        .await?;

    let updated = get_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("request", request_id))?;

    if result.rows_affected == 0 {
        warn!(
            "Request {} changed to {} before it could move to {}",
            request_id, updated.status, new_status
        );
        return Err(Error::InvalidTransition {
            from: updated.status,
            to: new_status,
        });
    }

    info!("Request {} moved {} -> {}", request_id, current.status, new_status);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn request_row(status: RequestStatus) -> item_request::Model {
        let now = chrono::Utc::now();
        item_request::Model {
            id: 1,
            user_id: "u-1".to_string(),
            user_email: "u-1@example.com".to_string(),
            user_name: "Asha".to_string(),
            item_name: "Ruler".to_string(),
            category: Category::SchoolSupplies.as_str().to_string(),
            quantity: 1,
            description: "For geometry class".to_string(),
            status: status.as_str().to_string(),
            admin_notes: None,
            shipping_name: "Asha".to_string(),
            shipping_phone: "0770000000".to_string(),
            shipping_address: "12 Lake Rd".to_string(),
            shipping_city: "Colombo".to_string(),
            shipping_state: "Western".to_string(),
            shipping_zip: "00100".to_string(),
            shipping_country: "Sri Lanka".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_concurrent_status_change_loses_the_update() -> Result<()> {
        // Read as pending, but another admin rejected it before the conditional write
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([
                vec![request_row(RequestStatus::Pending)],
                vec![request_row(RequestStatus::Rejected)],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = update_request_status(&db, 1, RequestStatus::Approved, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition {
                from: RequestStatus::Rejected,
                to: RequestStatus::Approved
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_request_is_pending_with_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request(&db, test_request("u-1", "Math Textbook")).await?;

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.quantity, 1);
        assert_eq!(request.shipping.city, "Colombo");
        assert!(request.admin_notes.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_allowed_transitions() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request(&db, test_request("u-1", "Ruler")).await?;

        let approved =
            update_request_status(&db, request.id, RequestStatus::Approved, None).await?;
        assert_eq!(approved.status, RequestStatus::Approved);

        let fulfilled = update_request_status(
            &db,
            request.id,
            RequestStatus::Fulfilled,
            Some("Delivered Monday".to_string()),
        )
        .await?;
        assert_eq!(fulfilled.status, RequestStatus::Fulfilled);
        assert_eq!(fulfilled.admin_notes.as_deref(), Some("Delivered Monday"));
        Ok(())
    }

    #[tokio::test]
    async fn test_disallowed_transitions_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let request = create_request(&db, test_request("u-1", "Ruler")).await?;

        let result = update_request_status(&db, request.id, RequestStatus::Fulfilled, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition {
                from: RequestStatus::Pending,
                to: RequestStatus::Fulfilled
            }
        ));

        update_request_status(&db, request.id, RequestStatus::Rejected, None).await?;
        let result = update_request_status(&db, request.id, RequestStatus::Approved, None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidTransition { .. }));

        let stored = get_request(&db, request.id).await?.unwrap();
        assert_eq!(stored.status, RequestStatus::Rejected);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_request() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_request_status(&db, 99, RequestStatus::Approved, None).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_requests_for_user() -> Result<()> {
        let db = setup_test_db().await?;
        create_request(&db, test_request("u-1", "Ruler")).await?;
        create_request(&db, test_request("u-2", "Atlas")).await?;
        let newest = create_request(&db, test_request("u-1", "Compass")).await?;

        let mine = list_requests_for_user(&db, "u-1").await?;
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newest.id);
        assert_eq!(list_all_requests(&db).await?.len(), 3);
        Ok(())
    }
}
