//! Core logic - framework-agnostic data access, address resolution, and the
//! submission wizard.

/// Saved address data access with the single-primary invariant
pub mod addresses;
/// Admin triage operations
pub mod admin;
/// Donation item data access
pub mod items;
/// Browse and filter the available catalog
pub mod listing;
/// User profile data access
pub mod profiles;
/// Item request data access and status transitions
pub mod requests;
/// Resolution of the effective shipping/contact identity
pub mod shipping;
/// Review summaries and donor contact footers
pub mod summary;
/// Multi-step submission wizard
pub mod wizard;
