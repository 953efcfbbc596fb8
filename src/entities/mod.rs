//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the store tables one to one. Callers never see them directly;
//! rows are parsed into [`crate::models`] values first.

pub mod donation_item;
pub mod item_request;
pub mod user_address;
pub mod user_profile;

pub use donation_item::{
    Column as DonationItemColumn, Entity as DonationItem, Model as DonationItemModel,
};
pub use item_request::{
    Column as ItemRequestColumn, Entity as ItemRequest, Model as ItemRequestModel,
};
pub use user_address::{
    Column as UserAddressColumn, Entity as UserAddress, Model as UserAddressModel,
};
pub use user_profile::{
    Column as UserProfileColumn, Entity as UserProfile, Model as UserProfileModel,
};
