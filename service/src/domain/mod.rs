//! Domain definitions.

pub mod favorite;
pub mod landlord;
pub mod principal;
pub mod property;
pub mod tenant;
pub mod user;

pub use self::{
    favorite::Favorite, landlord::Landlord, principal::Principal,
    property::Property, tenant::Tenant, user::User,
};
