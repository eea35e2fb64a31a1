//! GraphQL API definitions.

mod mutation;
pub mod property;
mod query;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    mutation::Mutation, property::Property, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
