//! [`Property`]-related read definitions.
//!
//! [`Property`]: crate::domain::Property

pub mod facets;
pub mod list;
pub mod predicate;
pub mod scope;

pub use self::{
    list::{Filter, RawFilter},
    predicate::{Condition, Predicate},
    scope::{Scope, View},
};
