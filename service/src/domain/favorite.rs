//! [`Favorite`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Landlord, Property, Tenant};
use crate::domain::{landlord, property, tenant};

/// Bookmark of a [`Property`] made by a profile.
///
/// Tenants and landlords keep their bookmarks in separate namespaces, and a
/// single [`Owner`] can bookmark a [`Property`] only once.
#[derive(Clone, Copy, Debug)]
pub struct Favorite {
    /// ID of this [`Favorite`].
    pub id: Id,

    /// [`Owner`] of this [`Favorite`].
    pub owner: Owner,

    /// ID of the bookmarked [`Property`].
    pub property_id: property::Id,

    /// [`DateTime`] when this [`Favorite`] was created.
    pub created_at: CreationDateTime,
}

impl Favorite {
    /// Creates a new [`Favorite`] of the provided [`Owner`].
    #[must_use]
    pub fn new(owner: Owner, property_id: property::Id) -> Self {
        Self {
            id: Id::new(),
            owner,
            property_id,
            created_at: DateTimeOf::now(),
        }
    }
}

/// ID of a [`Favorite`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Profile owning a [`Favorite`].
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, PartialEq)]
pub enum Owner {
    /// [`Tenant`] profile.
    #[display("Tenant({_0})")]
    Tenant(tenant::Id),

    /// [`Landlord`] profile.
    #[display("Landlord({_0})")]
    Landlord(landlord::Id),
}

/// [`DateTime`] when a [`Favorite`] was created.
pub type CreationDateTime = DateTimeOf<(Favorite, unit::Creation)>;
