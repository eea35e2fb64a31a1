//! [`Tenant`] profile definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Profile of a [`User`] browsing listings.
///
/// Created on signup or lazily, on the first bookmarked favorite.
#[derive(Clone, Copy, Debug)]
pub struct Tenant {
    /// ID of this [`Tenant`] profile.
    pub id: Id,

    /// ID of the [`User`] this profile belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Tenant`] profile was created.
    pub created_at: CreationDateTime,
}

impl Tenant {
    /// Creates a new [`Tenant`] profile for the provided [`User`].
    #[must_use]
    pub fn new(user_id: user::Id) -> Self {
        Self {
            id: Id::new(),
            user_id,
            created_at: DateTimeOf::now(),
        }
    }
}

/// ID of a [`Tenant`] profile.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
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

/// [`DateTime`] when a [`Tenant`] profile was created.
pub type CreationDateTime = DateTimeOf<(Tenant, unit::Creation)>;
