//! Facets narrowing a [`Property`] list.
//!
//! [`Property`]: crate::domain::Property

use crate::domain::{landlord, property::County};
#[cfg(doc)]
use crate::domain::{property::Town, Landlord, Property};

/// Selector of distinct [`Town`]s having at least one [`Property`].
///
/// [`Town`]s are returned sorted alphabetically.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Towns {
    /// [`Landlord`] whose [`Property`]s are only considered, if any.
    pub owner: Option<landlord::Id>,

    /// [`County`] the [`Town`]s are located in, if any.
    pub county: Option<County>,
}

impl Towns {
    /// Creates a new [`Towns`] selector of the provided raw `county` input.
    ///
    /// An empty `county` selects [`Town`]s of every [`County`].
    #[must_use]
    pub fn in_county(county: Option<&str>) -> Self {
        Self {
            owner: None,
            county: county.and_then(County::searched),
        }
    }

    /// Restricts this [`Towns`] selector to [`Property`]s of the provided
    /// [`Landlord`].
    #[must_use]
    pub fn owned_by(mut self, owner: landlord::Id) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Selector of distinct [`County`]s having at least one [`Property`] of the
/// [`Landlord`].
///
/// [`County`]s are returned sorted alphabetically.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OwnCounties(pub landlord::Id);

/// Counters of [`Property`]s owned by a [`Landlord`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Total number of owned [`Property`]s.
    pub total: usize,

    /// Number of owned [`Property`]s open for renting.
    pub available: usize,
}

#[cfg(test)]
mod spec {
    use crate::domain::property::County;

    use super::Towns;

    #[test]
    fn county_input_is_normalized() {
        assert_eq!(
            Towns::in_county(Some("nairobi ")),
            Towns::in_county(Some("Nairobi")),
        );
        assert_eq!(
            Towns::in_county(Some("nairobi ")).county,
            County::new("Nairobi"),
        );
        assert_eq!(Towns::in_county(Some("  ")), Towns::default());
        assert_eq!(Towns::in_county(None), Towns::default());
    }
}
