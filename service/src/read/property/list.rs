//! [`Property`] list definitions.

use std::num::NonZeroUsize;

use common::define_pagination;

#[cfg(doc)]
use crate::domain::property::Rent;
use crate::domain::{
    property::{County, HouseType, Town},
    Property,
};

use super::Predicate;

define_pagination!(Property, Predicate);

/// Number of [`Property`]s on a single page of a profile dashboard (tenant or
/// landlord browsing, own listings).
#[expect(unsafe_code, reason = "invariants are preserved")]
// SAFETY: `6` is not zero.
pub const BROWSE_PAGE_SIZE: NonZeroUsize =
    unsafe { NonZeroUsize::new_unchecked(6) };

/// Number of [`Property`]s on a single page of the public catalog.
#[expect(unsafe_code, reason = "invariants are preserved")]
// SAFETY: `10` is not zero.
pub const CATALOG_PAGE_SIZE: NonZeroUsize =
    unsafe { NonZeroUsize::new_unchecked(10) };

/// Filter values exactly as received from a client.
///
/// Every value is optional and is parsed forgivingly by [`Filter::parse()`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawFilter {
    /// Free text to search in descriptions, locations and house types.
    pub q: Option<String>,

    /// Inclusive lower bound of a [`Rent`].
    pub min_rent: Option<String>,

    /// Inclusive upper bound of a [`Rent`].
    pub max_rent: Option<String>,

    /// [`County`] to match.
    pub county: Option<String>,

    /// [`Town`] to match.
    pub town: Option<String>,

    /// Part of a location to search for.
    pub location: Option<String>,

    /// [`HouseType`] to match.
    pub house_type: Option<String>,

    /// Availability to match.
    pub available: Option<String>,
}

/// Typed [`Property`] list filter.
///
/// [`None`] fields don't constrain anything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    /// Free text to search in descriptions, locations and house types.
    pub q: Option<String>,

    /// Inclusive lower bound of a [`Rent`], in whole Kenyan shillings.
    pub min_rent: Option<i64>,

    /// Inclusive upper bound of a [`Rent`], in whole Kenyan shillings.
    pub max_rent: Option<i64>,

    /// [`County`] to match.
    pub county: Option<County>,

    /// [`Town`] to match.
    pub town: Option<Town>,

    /// Part of a location to search for.
    pub location: Option<String>,

    /// [`HouseType`] to match.
    pub house_type: Option<HouseType>,

    /// Availability to match.
    pub available: Option<bool>,
}

impl Filter {
    /// Parses the provided [`RawFilter`].
    ///
    /// Empty, malformed or unknown values are dropped rather than reported:
    /// a filter that can't be understood doesn't narrow the result.
    #[must_use]
    pub fn parse(raw: &RawFilter) -> Self {
        let RawFilter {
            q,
            min_rent,
            max_rent,
            county,
            town,
            location,
            house_type,
            available,
        } = raw;

        Self {
            q: non_empty(q.as_deref()).map(ToOwned::to_owned),
            min_rent: non_empty(min_rent.as_deref()).and_then(parse_amount),
            max_rent: non_empty(max_rent.as_deref()).and_then(parse_amount),
            county: county.as_deref().and_then(County::searched),
            town: town.as_deref().and_then(Town::searched),
            location: non_empty(location.as_deref()).map(ToOwned::to_owned),
            house_type: non_empty(house_type.as_deref())
                .and_then(HouseType::parse),
            available: non_empty(available.as_deref()).and_then(parse_bool),
        }
    }
}

impl From<RawFilter> for Filter {
    fn from(raw: RawFilter) -> Self {
        Self::parse(&raw)
    }
}

/// Trims the provided `input` and drops it if nothing remains.
fn non_empty(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a non-negative amount of money.
///
/// Amounts too large to be represented saturate to [`i64::MAX`].
fn parse_amount(input: &str) -> Option<i64> {
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok().or_else(|| (!input.is_empty()).then_some(i64::MAX))
}

/// Parses a checkbox-like boolean value.
fn parse_bool(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::property::{County, HouseType, Town};

    use super::{Filter, RawFilter};

    #[test]
    fn parses_well_formed_values() {
        let filter = Filter::parse(&RawFilter {
            q: Some(" garden ".into()),
            min_rent: Some("4000".into()),
            max_rent: Some("10000".into()),
            county: Some("nairobi ".into()),
            town: Some("KASARANI".into()),
            location: Some("Mwiki".into()),
            house_type: Some("1BR".into()),
            available: Some("on".into()),
        });

        assert_eq!(
            filter,
            Filter {
                q: Some("garden".into()),
                min_rent: Some(4000),
                max_rent: Some(10000),
                county: County::new("Nairobi"),
                town: Town::new("Kasarani"),
                location: Some("Mwiki".into()),
                house_type: Some(HouseType::OneBedroom),
                available: Some(true),
            },
        );
    }

    #[test]
    fn drops_malformed_values() {
        let filter = Filter::parse(&RawFilter {
            q: Some("   ".into()),
            min_rent: Some("abc".into()),
            max_rent: Some("-5".into()),
            county: Some(String::new()),
            town: Some("\t".into()),
            location: Some(String::new()),
            house_type: Some("castle".into()),
            available: Some("maybe".into()),
        });

        assert_eq!(filter, Filter::default());
    }

    #[test]
    fn huge_rent_saturates() {
        let filter = Filter::parse(&RawFilter {
            min_rent: Some("99999999999".into()),
            max_rent: Some("9".repeat(40)),
            ..RawFilter::default()
        });

        assert_eq!(filter.min_rent, Some(99_999_999_999));
        assert_eq!(filter.max_rent, Some(i64::MAX));
    }

    #[test]
    fn overlong_place_is_kept() {
        let filter = Filter::parse(&RawFilter {
            county: Some("x".repeat(300)),
            town: Some("y".repeat(300)),
            ..RawFilter::default()
        });

        assert_eq!(
            filter.county.map(|c| c.to_string().len()),
            Some(300),
        );
        assert_eq!(filter.town.map(|t| t.to_string().len()), Some(300));
    }
}
