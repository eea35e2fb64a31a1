//! [`Predicate`] definitions.

#[cfg(doc)]
use crate::domain::property::{Description, Location, Rent};
use crate::domain::{
    landlord,
    property::{County, HouseType, Town},
    Property,
};

use super::{Filter, Scope};

/// Conjunction of [`Condition`]s a listed [`Property`] must satisfy.
///
/// Always starts with the [`Scope`] condition, and can only be narrowed
/// further, so no [`Filter`] is able to reveal a [`Property`] outside of the
/// [`Scope`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Predicate {
    /// [`Condition`]s of this [`Predicate`], the [`Scope`] one being the
    /// first.
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Creates a new [`Predicate`] constrained by the provided [`Scope`] only.
    #[must_use]
    pub fn scoped(scope: Scope) -> Self {
        Self {
            conditions: vec![scope.condition()],
        }
    }

    /// Narrows this [`Predicate`] with the values of the provided [`Filter`].
    #[must_use]
    pub fn and(mut self, filter: Filter) -> Self {
        let Filter {
            q,
            min_rent,
            max_rent,
            county,
            town,
            location,
            house_type,
            available,
        } = filter;

        self.conditions.extend(
            [
                q.map(|needle| Condition::MatchesText {
                    house_types: HouseType::containing(&needle),
                    needle,
                }),
                min_rent.map(Condition::RentAtLeast),
                max_rent.map(Condition::RentAtMost),
                county.map(Condition::CountyIs),
                town.map(Condition::TownIs),
                location.map(Condition::LocationContains),
                house_type.map(Condition::HouseTypeIs),
                available.map(Condition::Available),
            ]
            .into_iter()
            .flatten(),
        );
        self
    }

    /// Returns the [`Condition`]s of this [`Predicate`].
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Checks whether the provided [`Property`] satisfies this [`Predicate`].
    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        self.conditions.iter().all(|c| c.matches(property))
    }
}

/// Single constraint of a [`Predicate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    /// [`Property`] availability equals the value.
    Available(bool),

    /// [`Property`] is owned by the [`landlord::Id`].
    OwnedBy(landlord::Id),

    /// [`Description`] or [`Location`] contains the `needle`, or the
    /// [`HouseType`] is one of the `house_types` whose code or label contains
    /// it.
    MatchesText {
        /// Text to search for, case-insensitively.
        needle: String,

        /// [`HouseType`]s mentioning the `needle`.
        house_types: Vec<HouseType>,
    },

    /// [`Rent`] is not less than the amount.
    RentAtLeast(i64),

    /// [`Rent`] is not greater than the amount.
    RentAtMost(i64),

    /// [`County`] equals the value, case-insensitively.
    CountyIs(County),

    /// [`Town`] equals the value, case-insensitively.
    TownIs(Town),

    /// [`Location`] contains the text, case-insensitively.
    LocationContains(String),

    /// [`HouseType`] equals the value.
    HouseTypeIs(HouseType),
}

impl Condition {
    /// Checks whether the provided [`Property`] satisfies this [`Condition`].
    #[must_use]
    pub fn matches(&self, p: &Property) -> bool {
        match self {
            Self::Available(v) => p.available == *v,
            Self::OwnedBy(id) => p.landlord_id == *id,
            Self::MatchesText {
                needle,
                house_types,
            } => {
                contains(p.description.as_ref(), needle)
                    || contains(p.location.as_ref(), needle)
                    || house_types.contains(&p.house_type)
            }
            Self::RentAtLeast(min) => i64::from(i32::from(p.rent)) >= *min,
            Self::RentAtMost(max) => i64::from(i32::from(p.rent)) <= *max,
            Self::CountyIs(c) => eq(p.county.as_ref(), c.as_ref()),
            Self::TownIs(t) => eq(p.town.as_ref(), t.as_ref()),
            Self::LocationContains(l) => contains(p.location.as_ref(), l),
            Self::HouseTypeIs(t) => p.house_type == *t,
        }
    }
}

/// Case-insensitive substring check.
fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality check.
fn eq(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod spec {
    use common::DateTimeOf;
    use proptest::prelude::*;

    use crate::{
        domain::{
            landlord,
            property::{self, County, HouseType, Location, Rent, Town},
            Property,
        },
        read::property::{Filter, RawFilter, Scope},
    };

    use super::{Condition, Predicate};

    fn listing(
        landlord_id: landlord::Id,
        county: &str,
        town: &str,
        rent: i32,
        available: bool,
    ) -> Property {
        Property {
            id: property::Id::new(),
            landlord_id,
            house_type: HouseType::Bedsitter,
            house_number: property::HouseNumber::new("B4").unwrap(),
            rent: Rent::new(rent).unwrap(),
            county: County::new(county).unwrap(),
            town: Town::new(town).unwrap(),
            location: Location::new("Near the Stage").unwrap(),
            description: "Quiet compound with a garden".into(),
            available,
            created_at: DateTimeOf::now(),
        }
    }

    #[test]
    fn scope_goes_first() {
        let owner = landlord::Id::new();
        let predicate = Predicate::scoped(Scope::Owner(owner)).and(Filter {
            available: Some(true),
            ..Filter::default()
        });

        assert_eq!(
            predicate.conditions(),
            [Condition::OwnedBy(owner), Condition::Available(true)],
        );
    }

    #[test]
    fn seeded_tenant_browse() {
        let owner = landlord::Id::new();
        let kasarani = listing(owner, "Nairobi", "Kasarani", 5000, true);
        let westlands = listing(owner, "Nairobi", "Westlands", 15000, false);

        let predicate = Predicate::scoped(Scope::Public).and(Filter::parse(
            &RawFilter {
                county: Some("nairobi".into()),
                min_rent: Some("4000".into()),
                max_rent: Some("10000".into()),
                ..RawFilter::default()
            },
        ));

        assert!(predicate.matches(&kasarani));
        assert!(!predicate.matches(&westlands));
    }

    #[test]
    fn text_matches_house_type_labels() {
        let p = listing(landlord::Id::new(), "Kiambu", "Ruaka", 9000, true);
        let by = |q: &str| {
            Predicate::scoped(Scope::Public).and(Filter {
                q: Some(q.into()),
                ..Filter::default()
            })
        };

        assert!(by("GARDEN").matches(&p));
        assert!(by("stage").matches(&p));
        assert!(by("bedsit").matches(&p));
        assert!(!by("penthouse").matches(&p));
    }

    #[test]
    fn unknown_rent_is_ignored() {
        let with = Filter::parse(&RawFilter {
            min_rent: Some("abc".into()),
            ..RawFilter::default()
        });

        assert_eq!(
            Predicate::scoped(Scope::Public).and(with),
            Predicate::scoped(Scope::Public).and(Filter::default()),
        );
    }

    #[test]
    fn rent_beyond_any_stored_matches_nothing() {
        let p = listing(landlord::Id::new(), "Nairobi", "Kasarani", 5000, true);
        let by = |min: &str, max: &str| {
            Predicate::scoped(Scope::Public).and(Filter::parse(&RawFilter {
                min_rent: Some(min.into()),
                max_rent: Some(max.into()),
                ..RawFilter::default()
            }))
        };

        assert!(!by("99999999999", "").matches(&p));
        assert!(!by(&"9".repeat(30), "").matches(&p));
        assert!(by("0", "99999999999").matches(&p));
        assert!(by("5000", &"9".repeat(30)).matches(&p));
    }

    fn raw_value() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            "[a-zA-Z ]{0,8}".prop_map(Some),
            (0..20_000_i32).prop_map(|n| Some(n.to_string())),
            Just(Some("99999999999".to_owned())),
            prop::sample::select(vec!["nairobi", " Kisumu", "1BR", "true", "no"])
                .prop_map(|s| Some(s.to_owned())),
        ]
    }

    prop_compose! {
        fn raw_filter()(
            q in raw_value(),
            min_rent in raw_value(),
            max_rent in raw_value(),
            county in raw_value(),
            town in raw_value(),
            location in raw_value(),
            house_type in raw_value(),
            available in raw_value(),
        ) -> RawFilter {
            RawFilter {
                q,
                min_rent,
                max_rent,
                county,
                town,
                location,
                house_type,
                available,
            }
        }
    }

    proptest! {
        #[test]
        fn filters_never_widen_scope(
            raw in raw_filter(),
            rents in prop::collection::vec(0..20_000_i32, 1..12),
        ) {
            let mine = landlord::Id::new();
            let theirs = landlord::Id::new();
            let properties = rents
                .iter()
                .enumerate()
                .map(|(i, rent)| {
                    let owner = if i % 2 == 0 { mine } else { theirs };
                    let county = if i % 3 == 0 { "Nairobi" } else { "Kisumu" };
                    listing(owner, county, "Kasarani", *rent, i % 4 != 0)
                })
                .collect::<Vec<_>>();

            for scope in [Scope::Public, Scope::Owner(mine)] {
                let base = Predicate::scoped(scope);
                let narrowed = base.clone().and(Filter::parse(&raw));
                for p in &properties {
                    prop_assert!(!narrowed.matches(p) || base.matches(p));
                }
            }
        }
    }
}
