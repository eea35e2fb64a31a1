//! [`Property`] definitions.

pub mod image;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::landlord;
#[cfg(doc)]
use crate::domain::Landlord;

pub use self::image::Image;

/// Rental property listed by a [`Landlord`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the [`Landlord`] owning this [`Property`].
    pub landlord_id: landlord::Id,

    /// [`HouseType`] of this [`Property`].
    pub house_type: HouseType,

    /// [`HouseNumber`] of this [`Property`].
    pub house_number: HouseNumber,

    /// Monthly [`Rent`] of this [`Property`].
    pub rent: Rent,

    /// [`County`] this [`Property`] is located in.
    pub county: County,

    /// [`Town`] this [`Property`] is located in.
    pub town: Town,

    /// [`Location`] of this [`Property`] within its [`Town`].
    pub location: Location,

    /// Free-form [`Description`] of this [`Property`].
    pub description: Description,

    /// Indicator whether this [`Property`] is open for renting.
    pub available: bool,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
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

define_kind! {
    #[doc = "Type of a [`Property`]."]
    enum HouseType {
        #[doc = "Single room."]
        Single = 1,

        #[doc = "Bedsitter."]
        Bedsitter = 2,

        #[doc = "One-bedroom apartment."]
        OneBedroom = 3,

        #[doc = "Two-bedroom apartment."]
        TwoBedroom = 4,

        #[doc = "Three-bedroom apartment."]
        ThreeBedroom = 5,

        #[doc = "Unit shared with other tenants."]
        Shared = 6,
    }
}

impl HouseType {
    /// Returns the short code of this [`HouseType`] (e.g. `1BR`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Bedsitter => "bedsitter",
            Self::OneBedroom => "1BR",
            Self::TwoBedroom => "2BR",
            Self::ThreeBedroom => "3BR",
            Self::Shared => "shared",
        }
    }

    /// Returns the human-readable label of this [`HouseType`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single Room",
            Self::Bedsitter => "Bedsitter",
            Self::OneBedroom => "One Bedroom",
            Self::TwoBedroom => "Two Bedroom",
            Self::ThreeBedroom => "Three Bedroom",
            Self::Shared => "Shared Unit",
        }
    }

    /// Parses a [`HouseType`] from its code, label or variant name, ignoring
    /// the case and surrounding whitespace.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.iter().copied().find(|t| {
            t.code().eq_ignore_ascii_case(input)
                || t.label().eq_ignore_ascii_case(input)
                || t.to_string().eq_ignore_ascii_case(input)
        })
    }

    /// Returns all the [`HouseType`]s whose code or label contains the
    /// provided `needle`, ignoring the case.
    #[must_use]
    pub fn containing(needle: &str) -> Vec<Self> {
        let needle = needle.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .filter(|t| {
                t.code().to_lowercase().contains(&needle)
                    || t.label().to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Number of a house or unit, as written on its door.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct HouseNumber(String);

impl HouseNumber {
    /// Creates a new [`HouseNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        let number = number.trim();
        (!number.is_empty() && number.chars().count() <= 20)
            .then(|| Self(number.to_owned()))
    }
}

impl FromStr for HouseNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `HouseNumber`")
    }
}

/// Monthly rent of a [`Property`] in whole Kenyan shillings.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Rent(i32);

impl Rent {
    /// Creates a new [`Rent`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: i32) -> Option<Self> {
        (amount >= 0).then_some(Self(amount))
    }

    /// Parses a [`Rent`] from a raw user input.
    ///
    /// [`None`] is returned for anything but a non-negative integer.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse().ok().and_then(Self::new)
    }
}

impl FromStr for Rent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or("invalid `Rent`")
    }
}

/// County a [`Property`] is located in, stored title-cased.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct County(String);

impl County {
    /// Creates a new [`County`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `county` is normalized.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(county: impl Into<String>) -> Self {
        Self(county.into())
    }

    /// Normalizes the given `county` into a [`County`].
    ///
    /// [`None`] is returned if nothing but whitespace is provided.
    #[must_use]
    pub fn new(county: impl AsRef<str>) -> Option<Self> {
        normalize(county.as_ref())
            .filter(|c| c.chars().count() <= MAX_PLACE_LEN)
            .map(Self)
    }

    /// Normalizes the given `county` to be searched for.
    ///
    /// Unlike [`County::new()`], the length is not limited, so the result may
    /// match no stored [`County`] at all.
    #[must_use]
    pub fn searched(county: impl AsRef<str>) -> Option<Self> {
        normalize(county.as_ref()).map(Self)
    }

    /// Indicates whether this [`County`] is one of the [`COUNTIES`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        COUNTIES.iter().any(|c| c.eq_ignore_ascii_case(&self.0))
    }

    /// Returns all the [`COUNTIES`] in their declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        COUNTIES.iter().map(|c| Self((*c).to_owned()))
    }
}

impl FromStr for County {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `County`")
    }
}

/// Town a [`Property`] is located in, stored title-cased.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Town(String);

impl Town {
    /// Normalizes the given `town` into a [`Town`].
    ///
    /// [`None`] is returned if nothing but whitespace is provided.
    #[must_use]
    pub fn new(town: impl AsRef<str>) -> Option<Self> {
        normalize(town.as_ref())
            .filter(|t| t.chars().count() <= MAX_PLACE_LEN)
            .map(Self)
    }

    /// Normalizes the given `town` to be searched for.
    ///
    /// Unlike [`Town::new()`], the length is not limited.
    #[must_use]
    pub fn searched(town: impl AsRef<str>) -> Option<Self> {
        normalize(town.as_ref()).map(Self)
    }
}

impl FromStr for Town {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Town`")
    }
}

/// Location of a [`Property`] within its [`Town`] (estate, street, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        let location = location.trim();
        (!location.is_empty() && location.chars().count() <= MAX_PLACE_LEN)
            .then(|| Self(location.to_owned()))
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Free-form description of a [`Property`], possibly empty.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, From, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(&str, String)]
pub struct Description(String);

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// Maximum length of a [`County`], [`Town`] or [`Location`].
const MAX_PLACE_LEN: usize = 255;

/// Trims the provided `input` and converts it into a title case.
///
/// A letter is capitalized when it starts a word, where words are separated
/// by whitespace or hyphens. Apostrophes don't start a new word, so
/// `murang'a` becomes `Murang'a`.
fn normalize(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(input.len());
    let mut word_start = true;
    for c in input.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = c.is_whitespace() || c == '-';
    }
    Some(out)
}

/// Counties of Kenya, in their official numbering order.
pub const COUNTIES: &[&str] = &[
    "Mombasa",
    "Kwale",
    "Kilifi",
    "Tana River",
    "Lamu",
    "Taita-Taveta",
    "Garissa",
    "Wajir",
    "Mandera",
    "Marsabit",
    "Isiolo",
    "Meru",
    "Tharaka-Nithi",
    "Embu",
    "Kitui",
    "Machakos",
    "Makueni",
    "Nyandarua",
    "Nyeri",
    "Kirinyaga",
    "Murang'a",
    "Kiambu",
    "Turkana",
    "West Pokot",
    "Samburu",
    "Trans Nzoia",
    "Uasin Gishu",
    "Elgeyo-Marakwet",
    "Nandi",
    "Baringo",
    "Laikipia",
    "Nakuru",
    "Narok",
    "Kajiado",
    "Kericho",
    "Bomet",
    "Kakamega",
    "Vihiga",
    "Bungoma",
    "Busia",
    "Siaya",
    "Kisumu",
    "Homa Bay",
    "Migori",
    "Kisii",
    "Nyamira",
    "Nairobi",
];

#[cfg(test)]
mod spec {
    use super::{County, HouseNumber, HouseType, Rent, Town, COUNTIES};

    #[test]
    fn county_is_trimmed_and_title_cased() {
        assert_eq!(County::new(" nairobi ").unwrap().to_string(), "Nairobi");
        assert_eq!(County::new("HOMA bay").unwrap().to_string(), "Homa Bay");
        assert_eq!(
            County::new("elgeyo-marakwet").unwrap().to_string(),
            "Elgeyo-Marakwet",
        );
        assert_eq!(County::new("MURANG'A").unwrap().to_string(), "Murang'a");
        assert!(County::new("   ").is_none());
    }

    #[test]
    fn every_listed_county_is_normalized() {
        assert_eq!(COUNTIES.len(), 47);
        for c in COUNTIES {
            let county = County::new(c).unwrap();
            assert_eq!(county.to_string(), *c);
            assert!(county.is_known());
        }
    }

    #[test]
    fn unknown_county_is_detected() {
        assert!(!County::new("Gotham").unwrap().is_known());
    }

    #[test]
    fn town_is_normalized() {
        assert_eq!(Town::new("  kasarani\t").unwrap().to_string(), "Kasarani");
        assert_eq!(Town::new("ruaka town").unwrap().to_string(), "Ruaka Town");
    }

    #[test]
    fn rent_rejects_garbage() {
        assert_eq!(Rent::parse(" 5000 "), Rent::new(5000));
        assert!(Rent::parse("abc").is_none());
        assert!(Rent::parse("-1").is_none());
        assert!(Rent::parse("12.5").is_none());
        assert!(Rent::parse("99999999999").is_none());
    }

    #[test]
    fn searched_place_is_not_length_limited() {
        let long = "x".repeat(300);

        assert!(County::new(&long).is_none());
        assert!(Town::new(&long).is_none());
        assert_eq!(County::searched(&long).unwrap().to_string().len(), 300);
        assert_eq!(Town::searched(&long).unwrap().to_string().len(), 300);
        assert!(County::searched(" ").is_none());
    }

    #[test]
    fn house_number_is_bounded() {
        assert!(HouseNumber::new("A-12").is_some());
        assert!(HouseNumber::new(" ").is_none());
        assert!(HouseNumber::new("1".repeat(21)).is_none());
    }

    #[test]
    fn house_type_parses_any_spelling() {
        assert_eq!(HouseType::parse("1BR"), Some(HouseType::OneBedroom));
        assert_eq!(HouseType::parse("1br"), Some(HouseType::OneBedroom));
        assert_eq!(HouseType::parse("ONE_BEDROOM"), Some(HouseType::OneBedroom));
        assert_eq!(HouseType::parse("shared unit"), Some(HouseType::Shared));
        assert_eq!(HouseType::parse("penthouse"), None);
    }

    #[test]
    fn house_type_containing_matches_codes_and_labels() {
        assert_eq!(
            HouseType::containing("bedroom"),
            [
                HouseType::OneBedroom,
                HouseType::TwoBedroom,
                HouseType::ThreeBedroom,
            ],
        );
        assert_eq!(HouseType::containing("2br"), [HouseType::TwoBedroom]);
        assert_eq!(
            HouseType::containing("room"),
            [
                HouseType::Single,
                HouseType::OneBedroom,
                HouseType::TwoBedroom,
                HouseType::ThreeBedroom,
            ],
        );
        assert!(HouseType::containing("villa").is_empty());
    }
}
