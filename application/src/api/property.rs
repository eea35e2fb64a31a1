//! [`Property`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::{command, domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// A rental property.
#[derive(Clone, Debug)]
pub struct Property {
    /// Underlying [`domain::Property`].
    property: domain::Property,

    /// [`domain::property::Image`]s of this [`Property`].
    images: OnceCell<Vec<domain::property::Image>>,
}

impl From<domain::Property> for Property {
    fn from(property: domain::Property) -> Self {
        Self {
            property,
            images: OnceCell::new(),
        }
    }
}

impl From<query::property::Output> for Property {
    fn from(output: query::property::Output) -> Self {
        let query::property::Output { property, images } = output;
        Self {
            property,
            images: OnceCell::new_with(Some(images)),
        }
    }
}

/// A rental property listed by a landlord.
#[graphql_object(context = Context)]
impl Property {
    /// Unique identifier of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.property.id.into()
    }

    /// Type of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.houseType",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn house_type(&self) -> HouseType {
        self.property.house_type.into()
    }

    /// Human-readable label of this `Property` type (e.g. `One Bedroom`).
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.houseTypeLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn house_type_label(&self) -> &'static str {
        self.property.house_type.label()
    }

    /// Number of this `Property`, as written on its door.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.houseNumber",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn house_number(&self) -> HouseNumber {
        self.property.house_number.clone().into()
    }

    /// Monthly rent of this `Property` in Kenyan shillings.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.rent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rent(&self) -> i32 {
        self.property.rent.into()
    }

    /// County this `Property` is located in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.county",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn county(&self) -> County {
        self.property.county.clone().into()
    }

    /// Town this `Property` is located in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.town",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn town(&self) -> Town {
        self.property.town.clone().into()
    }

    /// Location of this `Property` within its town.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn location(&self) -> Location {
        self.property.location.clone().into()
    }

    /// Free-form description of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn description(&self) -> &str {
        self.property.description.as_ref()
    }

    /// Indicator whether this `Property` is open for renting.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.available",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn available(&self) -> bool {
        self.property.available
    }

    /// Indicator whether this `Property` is owned by the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.isMine",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_mine(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(ctx.principal().await?.landlord_id()
            == Some(self.property.landlord_id))
    }

    /// Indicator whether this `Property` is bookmarked by the current `User`.
    ///
    /// Always `false` for an anonymous caller.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.isFavorite",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_favorite(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(ctx.favorite_ids().await?.contains(&self.property.id))
    }

    /// Photos of this `Property`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.images",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn images(&self, ctx: &Context) -> Result<Vec<Image>, Error> {
        let id = self.property.id;
        Ok(self
            .images
            .get_or_try_init(|| async {
                ctx.service()
                    .execute(query::property::Images::by(id))
                    .await
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
            })
            .await?
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// `DateTime` when this `Property` was listed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.property.created_at.coerce()
    }
}

/// A photo of a [`Property`].
#[derive(Clone, Debug, From, Into)]
pub struct Image(domain::property::Image);

/// A photo of a `Property`.
#[graphql_object(name = "PropertyImage", context = Context)]
impl Image {
    /// Unique identifier of this `PropertyImage`.
    pub fn id(&self) -> ImageId {
        self.0.id.into()
    }

    /// URL this `PropertyImage` is served under.
    pub fn url(&self, ctx: &Context) -> String {
        ctx.media_url().of(&self.0.file)
    }

    /// `DateTime` when this `PropertyImage` was uploaded.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Property`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property::Id)]
#[into(domain::property::Id)]
#[graphql(name = "PropertyId", transparent)]
pub struct Id(Uuid);

/// Unique identifier of a `PropertyImage`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property::image::Id)]
#[into(domain::property::image::Id)]
#[graphql(name = "PropertyImageId", transparent)]
pub struct ImageId(Uuid);

/// Number of a `Property`, as written on its door.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyHouseNumber",
    with = scalar::Via::<domain::property::HouseNumber>,
)]
pub struct HouseNumber(domain::property::HouseNumber);

/// County of a `Property`.
///
/// Trimmed and title-cased on input.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyCounty",
    with = scalar::Via::<domain::property::County>,
)]
pub struct County(domain::property::County);

/// Town of a `Property`.
///
/// Trimmed and title-cased on input.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyTown",
    with = scalar::Via::<domain::property::Town>,
)]
pub struct Town(domain::property::Town);

/// Location of a `Property` within its town.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyLocation",
    with = scalar::Via::<domain::property::Location>,
)]
pub struct Location(domain::property::Location);

/// Type of a `Property`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PropertyHouseType")]
pub enum HouseType {
    /// Single room.
    Single,

    /// Bedsitter.
    Bedsitter,

    /// One-bedroom apartment.
    OneBedroom,

    /// Two-bedroom apartment.
    TwoBedroom,

    /// Three-bedroom apartment.
    ThreeBedroom,

    /// Unit shared with other tenants.
    Shared,
}

impl From<domain::property::HouseType> for HouseType {
    fn from(kind: domain::property::HouseType) -> Self {
        use domain::property::HouseType as T;

        match kind {
            T::Single => Self::Single,
            T::Bedsitter => Self::Bedsitter,
            T::OneBedroom => Self::OneBedroom,
            T::TwoBedroom => Self::TwoBedroom,
            T::ThreeBedroom => Self::ThreeBedroom,
            T::Shared => Self::Shared,
        }
    }
}

impl From<HouseType> for domain::property::HouseType {
    fn from(kind: HouseType) -> Self {
        match kind {
            HouseType::Single => Self::Single,
            HouseType::Bedsitter => Self::Bedsitter,
            HouseType::OneBedroom => Self::OneBedroom,
            HouseType::TwoBedroom => Self::TwoBedroom,
            HouseType::ThreeBedroom => Self::ThreeBedroom,
            HouseType::Shared => Self::Shared,
        }
    }
}

/// Filter of a `Property` list.
///
/// Values are taken as typed by a user: empty, malformed or unknown ones
/// don't narrow the list.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PropertyFilter")]
pub struct Filter {
    /// Text to search in descriptions, locations and house types.
    pub q: Option<String>,

    /// Minimal monthly rent, inclusive.
    pub min_rent: Option<String>,

    /// Maximal monthly rent, inclusive.
    pub max_rent: Option<String>,

    /// County to match, in any case.
    pub county: Option<String>,

    /// Town to match, in any case.
    pub town: Option<String>,

    /// Part of a location to search for.
    pub location: Option<String>,

    /// House type to match: a code (`1BR`), a label (`One Bedroom`) or an
    /// enum value (`ONE_BEDROOM`).
    pub house_type: Option<String>,

    /// Availability to match (`true`/`false`, `yes`/`no`, `1`/`0`).
    pub available: Option<String>,
}

impl From<Filter> for read::property::RawFilter {
    fn from(filter: Filter) -> Self {
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
        Self {
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

/// Details of a `Property` being listed or edited.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "PropertyInput")]
pub struct Input {
    /// Type of the `Property`.
    pub house_type: HouseType,

    /// Number of the `Property`, as written on its door.
    pub house_number: HouseNumber,

    /// Monthly rent of the `Property` in Kenyan shillings, not negative.
    pub rent: i32,

    /// County of the `Property`, one of the 47 counties of Kenya.
    pub county: County,

    /// Town of the `Property`.
    pub town: Town,

    /// Location of the `Property` within its town.
    pub location: Location,

    /// Free-form description of the `Property`.
    pub description: Option<String>,

    /// Indicator whether the `Property` is open for renting.
    ///
    /// `true` if omitted.
    pub available: Option<bool>,
}

impl TryFrom<Input> for command::create_property::Fields {
    type Error = Error;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        let Input {
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
        } = input;
        Ok(Self {
            house_type: house_type.into(),
            house_number: house_number.into(),
            rent: domain::property::Rent::new(rent)
                .ok_or_else(|| Error::from(PropertyError::NegativeRent))?,
            county: county.into(),
            town: town.into(),
            location: location.into(),
            description: description.unwrap_or_default().into(),
            available: available.unwrap_or(true),
        })
    }
}

pub mod list {
    //! Definitions related to [`Property`] lists.

    use derive_more::{From, Into};
    use juniper::graphql_object;
    use service::{query, read};

    use super::{County, Property, Town};
    use crate::{AsError, Context, Error};

    /// Page of [`Property`]s.
    #[derive(Clone, Debug, From, Into)]
    pub struct Page(read::property::list::Page);

    /// Page of `Property`s, newest first.
    #[graphql_object(name = "PropertyPage", context = Context)]
    impl Page {
        /// `Property`s on this `PropertyPage`.
        #[must_use]
        pub fn items(&self) -> Vec<Property> {
            self.0.items.iter().cloned().map(Into::into).collect()
        }

        /// Information about this `PropertyPage`.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo(self.0.page_info())
        }
    }

    /// Information about a [`Page`].
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo(read::property::list::PageInfo);

    /// Information about a `PropertyPage`.
    #[graphql_object(name = "PropertyPageInfo", context = Context)]
    impl PageInfo {
        /// Number of the page, starting from `1`.
        pub fn number(&self) -> Result<i32, Error> {
            i32::try_from(self.0.number).map_err(AsError::into_error)
        }

        /// Total number of pages, at least `1`.
        pub fn num_pages(&self) -> Result<i32, Error> {
            i32::try_from(self.0.num_pages).map_err(AsError::into_error)
        }

        /// Total number of `Property`s across all the pages.
        pub fn total_count(&self) -> Result<i32, Error> {
            i32::try_from(self.0.total_count).map_err(AsError::into_error)
        }

        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.0.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.0.has_previous_page
        }
    }

    /// [`Page`] of [`Property`]s along with values to narrow it further by.
    #[derive(Clone, Debug, From, Into)]
    pub struct Listing(query::properties::Output);

    /// Page of `Property`s along with values to narrow it further by.
    #[graphql_object(name = "PropertyListing", context = Context)]
    impl Listing {
        /// Page of the matching `Property`s.
        #[must_use]
        pub fn page(&self) -> Page {
            self.0.page.clone().into()
        }

        /// Counties to choose from.
        #[must_use]
        pub fn counties(&self) -> Vec<County> {
            self.0.counties.iter().cloned().map(Into::into).collect()
        }

        /// Towns of the filtered county to choose from.
        #[must_use]
        pub fn towns(&self) -> Vec<Town> {
            self.0.towns.iter().cloned().map(Into::into).collect()
        }
    }

    /// Overview of the [`Property`]s owned by a landlord.
    #[derive(Clone, Debug, From, Into)]
    pub struct Dashboard(query::dashboard::Output);

    /// Overview of the `Property`s owned by a landlord.
    #[graphql_object(name = "LandlordDashboard", context = Context)]
    impl Dashboard {
        /// Total number of owned `Property`s.
        pub fn total(&self) -> Result<i32, Error> {
            i32::try_from(self.0.stats.total).map_err(AsError::into_error)
        }

        /// Number of owned `Property`s open for renting.
        pub fn available(&self) -> Result<i32, Error> {
            i32::try_from(self.0.stats.available).map_err(AsError::into_error)
        }

        /// Page of owned `Property`s, newest first.
        #[must_use]
        pub fn page(&self) -> Page {
            self.0.page.clone().into()
        }
    }
}

/// Result of toggling a favorite `Property`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "FavoriteToggle")]
pub enum Toggled {
    /// `Property` has been bookmarked.
    Added,

    /// `Property` has been un-bookmarked.
    Removed,
}

impl From<command::toggle_favorite::Toggled> for Toggled {
    fn from(toggled: command::toggle_favorite::Toggled) -> Self {
        use command::toggle_favorite::Toggled as T;

        match toggled {
            T::Added => Self::Added,
            T::Removed => Self::Removed,
        }
    }
}

define_error! {
    enum PropertyError {
        #[code = "NEGATIVE_RENT"]
        #[status = BAD_REQUEST]
        #[message = "`rent` must not be negative"]
        NegativeRent,
    }
}

#[cfg(test)]
mod spec {
    use service::{command::create_property::Fields, domain, read};

    use super::{Filter, HouseType, Input};

    fn input(rent: i32) -> Input {
        Input {
            house_type: HouseType::OneBedroom,
            house_number: domain::property::HouseNumber::new("B12")
                .unwrap()
                .into(),
            rent,
            county: domain::property::County::new("nairobi").unwrap().into(),
            town: domain::property::Town::new("kasarani").unwrap().into(),
            location: domain::property::Location::new("Mwiki")
                .unwrap()
                .into(),
            description: None,
            available: None,
        }
    }

    #[test]
    fn input_defaults_to_available() {
        let fields = Fields::try_from(input(7500)).unwrap();

        assert!(fields.available);
        assert_eq!(fields.description.to_string(), "");
        assert_eq!(fields.rent, domain::property::Rent::new(7500).unwrap());
        assert_eq!(
            fields.house_type,
            domain::property::HouseType::OneBedroom,
        );
        assert_eq!(fields.county.to_string(), "Nairobi");
    }

    #[test]
    fn negative_rent_is_rejected() {
        let err = Fields::try_from(input(-1)).unwrap_err();

        assert_eq!(err.code, "NEGATIVE_RENT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn filter_is_passed_as_typed() {
        let raw = read::property::RawFilter::from(Filter {
            min_rent: Some("abc".to_owned()),
            county: Some("nairobi ".to_owned()),
            ..Filter::default()
        });

        assert_eq!(raw.min_rent.as_deref(), Some("abc"));
        assert_eq!(raw.county.as_deref(), Some("nairobi "));
        assert_eq!(raw.q, None);
    }
}
