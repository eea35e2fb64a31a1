//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{
    domain::property::Town, query, read::property::View, Query as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";

    /// Lists `Property`s from the provided [`View`].
    async fn list(
        view: View,
        filter: Option<api::property::Filter>,
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::property::list::Listing, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(query::ListProperties {
                principal,
                view,
                filter: filter.unwrap_or_default().into(),
                page: page.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Property` with the specified ID along with its images.
    ///
    /// A `Property` that is not open for renting is only visible to its
    /// owner.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` doesn't exist or is not
    ///                           visible to the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "property",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(query::PropertyDetail {
                principal,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches a page of the public catalog of `Property`s open for renting.
    ///
    /// Pages hold 10 `Property`s, newest first. Page numbers out of range
    /// resolve to the nearest existing page.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "properties",
            otel.name = Self::SPAN_NAME,
            page = ?page,
        ),
    )]
    pub async fn properties(
        filter: Option<api::property::Filter>,
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::property::list::Listing, Error> {
        Self::list(View::Catalog, filter, page, ctx).await
    }

    /// Fetches a page of `Property`s open for renting, as browsed from a
    /// `User` profile.
    ///
    /// Pages hold 6 `Property`s, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "browseProperties",
            otel.name = Self::SPAN_NAME,
            page = ?page,
        ),
    )]
    pub async fn browse_properties(
        filter: Option<api::property::Filter>,
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::property::list::Listing, Error> {
        Self::list(View::Browse, filter, page, ctx).await
    }

    /// Fetches a page of `Property`s owned by the current `User`, whether
    /// open for renting or not.
    ///
    /// Pages hold 6 `Property`s, newest first. Counties and towns to narrow
    /// the list by are the ones of the owned `Property`s only.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "myProperties",
            otel.name = Self::SPAN_NAME,
            page = ?page,
        ),
    )]
    pub async fn my_properties(
        filter: Option<api::property::Filter>,
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::property::list::Listing, Error> {
        Self::list(View::Mine, filter, page, ctx).await
    }

    /// Lists distinct towns having `Property`s in the provided county,
    /// sorted alphabetically.
    ///
    /// All the towns are listed if no county is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            county = ?county,
            gql.name = "towns",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn towns(
        county: Option<String>,
        ctx: &Context,
    ) -> Result<Vec<api::property::Town>, Error> {
        ctx.service()
            .execute(query::towns::ForCounty::by(
                service::read::property::facets::Towns::in_county(
                    county.as_deref(),
                ),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|towns: Vec<Town>| towns.into_iter().map(Into::into).collect())
    }

    /// Lists `Property`s bookmarked by the current `User`, most recently
    /// bookmarked first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myFavorites",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_favorites(
        ctx: &Context,
    ) -> Result<Vec<api::Property>, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(query::favorites::MyFavorites { principal })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the overview of the `Property`s owned by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "landlordDashboard",
            otel.name = Self::SPAN_NAME,
            page = ?page,
        ),
    )]
    pub async fn landlord_dashboard(
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::property::list::Dashboard, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(query::Dashboard {
                principal,
                page: page.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for query::properties::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
        }
    }
}

impl AsError for query::property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(PropertyError::NotExists.into())
            }
        }
    }
}

impl AsError for query::favorites::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
        }
    }
}

impl AsError for query::dashboard::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
