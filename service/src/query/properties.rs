//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::{
        principal::Denial,
        property::{County, Town},
        Principal,
    },
    infra::{database, Database},
    read::property::{
        facets, list, Filter, Predicate, RawFilter, Scope, View,
    },
    Service,
};

use super::Query;

/// [`Query`] of a [`Property`] list page along with its facets.
#[derive(Clone, Debug)]
pub struct ListProperties {
    /// [`Principal`] requesting the list.
    pub principal: Principal,

    /// [`View`] the list is requested from.
    pub view: View,

    /// Filter values as provided by the client.
    pub filter: RawFilter,

    /// Requested page number, the first one if [`None`].
    pub page: Option<i64>,
}

/// Output of [`ListProperties`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Resolved [`list::Page`] of matching [`Property`]s.
    pub page: list::Page,

    /// [`County`]s to choose from for further narrowing.
    pub counties: Vec<County>,

    /// [`Town`]s of the filtered [`County`] to choose from.
    pub towns: Vec<Town>,
}

impl<Db, St> Query<ListProperties> for Service<Db, St>
where
    Db: Database<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Town>, facets::Towns>>,
            Ok = Vec<Town>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<County>, facets::OwnCounties>>,
            Ok = Vec<County>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ListProperties,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ListProperties {
            principal,
            view,
            filter,
            page,
        } = query;

        let scope = view
            .scope(&principal)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut towns = facets::Towns::in_county(filter.county.as_deref());
        let counties = match scope {
            Scope::Public => County::all().collect(),
            Scope::Owner(owner) => {
                towns = towns.owned_by(owner);
                self.database()
                    .execute(Select(By::new(facets::OwnCounties(owner))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
            }
        };
        let towns = self
            .database()
            .execute(Select(By::new(towns)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let selector = list::Selector {
            arguments: list::Arguments::new(page, view.per_page()),
            filter: Predicate::scoped(scope).and(Filter::parse(&filter)),
        };
        let page = self
            .database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            page,
            counties,
            towns,
        })
    }
}

/// Error of [`ListProperties`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not request the [`View`].
    #[display("`Principal` is not allowed to list properties: {_0}")]
    Denied(Denial),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{principal::Denial, Principal},
        query::properties::ExecutionError,
        read::property::{RawFilter, View},
        test_support::{landlord, service, tenant, Listing, TestService},
        Query as _,
    };

    use super::{ListProperties, Output};

    async fn list(
        svc: &TestService,
        principal: Principal,
        view: View,
        filter: RawFilter,
    ) -> Output {
        svc.execute(ListProperties {
            principal,
            view,
            filter,
            page: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn tenant_browse_applies_rent_and_county() {
        let svc = service();
        let owner = landlord(&svc).await;
        let kasarani = Listing::of(&owner, 10)
            .at("Nairobi", "Kasarani")
            .rent(5000)
            .store(&svc)
            .await;
        _ = Listing::of(&owner, 5)
            .at("Nairobi", "Westlands")
            .rent(15000)
            .unavailable()
            .store(&svc)
            .await;

        let out = list(
            &svc,
            tenant(&svc).await,
            View::Browse,
            RawFilter {
                county: Some("nairobi".into()),
                min_rent: Some("4000".into()),
                max_rent: Some("10000".into()),
                ..RawFilter::default()
            },
        )
        .await;

        assert_eq!(out.page.items, [kasarani]);
        assert_eq!(out.page.window.total, 1);
    }

    #[tokio::test]
    async fn malformed_rent_is_same_as_absent() {
        let svc = service();
        let owner = landlord(&svc).await;
        for (age, rent) in [(3, 1000), (2, 5000), (1, 20000)] {
            _ = Listing::of(&owner, age).rent(rent).store(&svc).await;
        }
        let viewer = tenant(&svc).await;

        let malformed = list(
            &svc,
            viewer,
            View::Catalog,
            RawFilter {
                min_rent: Some("abc".into()),
                ..RawFilter::default()
            },
        )
        .await;
        let absent =
            list(&svc, viewer, View::Catalog, RawFilter::default()).await;

        assert_eq!(malformed.page.items, absent.page.items);
        assert_eq!(absent.page.items.len(), 3);
    }

    #[tokio::test]
    async fn huge_rent_bounds_saturate() {
        let svc = service();
        let owner = landlord(&svc).await;
        let listed = Listing::of(&owner, 1).rent(5000).store(&svc).await;
        let viewer = tenant(&svc).await;

        let above = list(
            &svc,
            viewer,
            View::Browse,
            RawFilter {
                min_rent: Some("99999999999".into()),
                ..RawFilter::default()
            },
        )
        .await;
        let below = list(
            &svc,
            viewer,
            View::Browse,
            RawFilter {
                max_rent: Some("99999999999".into()),
                ..RawFilter::default()
            },
        )
        .await;

        assert!(above.page.items.is_empty());
        assert_eq!(below.page.items, [listed]);
    }

    #[tokio::test]
    async fn overlong_county_matches_nothing() {
        let svc = service();
        let owner = landlord(&svc).await;
        _ = Listing::of(&owner, 1).store(&svc).await;

        let out = list(
            &svc,
            tenant(&svc).await,
            View::Browse,
            RawFilter {
                county: Some("x".repeat(300)),
                ..RawFilter::default()
            },
        )
        .await;

        assert!(out.page.items.is_empty());
        assert_eq!(out.page.window.total, 0);
    }

    #[tokio::test]
    async fn towns_ignore_county_case_and_whitespace() {
        let svc = service();
        let owner = landlord(&svc).await;
        for (age, town) in [(3, "Westlands"), (2, "kasarani"), (1, "Karen")] {
            _ = Listing::of(&owner, age)
                .at("Nairobi", town)
                .store(&svc)
                .await;
        }
        _ = Listing::of(&owner, 0).at("Mombasa", "Nyali").store(&svc).await;

        let sloppy = list(
            &svc,
            Principal::Anonymous,
            View::Catalog,
            RawFilter {
                county: Some("nairobi ".into()),
                ..RawFilter::default()
            },
        )
        .await;
        let exact = list(
            &svc,
            Principal::Anonymous,
            View::Catalog,
            RawFilter {
                county: Some("Nairobi".into()),
                ..RawFilter::default()
            },
        )
        .await;

        assert_eq!(sloppy.towns, exact.towns);
        assert_eq!(
            exact.towns.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["Karen", "Kasarani", "Westlands"],
        );
        assert_eq!(exact.counties.len(), 47);
    }

    #[tokio::test]
    async fn landlord_sees_only_own_listings_including_unavailable() {
        let svc = service();
        let me = landlord(&svc).await;
        let other = landlord(&svc).await;
        let hidden = Listing::of(&me, 2)
            .at("Kisumu", "Milimani")
            .unavailable()
            .store(&svc)
            .await;
        let open = Listing::of(&me, 1).store(&svc).await;
        _ = Listing::of(&other, 0).at("Kisumu", "Kondele").store(&svc).await;

        let out = list(
            &svc,
            me,
            View::Mine,
            RawFilter {
                // Other landlord's county must not widen anything.
                county: Some("kisumu".into()),
                ..RawFilter::default()
            },
        )
        .await;
        assert_eq!(out.page.items, [hidden.clone()]);
        assert_eq!(
            out.towns.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["Milimani"],
        );
        assert_eq!(
            out.counties.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["Kisumu", "Nairobi"],
        );

        let all = list(&svc, me, View::Mine, RawFilter::default()).await;
        assert_eq!(all.page.items, [open, hidden]);
    }

    #[tokio::test]
    async fn landlord_browses_public_catalog() {
        let svc = service();
        let me = landlord(&svc).await;
        let other = landlord(&svc).await;
        _ = Listing::of(&me, 1).unavailable().store(&svc).await;
        let theirs = Listing::of(&other, 0).store(&svc).await;

        let out = list(&svc, me, View::Browse, RawFilter::default()).await;

        assert_eq!(out.page.items, [theirs]);
    }

    #[tokio::test]
    async fn out_of_range_page_resolves_to_last() {
        let svc = service();
        let owner = landlord(&svc).await;
        for age in 0..8 {
            _ = Listing::of(&owner, age).store(&svc).await;
        }

        let out = svc
            .execute(ListProperties {
                principal: tenant(&svc).await,
                view: View::Browse,
                filter: RawFilter::default(),
                page: Some(42),
            })
            .await
            .unwrap();

        assert_eq!(out.page.window.number, 2);
        assert_eq!(out.page.window.num_pages, 2);
        assert_eq!(out.page.items.len(), 2);
    }

    #[tokio::test]
    async fn denies_by_role() {
        let svc = service();

        let err = svc
            .execute(ListProperties {
                principal: Principal::Anonymous,
                view: View::Browse,
                filter: RawFilter::default(),
                page: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Denied(Denial::AuthenticationRequired),
        ));

        let err = svc
            .execute(ListProperties {
                principal: tenant(&svc).await,
                view: View::Mine,
                filter: RawFilter::default(),
                page: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Denied(Denial::InsufficientRole),
        ));
    }
}
