//! [`Query`] of a [`Landlord`] dashboard.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Landlord, Property};
use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        Principal,
    },
    infra::{database, Database},
    read::property::{facets, list, Predicate, Scope, View},
    Service,
};

use super::Query;

/// [`Query`] of a [`Landlord`] dashboard: [`Property`] counters and the
/// latest own [`Property`]s.
#[derive(Clone, Copy, Debug)]
pub struct Dashboard {
    /// [`Principal`] requesting the dashboard.
    pub principal: Principal,

    /// Requested page number, the first one if [`None`].
    pub page: Option<i64>,
}

/// Output of [`Dashboard`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Counters of own [`Property`]s.
    pub stats: facets::Stats,

    /// Page of own [`Property`]s, newest first.
    pub page: list::Page,
}

impl<Db, St> Query<Dashboard> for Service<Db, St>
where
    Db: Database<
            Select<By<facets::Stats, landlord::Id>>,
            Ok = facets::Stats,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Dashboard) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Dashboard { principal, page } = query;

        principal
            .authorize(Operation::ViewDashboard)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let stats = self
            .database()
            .execute(Select(By::new(owner)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let page = self
            .database()
            .execute(Select(By::new(list::Selector {
                arguments: list::Arguments::new(page, View::Mine.per_page()),
                filter: Predicate::scoped(Scope::Owner(owner)),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { stats, page })
    }
}

/// Error of [`Dashboard`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not view the dashboard.
    #[display("`Principal` is not allowed to view the dashboard: {_0}")]
    Denied(Denial),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::principal::Denial,
        test_support::{landlord, service, tenant, Listing},
        Query as _,
    };

    use super::{Dashboard, ExecutionError};

    #[tokio::test]
    async fn counts_own_listings_only() {
        let svc = service();
        let me = landlord(&svc).await;
        let other = landlord(&svc).await;
        _ = Listing::of(&me, 3).store(&svc).await;
        _ = Listing::of(&me, 2).unavailable().store(&svc).await;
        let newest = Listing::of(&me, 1).store(&svc).await;
        _ = Listing::of(&other, 0).store(&svc).await;

        let out = svc
            .execute(Dashboard {
                principal: me,
                page: None,
            })
            .await
            .unwrap();

        assert_eq!(out.stats.total, 3);
        assert_eq!(out.stats.available, 2);
        assert_eq!(out.page.items.len(), 3);
        assert_eq!(out.page.items[0], newest);
    }

    #[tokio::test]
    async fn tenant_is_denied() {
        let svc = service();

        let err = svc
            .execute(Dashboard {
                principal: tenant(&svc).await,
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
