//! [`Query`] resolving a [`Principal`].

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::{user, Landlord, Principal, Tenant},
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] resolving the [`Principal`] of an authorized [`Session`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolvePrincipal {
    /// ID of the authenticated [`User`](crate::domain::User), if any.
    pub user_id: Option<user::Id>,
}

impl<Db, St> Query<ResolvePrincipal> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Landlord>, user::Id>>,
            Ok = Option<Landlord>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, user::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Principal;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: ResolvePrincipal,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(user_id) = query.user_id else {
            return Ok(Principal::Anonymous);
        };

        let landlord = self
            .database()
            .execute(Select(By::<Option<Landlord>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?;
        if let Some(l) = landlord {
            return Ok(Principal::Landlord {
                user_id,
                profile: l.id,
            });
        }

        let tenant = self
            .database()
            .execute(Select(By::<Option<Tenant>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Principal::Tenant {
            user_id,
            profile: tenant.map(|t| t.id),
        })
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{user, Landlord, Principal, Tenant},
        infra::Database as _,
        test_support::{service, user},
        Query as _,
    };

    use super::ResolvePrincipal;

    #[tokio::test]
    async fn anonymous_without_session() {
        let svc = service();

        let principal =
            svc.execute(ResolvePrincipal::default()).await.unwrap();

        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn profile_decides_the_role() {
        let svc = service();
        let u = user(&svc, user::Role::Tenant).await;
        let query = ResolvePrincipal { user_id: Some(u.id) };

        assert_eq!(
            svc.execute(query).await.unwrap(),
            Principal::Tenant {
                user_id: u.id,
                profile: None,
            },
        );

        let tenant = Tenant::new(u.id);
        svc.database().execute(Insert(tenant)).await.unwrap();
        assert_eq!(
            svc.execute(query).await.unwrap(),
            Principal::Tenant {
                user_id: u.id,
                profile: Some(tenant.id),
            },
        );

        let landlord = Landlord::new(u.id);
        svc.database().execute(Insert(landlord)).await.unwrap();
        assert_eq!(
            svc.execute(query).await.unwrap(),
            Principal::Landlord {
                user_id: u.id,
                profile: landlord.id,
            },
        );
    }
}
