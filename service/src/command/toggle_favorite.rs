//! [`Command`] for toggling a [`Favorite`].

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        favorite,
        principal::{Denial, Operation},
        property, user, Favorite, Principal, Property, Tenant,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for bookmarking a [`Property`], or removing the bookmark if it
/// exists already.
#[derive(Clone, Copy, Debug)]
pub struct ToggleFavorite {
    /// [`Principal`] toggling the [`Favorite`].
    pub principal: Principal,

    /// ID of the [`Property`] to toggle.
    pub property_id: property::Id,
}

/// Outcome of [`ToggleFavorite`] [`Command`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Toggled {
    /// [`Favorite`] has been added.
    #[display("added")]
    Added,

    /// [`Favorite`] has been removed.
    #[display("removed")]
    Removed,
}

impl<Db, St> Command<ToggleFavorite> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Tenant>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Tenant>, user::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Favorite, (favorite::Owner, property::Id)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Favorite>, Ok = bool, Err = Traced<database::Error>>,
{
    type Ok = Toggled;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleFavorite {
            principal,
            property_id,
        } = cmd;

        principal
            .authorize(Operation::ToggleFavorite)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if property.is_none() {
            return Err(tracerr::new!(E::PropertyNotExists(property_id)));
        }

        let owner = if let Some(owner) = principal.favorite_owner() {
            owner
        } else {
            // Tenant profile is created on the first bookmark.
            let user_id = principal
                .user_id()
                .ok_or(Denial::AuthenticationRequired)
                .map_err(tracerr::from_and_wrap!(=> E))?;
            self.database()
                .execute(Insert(Tenant::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            self.database()
                .execute(Select(By::<Option<Tenant>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .map(|t| favorite::Owner::Tenant(t.id))
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?
        };

        let removed = self
            .database()
            .execute(Delete(By::<Favorite, _>::new((owner, property_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if removed {
            return Ok(Toggled::Removed);
        }

        // Not inserted means a concurrent toggle has added it already.
        _ = self
            .database()
            .execute(Insert(Favorite::new(owner, property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        Ok(Toggled::Added)
    }
}

/// Error of [`ToggleFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not toggle favorites.
    #[display("`Principal` cannot toggle favorites: {_0}")]
    Denied(Denial),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`User`] of the [`Principal`] doesn't exist.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use crate::{
        domain::{principal::Denial, Principal},
        query::favorites::{FavoriteIds, MyFavorites},
        test_support::{landlord, resolve, service, tenant, user, Listing},
        Command as _, Query as _,
    };

    use super::{ExecutionError, ToggleFavorite, Toggled};

    #[tokio::test]
    async fn toggles_back_and_forth() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;
        let cmd = ToggleFavorite {
            principal: tenant(&svc).await,
            property_id: property.id,
        };

        assert_eq!(svc.execute(cmd).await.unwrap(), Toggled::Added);
        assert_eq!(svc.database().counts().favorites, 1);
        assert_eq!(svc.execute(cmd).await.unwrap(), Toggled::Removed);
        assert_eq!(svc.database().counts().favorites, 0);
    }

    #[tokio::test]
    async fn creates_tenant_profile_lazily() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;
        let u = user(&svc, crate::domain::user::Role::Tenant).await;
        let principal = resolve(&svc, u.id).await;
        assert_eq!(principal.favorite_owner(), None);

        let toggled = svc
            .execute(ToggleFavorite {
                principal,
                property_id: property.id,
            })
            .await
            .unwrap();

        assert_eq!(toggled, Toggled::Added);
        let principal = resolve(&svc, u.id).await;
        assert!(principal.favorite_owner().is_some());
        let favorites =
            svc.execute(MyFavorites { principal }).await.unwrap();
        assert_eq!(favorites, [property.clone()]);
        assert_eq!(
            svc.execute(FavoriteIds { principal }).await.unwrap(),
            HashSet::from([property.id]),
        );
    }

    #[tokio::test]
    async fn namespaces_are_separate() {
        let svc = service();
        let owner = landlord(&svc).await;
        let fan = tenant(&svc).await;
        let older = Listing::of(&owner, 1).store(&svc).await;
        let newer = Listing::of(&owner, 0).store(&svc).await;

        for (principal, property) in [(owner, &older), (fan, &newer)] {
            _ = svc
                .execute(ToggleFavorite {
                    principal,
                    property_id: property.id,
                })
                .await
                .unwrap();
        }

        assert_eq!(
            svc.execute(MyFavorites { principal: owner }).await.unwrap(),
            [older],
        );
        assert_eq!(
            svc.execute(MyFavorites { principal: fan }).await.unwrap(),
            [newer],
        );
    }

    #[tokio::test]
    async fn anonymous_changes_nothing() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;

        let err = svc
            .execute(ToggleFavorite {
                principal: Principal::Anonymous,
                property_id: property.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Denied(Denial::AuthenticationRequired),
        ));
        assert_eq!(svc.database().counts().favorites, 0);
    }

    #[tokio::test]
    async fn missing_property_is_not_found() {
        let svc = service();
        let missing = crate::domain::property::Id::new();

        let err = svc
            .execute(ToggleFavorite {
                principal: tenant(&svc).await,
                property_id: missing,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == missing,
        ));
    }
}
