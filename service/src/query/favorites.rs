//! [`Query`] collection related to [`Favorite`]s.

use std::collections::HashSet;

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Favorite;
use crate::{
    domain::{
        favorite,
        principal::{Denial, Operation},
        property, Principal, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] of [`Property`]s bookmarked by a [`Principal`], most recently
/// bookmarked first.
#[derive(Clone, Copy, Debug)]
pub struct MyFavorites {
    /// [`Principal`] whose [`Favorite`]s are requested.
    pub principal: Principal,
}

/// [`Query`] of IDs of [`Property`]s bookmarked by a [`Principal`].
///
/// Used to mark bookmarked items of a [`Property`] list. Empty for an
/// anonymous [`Principal`].
#[derive(Clone, Copy, Debug)]
pub struct FavoriteIds {
    /// [`Principal`] whose [`Favorite`]s are requested.
    pub principal: Principal,
}

impl<Db, St> Query<MyFavorites> for Service<Db, St>
where
    Db: Database<
        Select<By<Vec<Property>, favorite::Owner>>,
        Ok = Vec<Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: MyFavorites,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MyFavorites { principal } = query;
        principal
            .authorize(Operation::ListFavorites)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // Tenant without a profile has bookmarked nothing yet.
        let Some(owner) = principal.favorite_owner() else {
            return Ok(vec![]);
        };
        self.database()
            .execute(Select(By::new(owner)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

impl<Db, St> Query<FavoriteIds> for Service<Db, St>
where
    Db: Database<
        Select<By<HashSet<property::Id>, favorite::Owner>>,
        Ok = HashSet<property::Id>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = HashSet<property::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: FavoriteIds,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(owner) = query.principal.favorite_owner() else {
            return Ok(HashSet::new());
        };
        self.database()
            .execute(Select(By::new(owner)))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`MyFavorites`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not list [`Favorite`]s.
    #[display("`Principal` is not allowed to list favorites: {_0}")]
    Denied(Denial),
}
