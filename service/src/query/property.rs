//! [`Query`] collection related to a single [`Property`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, Image},
        Principal, Property,
    },
    infra::{database, Database},
    read::property::Scope,
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries [`Image`]s of a [`Property`] by its [`property::Id`], oldest first.
pub type Images = DatabaseQuery<By<Vec<Image>, property::Id>>;

/// [`Query`] of a single [`Property`] with its [`Image`]s, as seen by a
/// [`Principal`].
#[derive(Clone, Copy, Debug)]
pub struct PropertyDetail {
    /// [`Principal`] requesting the [`Property`].
    pub principal: Principal,

    /// ID of the requested [`Property`].
    pub id: property::Id,
}

/// Output of [`PropertyDetail`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Requested [`Property`].
    pub property: Property,

    /// [`Image`]s of the [`Property`], oldest first.
    pub images: Vec<Image>,
}

impl<Db, St> Query<PropertyDetail> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Image>, property::Id>>,
            Ok = Vec<Image>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: PropertyDetail,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PropertyDetail { principal, id } = query;

        // Hidden properties are indistinguishable from missing ones.
        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|p| Scope::reveals(&principal, p))
            .ok_or(E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        let images = self
            .database()
            .execute(Select(By::<Vec<Image>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { property, images })
    }
}

/// Error of [`PropertyDetail`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist or is not visible.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::Principal,
        test_support::{landlord, service, tenant, Listing},
        Query as _,
    };

    use super::{ExecutionError, PropertyDetail};

    #[tokio::test]
    async fn unavailable_is_shown_to_owner_only() {
        let svc = service();
        let owner = landlord(&svc).await;
        let hidden = Listing::of(&owner, 0).unavailable().store(&svc).await;

        let out = svc
            .execute(PropertyDetail {
                principal: owner,
                id: hidden.id,
            })
            .await
            .unwrap();
        assert_eq!(out.property, hidden);
        assert!(out.images.is_empty());

        for principal in [
            Principal::Anonymous,
            tenant(&svc).await,
            landlord(&svc).await,
        ] {
            let err = svc
                .execute(PropertyDetail {
                    principal,
                    id: hidden.id,
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_ref(),
                ExecutionError::PropertyNotExists(id) if *id == hidden.id,
            ));
        }
    }
}
