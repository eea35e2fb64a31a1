//! [`Command`] for deleting an own [`Property`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        property::{self, image, Image},
        Principal, Property,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{remove_files, Command};

/// [`Command`] for deleting an own [`Property`] along with its [`Image`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// [`Principal`] owning the [`Property`].
    pub principal: Principal,

    /// ID of the [`Property`] to delete.
    pub id: property::Id,
}

impl<Db, St> Command<DeleteProperty> for Service<Db, St>
where
    Db: Database<
            Select<By<Vec<Image>, property::Id>>,
            Ok = Vec<Image>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Property, (property::Id, landlord::Id)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
    St: Storage<Delete<image::File>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { principal, id } = cmd;

        principal
            .authorize(Operation::ManageProperty)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let images = self
            .database()
            .execute(Select(By::<Vec<Image>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let deleted = self
            .database()
            .execute(Delete(By::<Property, _>::new((id, owner))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::PropertyNotExists(id)));
        }

        remove_files(self.storage(), images.into_iter().map(|i| i.file)).await;

        Ok(())
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not manage properties.
    #[display("`Principal` cannot manage properties: {_0}")]
    Denied(Denial),

    /// [`Property`] doesn't exist or is owned by someone else.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{AttachPropertyImages, ToggleFavorite},
        test_support::{
            exists, image_upload, landlord, service, tenant, Listing,
        },
        Command as _,
    };

    use super::{DeleteProperty, ExecutionError};

    #[tokio::test]
    async fn removes_images_and_favorites() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;
        let attached = svc
            .execute(AttachPropertyImages {
                principal: owner,
                property_id: property.id,
                uploads: vec![image_upload("a.png"), image_upload("b.png")],
            })
            .await
            .unwrap();
        _ = svc
            .execute(ToggleFavorite {
                principal: tenant(&svc).await,
                property_id: property.id,
            })
            .await
            .unwrap();

        svc.execute(DeleteProperty {
            principal: owner,
            id: property.id,
        })
        .await
        .unwrap();

        assert!(!exists(&svc, property.id).await);
        let counts = svc.database().counts();
        assert_eq!((counts.images, counts.favorites), (0, 0));
        for image in attached.images {
            assert!(!svc.storage().contains(&image.file));
        }
    }

    #[tokio::test]
    async fn other_landlord_gets_not_found() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;
        let attached = svc
            .execute(AttachPropertyImages {
                principal: owner,
                property_id: property.id,
                uploads: vec![image_upload("a.png")],
            })
            .await
            .unwrap();

        let err = svc
            .execute(DeleteProperty {
                principal: landlord(&svc).await,
                id: property.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PropertyNotExists(_)));
        assert!(exists(&svc, property.id).await);
        assert!(svc.storage().contains(&attached.images[0].file));
    }
}
