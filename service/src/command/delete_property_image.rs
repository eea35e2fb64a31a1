//! [`Command`] for deleting a single [`Image`] of an own [`Property`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        property::{image, Image},
        Principal,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{remove_files, Command};

/// [`Command`] for deleting a single [`Image`] of an own [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct DeletePropertyImage {
    /// [`Principal`] owning the [`Property`].
    pub principal: Principal,

    /// ID of the [`Image`] to delete.
    pub id: image::Id,
}

impl<Db, St> Command<DeletePropertyImage> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Image>, (image::Id, landlord::Id)>>,
            Ok = Option<Image>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Image, image::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
    St: Storage<Delete<image::File>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Image;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeletePropertyImage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeletePropertyImage { principal, id } = cmd;

        principal
            .authorize(Operation::ManageProperty)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let image = self
            .database()
            .execute(Select(By::<Option<Image>, _>::new((id, owner))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ImageNotExists(id))
            .map_err(tracerr::wrap!())?;

        let deleted = self
            .database()
            .execute(Delete(By::<Image, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            // Removed concurrently.
            return Err(tracerr::new!(E::ImageNotExists(id)));
        }

        remove_files(self.storage(), [image.file.clone()]).await;

        Ok(image)
    }
}

/// Error of [`DeletePropertyImage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not manage properties.
    #[display("`Principal` cannot manage properties: {_0}")]
    Denied(Denial),

    /// [`Image`] doesn't exist or belongs to someone else's [`Property`].
    #[display("`Image(id: {_0})` does not exist")]
    #[from(ignore)]
    ImageNotExists(#[error(not(source))] image::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::AttachPropertyImages,
        test_support::{image_upload, landlord, service, Listing},
        Command as _,
    };

    use super::{DeletePropertyImage, ExecutionError};

    #[tokio::test]
    async fn deletes_only_own_image() {
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
        let (first, second) = (&attached.images[0], &attached.images[1]);

        let err = svc
            .execute(DeletePropertyImage {
                principal: landlord(&svc).await,
                id: first.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ImageNotExists(id) if *id == first.id,
        ));

        let deleted = svc
            .execute(DeletePropertyImage {
                principal: owner,
                id: first.id,
            })
            .await
            .unwrap();
        assert_eq!(&deleted, first);
        assert!(!svc.storage().contains(&first.file));
        assert!(svc.storage().contains(&second.file));
        assert_eq!(svc.database().counts().images, 1);
    }
}
