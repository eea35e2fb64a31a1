//! [`Command`] for deleting an own [`User`] account.

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        property::{image, Image},
        user, Principal, User,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{remove_files, Command};

/// [`Command`] for deleting an own [`User`] account.
///
/// Profiles, properties, images and favorites of the [`User`] are deleted
/// along with it.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// [`Principal`] whose account should be deleted.
    pub principal: Principal,
}

impl<Db, St> Command<DeleteUser> for Service<Db, St>
where
    Db: Database<
            Select<By<Vec<Image>, landlord::Id>>,
            Ok = Vec<Image>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<User, user::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
    St: Storage<Delete<image::File>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { principal } = cmd;
        principal
            .authorize(Operation::DeleteAccount)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let user_id = principal
            .user_id()
            .ok_or(Denial::AuthenticationRequired)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let images = match principal.landlord_id() {
            Some(owner) => self
                .database()
                .execute(Select(By::new(owner)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            None => vec![],
        };

        let deleted = self
            .database()
            .execute(Delete(By::<User, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::UserNotExists(user_id)));
        }

        remove_files(self.storage(), images.into_iter().map(|i| i.file)).await;

        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not delete an account.
    #[display("`Principal` cannot delete an account: {_0}")]
    Denied(Denial),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{AttachPropertyImages, ToggleFavorite},
        domain::Principal,
        infra::database::memory::Counts,
        test_support::{image_upload, landlord, service, tenant, Listing},
        Command as _,
    };

    use super::{DeleteUser, ExecutionError};

    #[tokio::test]
    async fn cascades_everything_of_a_landlord() {
        let svc = service();
        let owner = landlord(&svc).await;
        let fan = tenant(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;
        let attached = svc
            .execute(AttachPropertyImages {
                principal: owner,
                property_id: property.id,
                uploads: vec![image_upload("front.png")],
            })
            .await
            .unwrap();
        _ = svc
            .execute(ToggleFavorite {
                principal: fan,
                property_id: property.id,
            })
            .await
            .unwrap();
        assert_eq!(svc.storage().len(), 1);

        svc.execute(DeleteUser { principal: owner }).await.unwrap();

        assert_eq!(
            svc.database().counts(),
            Counts {
                users: 1,
                landlords: 0,
                tenants: 1,
                properties: 0,
                images: 0,
                favorites: 0,
            },
        );
        assert!(!svc.storage().contains(&attached.images[0].file));
    }

    #[tokio::test]
    async fn requires_authentication() {
        let svc = service();

        let err = svc
            .execute(DeleteUser {
                principal: Principal::Anonymous,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Denied(_)));
    }
}
