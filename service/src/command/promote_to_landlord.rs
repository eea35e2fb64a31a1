//! [`Command`] for promoting a [`User`] to a [`Landlord`].

use common::operations::{
    By, Commit, Insert, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        principal::{Denial, Operation},
        user, Landlord, Principal, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for promoting a [`User`] to a [`Landlord`].
///
/// Promoting an existing [`Landlord`] is a no-op returning its profile.
#[derive(Clone, Copy, Debug)]
pub struct PromoteToLandlord {
    /// [`Principal`] to be promoted.
    pub principal: Principal,
}

impl<Db, St> Command<PromoteToLandlord> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Landlord>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Landlord>, user::Id>>,
            Ok = Option<Landlord>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Landlord;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PromoteToLandlord,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PromoteToLandlord { principal } = cmd;
        principal
            .authorize(Operation::PromoteToLandlord)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let user_id = principal
            .user_id()
            .ok_or(Denial::AuthenticationRequired)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        // Does nothing if the profile exists already.
        tx.execute(Insert(Landlord::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let landlord = tx
            .execute(Select(By::<Option<Landlord>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if user.role != user::Role::Landlord {
            user.role = user::Role::Landlord;
            tx.execute(Update(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(landlord)
    }
}

/// Error of [`PromoteToLandlord`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not be promoted.
    #[display("`Principal` cannot be promoted: {_0}")]
    Denied(Denial),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{principal::Denial, user, Principal, User},
        infra::Database as _,
        test_support::{resolve, service, tenant},
        Command as _,
    };

    use super::{ExecutionError, PromoteToLandlord};

    #[tokio::test]
    async fn is_idempotent() {
        let svc = service();
        let principal = tenant(&svc).await;
        let user_id = principal.user_id().unwrap();

        let first = svc
            .execute(PromoteToLandlord { principal })
            .await
            .unwrap();
        let promoted = resolve(&svc, user_id).await;
        let second = svc
            .execute(PromoteToLandlord {
                principal: promoted,
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(promoted.landlord_id(), Some(first.id));
        assert_eq!(svc.database().counts().landlords, 1);
        let user = svc
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, user::Role::Landlord);
    }

    #[tokio::test]
    async fn requires_authentication() {
        let svc = service();

        let err = svc
            .execute(PromoteToLandlord {
                principal: Principal::Anonymous,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Denied(Denial::AuthenticationRequired),
        ));
        assert_eq!(svc.database().counts().landlords, 0);
    }
}
