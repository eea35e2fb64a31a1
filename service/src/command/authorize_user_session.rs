//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] verifying a [`session::Token`] and checking that its [`User`]
/// still exists.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, St> Command<AuthorizeUserSession> for Service<Db, St>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // Tokens of deleted accounts stay cryptographically valid.
        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if user.is_none() {
            return Err(tracerr::new!(E::UserNotExists(session.user_id)));
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete};

    use crate::{
        command::CreateUserSession,
        domain::{user, User},
        infra::Database as _,
        test_support::{service, user},
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn rejects_token_of_deleted_user() {
        let svc = service();
        let u = user(&svc, user::Role::Landlord).await;
        let out = svc.execute(CreateUserSession::ByUserId(u.id)).await.unwrap();

        _ = svc
            .database()
            .execute(Delete(By::<User, _>::new(u.id)))
            .await
            .unwrap();
        let err = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == u.id,
        ));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let svc = service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: "not.a.token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
