//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTimeOf,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password, Phone, Role, Username};
use crate::{
    domain::{user, Landlord, Tenant, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`] along with the profile of its
/// [`Role`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db, St> Command<CreateUser> for Service<Db, St>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Landlord>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Tenant>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            password,
            email,
            phone,
            role,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }

        let user = User {
            id: user::Id::new(),
            username,
            password_hash: user::PasswordHash::new(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
            email,
            phone,
            role,
            created_at: DateTimeOf::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(user.clone())).await;
        // Lost a race against a concurrent signup.
        if inserted.as_ref().is_err_and(|e| {
            e.as_ref().is_unique_violation(Some("users_username_key"))
        }) {
            return Err(tracerr::new!(E::UsernameOccupied(user.username)));
        }
        inserted.map_err(tracerr::map_from_and_wrap!(=> E))?;

        match user.role {
            user::Role::Landlord => {
                tx.execute(Insert(Landlord::new(user.id))).await
            }
            user::Role::Tenant => tx.execute(Insert(Tenant::new(user.id))).await,
        }
        .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Password`] hashing error.
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(#[error(not(source))] argon2::password_hash::Error),

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] user::Username),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::{user, Principal},
        test_support::{resolve, service},
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn signup(username: &str, role: user::Role) -> CreateUser {
        CreateUser {
            username: user::Username::new(username).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("correct horse").unwrap(),
            )),
            email: user::Email::new("jane@example.co.ke"),
            phone: None,
            role,
        }
    }

    #[tokio::test]
    async fn creates_profile_of_the_role() {
        let svc = service();

        let landlord = svc
            .execute(signup("jane", user::Role::Landlord))
            .await
            .unwrap();
        let tenant = svc
            .execute(signup("john", user::Role::Tenant))
            .await
            .unwrap();

        assert!(matches!(
            resolve(&svc, landlord.id).await,
            Principal::Landlord { .. },
        ));
        assert!(matches!(
            resolve(&svc, tenant.id).await,
            Principal::Tenant {
                profile: Some(_),
                ..
            },
        ));
        let counts = svc.database().counts();
        assert_eq!((counts.landlords, counts.tenants), (1, 1));
    }

    #[tokio::test]
    async fn rejects_occupied_username() {
        let svc = service();
        _ = svc
            .execute(signup("jane", user::Role::Tenant))
            .await
            .unwrap();

        let err = svc
            .execute(signup("jane", user::Role::Landlord))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UsernameOccupied(_)));
        assert_eq!(svc.database().counts().users, 1);
    }
}
