//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials, contact info and
    /// `UserRole`, and logs it in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USERNAME_OCCUPIED` - provided `Username` is occupied by another
    ///                         `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "createUser",
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
            role = ?role,
            username = %username,
        ),
    )]
    pub async fn create_user(
        username: api::user::Username,
        password: api::user::Password,
        email: Option<api::user::Email>,
        phone: Option<api::user::Phone>,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                username: username.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                email: email.map(Into::into),
                phone: phone.map(Into::into),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn create_user_session(
        username: api::user::Username,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                username: username.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Makes the current `User` a landlord, so it may list `Property`s.
    ///
    /// Does nothing if the current `User` is a landlord already.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "registerAsLandlord",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register_as_landlord(
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let principal = ctx.principal().await?;
        let landlord = ctx
            .service()
            .execute(command::PromoteToLandlord { principal })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        #[expect(unsafe_code, reason = "just promoted")]
        let user = unsafe { api::User::new_unchecked(landlord.user_id) };
        Ok(user)
    }

    /// Deletes the account of the current `User` along with its profiles,
    /// favorites, `Property`s and their photos.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMyAccount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_my_account(ctx: &Context) -> Result<bool, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::DeleteUser { principal })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Lists a new `Property` owned by the current `User`.
    ///
    /// Photos are attached via `POST /properties/{id}/images`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord;
    /// - `NEGATIVE_RENT` - provided rent is negative;
    /// - `UNKNOWN_COUNTY` - provided county is not a county of Kenya.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProperty",
            input = ?input,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_property(
        input: api::property::Input,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let fields: command::create_property::Fields =
            input.try_into().map_err(ctx.error())?;
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::CreateProperty {
                principal,
                fields,
                images: Vec::new(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|out| out.property.into())
    }

    /// Replaces details of the `Property` owned by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord;
    /// - `NEGATIVE_RENT` - provided rent is negative;
    /// - `PROPERTY_NOT_EXISTS` - the `Property` doesn't exist or is owned by
    ///                           someone else;
    /// - `UNKNOWN_COUNTY` - provided county is not a county of Kenya.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProperty",
            id = %id,
            input = ?input,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_property(
        id: api::property::Id,
        input: api::property::Input,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let fields: command::create_property::Fields =
            input.try_into().map_err(ctx.error())?;
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::UpdateProperty {
                principal,
                id: id.into(),
                fields,
                images: Vec::new(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|out| out.property.into())
    }

    /// Deletes the `Property` owned by the current `User` along with its
    /// photos.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord;
    /// - `PROPERTY_NOT_EXISTS` - the `Property` doesn't exist or is owned by
    ///                           someone else.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::DeleteProperty {
                principal,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Deletes a photo of a `Property` owned by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `NOT_LANDLORD` - the current `User` is not a landlord;
    /// - `IMAGE_NOT_EXISTS` - the photo doesn't exist or belongs to a
    ///                        `Property` owned by someone else.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deletePropertyImage",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_property_image(
        id: api::property::ImageId,
        ctx: &Context,
    ) -> Result<api::property::Image, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::DeletePropertyImage {
                principal,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Bookmarks the `Property` for the current `User`, or removes the
    /// bookmark if it's there already.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `PROPERTY_NOT_EXISTS` - the `Property` doesn't exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toggleFavoriteProperty",
            otel.name = Self::SPAN_NAME,
            property_id = %property_id,
        ),
    )]
    pub async fn toggle_favorite_property(
        property_id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::property::Toggled, Error> {
        let principal = ctx.principal().await?;
        ctx.service()
            .execute(command::ToggleFavorite {
                principal,
                property_id: property_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USERNAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`Username` is occupied by another `User`"]
                UsernameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHash(_) => None,
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::promote_to_landlord::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::UnknownCounty(_) => Some(PropertyError::UnknownCounty.into()),
            Self::Images(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::UnknownCounty(_) => Some(PropertyError::UnknownCounty.into()),
            Self::Images(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_property_image::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "IMAGE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`PropertyImage` with the specified ID does not \
                             exist"]
                ImageNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::ImageNotExists(_) => Some(Error::ImageNotExists.into()),
        }
    }
}

impl AsError for command::toggle_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::attach_property_images::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Denied(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the specified ID does not exist"]
        NotExists,

        #[code = "UNKNOWN_COUNTY"]
        #[status = BAD_REQUEST]
        #[message = "Provided county is not a county of Kenya"]
        UnknownCounty,
    }
}
