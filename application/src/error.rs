//! [`Error`]-related definitions.

use std::{fmt, num::TryFromIntError};

use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use serde::Serialize;
use service::{domain::principal::Denial, infra::database};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            redirect: None,
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Location a client is suggested to navigate to instead.
    pub redirect: Option<&'static str>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            redirect: None,
            backtrace: None,
        }
    }

    /// Attaches the provided `redirect` hint to this [`Error`].
    #[must_use]
    pub fn redirect_to(mut self, redirect: &'static str) -> Self {
        self.redirect = Some(redirect);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            redirect: _,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(3);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        if let Some(redirect) = self.redirect {
            drop(ext.add_field(
                "redirect",
                juniper::Value::scalar(redirect.to_owned()),
            ));
        }
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        /// JSON body of an [`Error`] response.
        #[derive(Serialize)]
        struct Body<'e> {
            code: Code,
            message: &'e str,
            #[serde(skip_serializing_if = "Option::is_none")]
            redirect: Option<&'static str>,
        }

        let body = Body {
            code: self.code,
            message: &self.message,
            redirect: self.redirect,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            redirect: None,
            backtrace: None,
        })
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: self.status(),
            message: self.body_text(),
            redirect: None,
            backtrace: None,
        })
    }
}

impl AsError for Denial {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum DenialError {
                #[code = "AUTHORIZATION_REQUIRED"]
                #[status = UNAUTHORIZED]
                #[message = "Authorization required"]
                AuthorizationRequired,

                #[code = "NOT_LANDLORD"]
                #[status = FORBIDDEN]
                #[message = "Authenticated `User` must be a landlord"]
                NotLandlord,
            }
        }

        Some(match self {
            Self::AuthenticationRequired => {
                DenialError::AuthorizationRequired.into()
            }
            Self::InsufficientRole => Error::from(DenialError::NotLandlord)
                .redirect_to(BROWSE_LOCATION),
        })
    }
}

/// Location of the listings browsing page, suggested to [`Principal`]s lacking
/// a landlord profile.
///
/// [`Principal`]: service::domain::Principal
pub const BROWSE_LOCATION: &str = "/browse";

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for TryFromIntError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, IntoFieldError};
    use service::domain::principal::Denial;

    use super::{AsError as _, BROWSE_LOCATION};

    #[test]
    fn anonymous_is_unauthorized() {
        let err = Denial::AuthenticationRequired.as_error();

        assert_eq!(err.code, "AUTHORIZATION_REQUIRED");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.redirect, None);
    }

    #[test]
    fn non_landlord_is_redirected_to_browse() {
        let err = Denial::InsufficientRole.as_error();

        assert_eq!(err.code, "NOT_LANDLORD");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);

        let field =
            IntoFieldError::<DefaultScalarValue>::into_field_error(err);
        let ext = field.extensions().as_object_value().unwrap();
        assert_eq!(
            ext.get_field_value("redirect")
                .and_then(|v| v.as_string_value()),
            Some(BROWSE_LOCATION),
        );
        assert_eq!(
            ext.get_field_value("code").and_then(|v| v.as_string_value()),
            Some("NOT_LANDLORD"),
        );
    }
}
