//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod upload;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use derive_more::{Debug, Display};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::extract::JuniperRequest;
use service::{
    domain::property::image,
    infra::{storage, Postgres},
};
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<Postgres, storage::Fs>;

/// Public URL prefix the stored [`image::File`]s are served under.
#[derive(Clone, Debug, Display)]
#[display("{_0}")]
pub struct MediaUrl(Arc<str>);

impl MediaUrl {
    /// Creates a new [`MediaUrl`] out of the provided `prefix`.
    ///
    /// Trailing slashes are dropped.
    #[must_use]
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self(prefix.as_ref().trim_end_matches('/').into())
    }

    /// Returns the public URL of the provided [`image::File`].
    #[must_use]
    pub fn of(&self, file: &image::File) -> String {
        format!("{}/{file}", self.0)
    }
}

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        if response.is_ok() {
            Json(response).into_response()
        } else {
            (status_code, Json(response)).into_response()
        }
    }
}

/// GraphQL API handler.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    JuniperResponse {
        status_code: context.error_status_code(),
        response: gql_request.execute(&*schema, &context).await,
    }
}

#[cfg(test)]
mod spec {
    use service::domain::property::{
        self,
        image::{File, Format, Id},
    };

    use super::MediaUrl;

    #[test]
    fn media_url_joins_file_path() {
        let property_id = property::Id::new();
        let id = Id::new();
        let file = File::of(property_id, id, Format::Jpeg);

        assert_eq!(
            MediaUrl::new("/media/").of(&file),
            format!("/media/property_photos/{property_id}/{id}.jpg"),
        );
        assert_eq!(
            MediaUrl::new("https://cdn.example.com/media").of(&file),
            format!(
                "https://cdn.example.com/media/property_photos/\
                 {property_id}/{id}.jpg",
            ),
        );
    }
}
