//! [`Image`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::property;
#[cfg(doc)]
use crate::domain::Property;

/// Photo of a [`Property`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    /// ID of this [`Image`].
    pub id: Id,

    /// ID of the [`Property`] this [`Image`] belongs to.
    pub property_id: property::Id,

    /// Stored [`File`] of this [`Image`].
    pub file: File,

    /// [`DateTime`] when this [`Image`] was created.
    pub created_at: CreationDateTime,
}

impl Image {
    /// Creates a new [`Image`] of the provided [`Property`] in the provided
    /// [`Format`].
    #[must_use]
    pub fn new(property_id: property::Id, format: Format) -> Self {
        let id = Id::new();
        Self {
            id,
            property_id,
            file: File::of(property_id, id, format),
            created_at: DateTimeOf::now(),
        }
    }
}

/// ID of an [`Image`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Path of a stored [`Image`] file, relative to the storage root.
///
/// Has the `property_photos/{property_id}/{image_id}.{ext}` form.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct File(String);

impl File {
    /// Directory all the [`Image`] files are stored in.
    pub const DIR: &'static str = "property_photos";

    /// Builds the [`File`] path of the provided [`Image`].
    #[must_use]
    pub fn of(property_id: property::Id, id: Id, format: Format) -> Self {
        Self(format!(
            "{}/{property_id}/{id}.{}",
            Self::DIR,
            format.extension(),
        ))
    }
}

/// Supported encoding of an [`Image`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Format {
    /// JPEG image.
    #[display("image/jpeg")]
    Jpeg,

    /// PNG image.
    #[display("image/png")]
    Png,

    /// WebP image.
    #[display("image/webp")]
    Webp,

    /// GIF image.
    #[display("image/gif")]
    Gif,
}

impl Format {
    /// Detects the [`Format`] by the provided MIME `content_type`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Returns the file extension of this [`Format`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Uploaded [`Image`] contents, not stored yet.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Original name of the uploaded file, if provided by the client.
    pub file_name: Option<String>,

    /// MIME type of the uploaded file, as declared by the client.
    pub content_type: String,

    /// Raw bytes of the uploaded file.
    #[debug("{} bytes", bytes.len())]
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Returns a human-readable name of this [`Upload`] for reporting.
    #[must_use]
    pub fn name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<unnamed>")
    }
}

/// [`DateTime`] when an [`Image`] was created.
pub type CreationDateTime = DateTimeOf<(Image, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{property, File, Format, Id};

    #[test]
    fn detects_format_by_content_type() {
        assert_eq!(Format::from_content_type("image/JPG"), Some(Format::Jpeg));
        assert_eq!(Format::from_content_type("image/webp"), Some(Format::Webp));
        assert_eq!(Format::from_content_type("application/pdf"), None);
    }

    #[test]
    fn file_is_grouped_by_property() {
        let property_id = property::Id::new();
        let id = Id::new();
        let file = File::of(property_id, id, Format::Png);

        assert_eq!(
            file.to_string(),
            format!("property_photos/{property_id}/{id}.png"),
        );
    }
}
