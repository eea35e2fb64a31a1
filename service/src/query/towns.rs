//! [`Query`] collection related to [`Town`] facets.

use common::operations::By;

use crate::{domain::property::Town, read::property::facets};
#[cfg(doc)]
use crate::{domain::property::County, Query};

use super::DatabaseQuery;

/// Queries distinct [`Town`]s of listed properties, optionally within a
/// [`County`].
pub type ForCounty = DatabaseQuery<By<Vec<Town>, facets::Towns>>;
