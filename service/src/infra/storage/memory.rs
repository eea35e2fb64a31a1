//! In-memory [`Storage`] implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use common::operations::{Delete, Insert};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::property::image,
    infra::{storage, Storage},
};

use super::Blob;

/// In-memory [`Storage`], optionally rejecting every write.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored files.
    files: Arc<Mutex<HashMap<image::File, Vec<u8>>>>,

    /// Indicator whether every [`Insert`] fails.
    broken: bool,
}

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`Memory`] storage failing to store anything.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    /// Checks whether the provided [`image::File`] is stored.
    #[must_use]
    pub fn contains(&self, file: &image::File) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(file)
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Indicates whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`Memory`] storage error.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("Storage is unavailable")]
pub struct Error;

impl Storage<Insert<Blob>> for Memory {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(blob): Insert<Blob>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.broken {
            return Err(tracerr::new!(storage::Error::from(Error)));
        }
        drop(
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(blob.file, blob.bytes),
        );
        Ok(())
    }
}

impl Storage<Delete<image::File>> for Memory {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(file): Delete<image::File>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&file),
        );
        Ok(())
    }
}
