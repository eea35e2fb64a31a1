//! Filesystem [`Storage`] implementation.

use std::{io, path::PathBuf};

use common::operations::{Delete, Insert};
use tracerr::Traced;

use crate::{
    domain::property::image,
    infra::{storage, Storage},
};

use super::Blob;

/// [`Storage`] keeping files in a local directory.
#[derive(Clone, Debug)]
pub struct Fs {
    /// Directory every [`image::File`] is relative to.
    root: PathBuf,
}

impl Fs {
    /// Creates a new [`Fs`] storage rooted at the provided directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the absolute path of the provided [`image::File`].
    fn path(&self, file: &image::File) -> PathBuf {
        self.root.join(file.to_string())
    }
}

impl Storage<Insert<Blob>> for Fs {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(blob): Insert<Blob>,
    ) -> Result<Self::Ok, Self::Err> {
        let Blob { file, bytes } = blob;

        let path = self.path(&file);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl Storage<Delete<image::File>> for Fs {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(file): Delete<image::File>,
    ) -> Result<Self::Ok, Self::Err> {
        match tokio::fs::remove_file(self.path(&file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(tracerr::new!(storage::Error::from(e))),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{Delete, Insert};

    use crate::{
        domain::property::{self, image},
        infra::{storage::Blob, Storage as _},
    };

    use super::Fs;

    #[tokio::test]
    async fn stores_and_removes_files() {
        let root = std::env::temp_dir()
            .join(format!("rental-fs-{}", property::Id::new()));
        let fs = Fs::new(&root);
        let file = image::File::of(
            property::Id::new(),
            image::Id::new(),
            image::Format::Png,
        );

        fs.execute(Insert(Blob {
            file: file.clone(),
            bytes: vec![1, 2, 3],
        }))
        .await
        .unwrap();
        assert_eq!(
            tokio::fs::read(root.join(file.to_string())).await.unwrap(),
            [1, 2, 3],
        );

        fs.execute(Delete(file.clone())).await.unwrap();
        assert!(!root.join(file.to_string()).exists());

        // Removing twice is fine.
        fs.execute(Delete(file)).await.unwrap();

        tokio::fs::remove_dir_all(root).await.unwrap();
    }
}
