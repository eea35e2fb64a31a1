//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of `Args`.
///
/// Commands, queries, database and storage operations are all expressed as
/// [`Handler`]s of their arguments.
pub trait Handler<Args = ()> {
    /// Type of a successful result.
    type Ok;

    /// Type of an error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
