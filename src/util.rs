use std::{future::Future, pin::Pin};

pub mod codec;
pub mod glob;
pub mod secret;

pub use self::glob::Glob;
pub use self::secret::Secret;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Takes a `bool` and converts it `Option<()>` to be used as early return point with `?`.
#[inline(always)]
#[must_use]
pub fn check(x: bool) -> Option<()> {
    if x {
        Some(())
    } else {
        None
    }
}
