mod adapter;
mod algorithm;
mod envelope;
mod error;
mod provider;

pub use self::adapter::*;
pub use self::algorithm::*;
pub use self::envelope::*;
pub use self::error::*;
pub use self::provider::*;
