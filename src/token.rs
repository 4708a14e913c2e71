mod lifecycle;
mod pin;
mod reference;
mod session;
mod soft_store;
mod store;

pub use self::lifecycle::*;
pub use self::pin::*;
pub use self::reference::*;
pub use self::session::*;
pub use self::soft_store::*;
pub use self::store::*;
