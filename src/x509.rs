mod context;
mod inspect;
mod name;
mod parser;
mod policy;
mod validator;

pub use self::context::*;
pub use self::inspect::*;
pub use self::name::*;
pub use self::parser::*;
pub use self::policy::*;
pub use self::validator::*;
