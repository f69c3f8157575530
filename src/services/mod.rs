//! Business operations on top of the query layer.
//!
//! Services own the rules (gates, defaults, normalization) and the clock;
//! queries own the SQL. Handlers only translate HTTP to service calls.

mod auth;
mod invitations;
mod licensing;
mod verification;

pub use auth::*;
pub use invitations::*;
pub use licensing::*;
pub use verification::*;
