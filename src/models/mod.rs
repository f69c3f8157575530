mod device;
mod invitation_code;
mod license;
mod product;
mod user;

pub use device::*;
pub use invitation_code::*;
pub use license::*;
pub use product::*;
pub use user::*;
