pub mod services;
pub mod session;

pub use services::NetworkServices;
pub use session::{SessionHandler, SessionIdentity, SessionSubscriptions};
