//! Who is calling: sessions, login, and turning request cookies into a `RequestContext`.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod provider;
mod request_context;
mod resolver;
mod role;
mod session;

pub use principal::{CurrentUser, Permission, SessionData};
pub use provider::{hash_password, verify_password, Account, AuthService, LocalAuthProvider, LoginRequest, SeedUser, UserDirectory};
pub use request_context::RequestContext;
pub use resolver::{resolve_session, CookieJar, SessionResolution};
pub use role::Role;
pub use session::{Session, SessionManager, SessionToken};
