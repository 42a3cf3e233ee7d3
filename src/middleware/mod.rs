/// Middleware module
///
/// Request counting and the authenticated-caller extractor.

mod authenticated_user;
mod hit_counter;

pub use authenticated_user::AuthenticatedUser;
pub use hit_counter::HitCounterMiddleware;
