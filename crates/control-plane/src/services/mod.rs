// Services layer for business logic
// Services own business logic and validation, calling storage directly

pub mod event;
pub mod user;

pub use event::EventService;
pub use user::UserService;
