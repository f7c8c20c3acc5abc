pub mod errors;
pub mod forms;
pub mod session;

pub use errors::{resolve, Resolution};
pub use forms::{FormError, FormErrors, FormField, LoginForm, RegisterForm};
pub use session::Session;
