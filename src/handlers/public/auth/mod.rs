// Token acquisition. No caller is resolved for these routes.
pub mod login;
pub mod register;

pub use login::login;
pub use register::register;
