// handlers/public/auth/mod.rs - Token acquisition, no authentication required

pub mod login;  // POST /auth/login
pub mod signup; // POST /auth/signup

pub use login::login_post;
pub use signup::signup_post;
