pub mod auth;
pub mod rejected;
pub mod status;
pub mod sync;
