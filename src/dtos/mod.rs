pub mod auth_dtos;
pub mod keluhan_dtos;
pub mod photo_dtos;
pub mod user_dtos;
// alias supaya dapat dipanggil sebagai `crate::dtos::auth`
pub use auth_dtos as auth;
