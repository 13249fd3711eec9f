pub mod guards;
pub mod jwt;
pub mod model;
pub mod policy;

pub use jwt::JwtValidator;
