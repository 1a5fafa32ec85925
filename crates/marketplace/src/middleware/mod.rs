pub mod jwt;
pub mod rate_limit;
pub mod role;
pub mod validate;
