mod jwt;
mod rate_limit;

pub use self::jwt::{DynJwtService, JwtServiceTrait};
pub use self::rate_limit::{DynRateLimitMiddleware, RateLimitMiddlewareTrait};
