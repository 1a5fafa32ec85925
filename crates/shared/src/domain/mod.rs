mod api;
mod identity;
mod pagination;

pub use self::api::{ApiResponse, ApiResponsePagination};
pub use self::identity::{Identity, Role};
pub use self::pagination::Pagination;
