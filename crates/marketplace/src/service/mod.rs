mod cart;
mod checkout;
mod order;

pub use self::cart::CartService;
pub use self::checkout::{CheckoutService, CheckoutServiceDeps};
pub use self::order::{OrderCommandService, OrderQueryService};
