mod cart;
pub mod memory;
mod order;
mod order_item;
mod product;
mod stats;

pub use self::cart::CartRepository;
pub use self::order::{OrderCommandRepository, OrderQueryRepository};
pub use self::order_item::{OrderItemCommandRepository, OrderItemQueryRepository};
pub use self::product::ProductRepository;
pub use self::stats::{BuyerStatsRepository, ProducerStatsRepository};
