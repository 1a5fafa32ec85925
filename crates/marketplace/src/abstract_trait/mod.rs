pub mod cart;
pub mod checkout;
pub mod order;
pub mod order_item;
pub mod product;
pub mod stats;
