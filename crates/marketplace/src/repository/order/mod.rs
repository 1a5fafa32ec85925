mod command;
mod query;

pub use self::command::OrderCommandRepository;
pub use self::query::OrderQueryRepository;

pub(crate) const ORDER_COLUMNS: &str = "id, buyer_id, order_number, total_amount, \
     delivery_address, payment_method, payment_status, status, notes, created_at, \
     updated_at, confirmed_at, delivered_at, cancelled_at";
