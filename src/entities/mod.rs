pub mod comment;
pub mod customer;
pub mod part;
pub mod service_order;
pub mod service_task;
pub mod used_part;
pub mod vehicle;
