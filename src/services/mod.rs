pub mod costing;
pub mod customers;
pub mod orders;
pub mod parts;
pub mod reports;
pub mod tasks;
pub mod vehicles;
