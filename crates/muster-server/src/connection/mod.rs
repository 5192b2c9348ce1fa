//! Connection management

mod table;

pub use table::ConnectionTable;
