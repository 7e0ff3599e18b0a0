pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod filter_page;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use filter_page::FilterPage;
pub use error::FilterError;
