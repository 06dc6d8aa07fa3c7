pub mod filter;
pub mod pager;
pub mod params;
pub mod queries;
