pub mod client_name_cache;
pub mod client_name_filter;
pub mod db_utils;
pub mod tax_cache;
