pub mod absence_request;
pub mod cash_collection;
pub mod client;
pub mod employee;
pub mod job;
pub mod payroll;
pub mod role;
pub mod tax_configuration;
