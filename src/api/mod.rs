pub mod absence;
pub mod cash;
pub mod client;
pub mod employee;
pub mod job;
pub mod payroll;
pub mod schedule;
pub mod tax_config;
