pub mod schedule;
pub mod wages;
