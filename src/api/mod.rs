pub mod company;
pub mod employee;
pub mod export;
pub mod punch;
pub mod time_record;
