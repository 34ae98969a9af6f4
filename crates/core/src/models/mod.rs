pub mod account;
pub mod category;
pub mod summary;
pub mod transaction;
