pub mod dual;
pub mod interface;
pub mod json_store;
pub mod postgres_store;
