pub mod create;
pub mod delete;
pub mod info;
pub mod power;
pub mod saved;
