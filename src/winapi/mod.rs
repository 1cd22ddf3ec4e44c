pub mod module;
pub mod service;
