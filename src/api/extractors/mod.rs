pub mod actor;
pub mod gym;
