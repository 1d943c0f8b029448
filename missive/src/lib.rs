pub mod controller;
pub mod env;
