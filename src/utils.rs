pub mod classifier;
pub mod config;
pub mod errors;
pub mod fun_facts;
pub mod numclass_utils;
