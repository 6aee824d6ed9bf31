pub mod classify_number;
pub mod root;
pub mod version;
