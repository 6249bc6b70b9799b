pub mod canonicalize;
pub mod choose;
