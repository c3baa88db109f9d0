pub mod accounting;
pub mod checker;
pub mod diagnostics;
pub mod inventory;
pub mod job;
pub mod parser;
pub mod utils;
