pub mod account;
pub mod balance_sheet;
pub mod balance_source;
pub mod quote;

pub use account::Account;
pub use balance_sheet::BalanceSheetParser;
pub use balance_source::{balance_source_from_config, BalanceSource, CommandBalance, MockBalance, StaticBalance};
pub use quote::QuoteCalculator;
