use std::fmt;

use crate::domain::utils::id::AccountId;

/// Credit account as listed on a balance sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub available: f64,
    pub allocated: f64,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, available: f64, allocated: f64) -> Self {
        Self { id, name: name.into(), available, allocated }
    }

    pub fn can_afford(&self, credits: f64) -> bool {
        credits <= self.available
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}):\n  available: {:.2}\n  allocated: {:.2}", self.name, self.id, self.available, self.allocated)
    }
}
