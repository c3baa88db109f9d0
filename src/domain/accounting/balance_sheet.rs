use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::accounting::account::Account;
use crate::domain::utils::id::AccountId;
use crate::error::{Error, Result};

lazy_static! {
    static ref ACCOUNT_NAME_RE: Regex = Regex::new(r"^Account=([^,]+),?").unwrap();
    static ref PLAIN_NAME_RE: Regex = Regex::new(r"^(\w+)").unwrap();
}

const ID_FIELD: &str = "Id";
const NAME_FIELD: &str = "Name";
const AVAILABLE_FIELD: &str = "Available";
const ALLOCATED_FIELD: &str = "Allocated";

/// Column layout taken from the header and the dashed line below it.
#[derive(Debug, Default)]
struct Layout {
    names: Vec<String>,
    widths: Vec<usize>,
}

impl Layout {
    fn index_of(&self, field: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|name| name == field)
            .ok_or_else(|| Error::BalanceSheetFormat(format!("missing column '{}'", field)))
    }

    /// Cuts a row into fields. Each column is followed by one separator.
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut fields = Vec::with_capacity(self.widths.len());
        let mut offset = 0;
        for width in &self.widths {
            let start = offset.min(line.len());
            let end = (offset + width).min(line.len());
            fields.push(line.get(start..end).unwrap_or("").trim());
            offset += width + 1;
        }
        fields
    }
}

/// Parser for the fixed-width listing printed by the balance command.
#[derive(Debug, Clone)]
pub struct BalanceSheetParser {
    default_project: String,
}

impl BalanceSheetParser {
    pub fn new(default_project: impl Into<String>) -> Self {
        Self { default_project: default_project.into() }
    }

    /// Returns the accounts in the order they are listed.
    ///
    /// Lines before the header and rows whose credit columns are not numeric
    /// are skipped with a warning.
    pub fn parse(&self, balance_sheet: &str) -> Result<Vec<Account>> {
        let mut layout = Layout::default();
        let mut accounts = Vec::new();

        for line in balance_sheet.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with(ID_FIELD) {
                layout.names = line.split_whitespace().map(str::to_string).collect();
                continue;
            }
            if line.starts_with("--") {
                layout.widths = line.split_whitespace().map(str::len).collect();
                continue;
            }
            if layout.names.is_empty() || layout.widths.len() != layout.names.len() {
                log::warn!("Skipping balance line before the header: '{}'.", line);
                continue;
            }

            let fields = layout.split(line);
            let id = fields[layout.index_of(ID_FIELD)?];
            let name = self.account_name(fields[layout.index_of(NAME_FIELD)?]);
            let available = fields[layout.index_of(AVAILABLE_FIELD)?].parse::<f64>();
            let allocated = fields[layout.index_of(ALLOCATED_FIELD)?].parse::<f64>();

            match (available, allocated) {
                (Ok(available), Ok(allocated)) => accounts.push(Account::new(AccountId::new(id), name, available, allocated)),
                _ => log::warn!("Skipping balance row of account '{}', credits are not numeric.", id),
            }
        }
        Ok(accounts)
    }

    fn account_name(&self, name: &str) -> String {
        if name.is_empty() {
            return self.default_project.clone();
        }
        match ACCOUNT_NAME_RE.captures(name).or_else(|| PLAIN_NAME_RE.captures(name)).and_then(|caps| caps.get(1)) {
            Some(account_name) => account_name.as_str().to_string(),
            None => {
                log::warn!("Can not parse account name '{}'.", name);
                name.to_string()
            }
        }
    }
}
