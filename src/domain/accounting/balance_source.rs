use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::api::config_dto::Config;
use crate::error::Result;

/// Producer of balance sheet text.
pub trait BalanceSource: std::fmt::Debug {
    /// `Ok(None)` means no balance could be obtained and the accounting
    /// check should be skipped.
    fn fetch(&self) -> Result<Option<String>>;
}

/// Balance sheet read from a file, used for testing.
#[derive(Debug, Clone)]
pub struct MockBalance {
    path: PathBuf,
}

impl MockBalance {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BalanceSource for MockBalance {
    fn fetch(&self) -> Result<Option<String>> {
        Ok(Some(fs::read_to_string(&self.path)?))
    }
}

/// Balance sheet printed by an external command.
#[derive(Debug, Clone)]
pub struct CommandBalance {
    cmd: String,
}

impl CommandBalance {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl BalanceSource for CommandBalance {
    fn fetch(&self) -> Result<Option<String>> {
        let output = match Command::new(&self.cmd).output() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Could not run balance command '{}': {}. Skipping credit check.", self.cmd, e);
                return Ok(None);
            }
        };
        if !output.status.success() {
            log::warn!("Balance command '{}' failed with {}. Skipping credit check.", self.cmd, output.status);
            return Ok(None);
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(Some(text))
    }
}

/// Balance sheet held in memory.
#[derive(Debug, Clone)]
pub struct StaticBalance(pub String);

impl BalanceSource for StaticBalance {
    fn fetch(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// A mock balance file takes precedence over the balance command.
pub fn balance_source_from_config(config: &Config) -> Box<dyn BalanceSource> {
    match &config.mock_balance {
        Some(path) => Box::new(MockBalance::new(path.clone())),
        None => Box::new(CommandBalance::new(config.balance_cmd.clone())),
    }
}
