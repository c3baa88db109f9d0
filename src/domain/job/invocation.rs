use std::fs;
use std::path::PathBuf;

/// Who runs the check, and from where.
///
/// Supplies the defaults a job inherits from its submission environment:
/// output/error host and directory, and the mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub user: String,
    pub host: String,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(user: impl Into<String>, host: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self { user: user.into(), host: host.into(), cwd: cwd.into() }
    }

    pub fn from_env() -> Self {
        let user = std::env::var("USER").or_else(|_| std::env::var("LOGNAME")).unwrap_or_default();
        let host = std::env::var("HOSTNAME")
            .ok()
            .or_else(|| fs::read_to_string("/etc/hostname").ok().map(|name| name.trim().to_string()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self { user, host, cwd }
    }
}
