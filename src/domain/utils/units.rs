use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SECONDS_RE: Regex = Regex::new(r"^(\d+)$").unwrap();
    static ref MIN_SEC_RE: Regex = Regex::new(r"^(\d+):(\d{2})$").unwrap();
    static ref HOUR_MIN_SEC_RE: Regex = Regex::new(r"^(\d+):(\d{2}):(\d{2})$").unwrap();
    static ref DAY_HOUR_MIN_SEC_RE: Regex = Regex::new(r"^(\d+):(\d{2}):(\d{2}):(\d{2})$").unwrap();
    static ref SIZE_RE: Regex = Regex::new(r"^(\d+)([kmgt])?[bw]$").unwrap();
}

const KIB: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    B,
    Kb,
    Mb,
    Gb,
    Tb,
}

impl SizeUnit {
    pub fn bytes(&self) -> u64 {
        match self {
            Self::B => 1,
            Self::Kb => KIB,
            Self::Mb => KIB.pow(2),
            Self::Gb => KIB.pow(3),
            Self::Tb => KIB.pow(4),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::B => "b",
            Self::Kb => "kb",
            Self::Mb => "mb",
            Self::Gb => "gb",
            Self::Tb => "tb",
        }
    }

    fn from_order(order: Option<&str>) -> Option<Self> {
        match order {
            None => Some(Self::B),
            Some("k") => Some(Self::Kb),
            Some("m") => Some(Self::Mb),
            Some("g") => Some(Self::Gb),
            Some("t") => Some(Self::Tb),
            Some(_) => None,
        }
    }
}

fn capture_u64(captures: &regex::Captures<'_>, index: usize) -> Option<u64> {
    captures.get(index)?.as_str().parse().ok()
}

/// Converts a walltime `[[[D:]HH:]MM:]SS` to seconds.
///
/// A bare integer is taken as seconds. The two rightmost fields must be
/// below 60, the hour field of the four-field form below 24.
pub fn walltime_to_seconds(time_str: &str) -> Option<u64> {
    let time_str = time_str.trim();

    if let Some(caps) = SECONDS_RE.captures(time_str) {
        return capture_u64(&caps, 1);
    }
    if let Some(caps) = MIN_SEC_RE.captures(time_str) {
        let (minutes, seconds) = (capture_u64(&caps, 1)?, capture_u64(&caps, 2)?);
        if seconds < 60 {
            return minutes.checked_mul(60)?.checked_add(seconds);
        }
        return None;
    }
    if let Some(caps) = HOUR_MIN_SEC_RE.captures(time_str) {
        let (hours, minutes, seconds) = (capture_u64(&caps, 1)?, capture_u64(&caps, 2)?, capture_u64(&caps, 3)?);
        if minutes < 60 && seconds < 60 {
            return hours.checked_mul(3600)?.checked_add(60 * minutes + seconds);
        }
        return None;
    }
    if let Some(caps) = DAY_HOUR_MIN_SEC_RE.captures(time_str) {
        let (days, hours, minutes, seconds) =
            (capture_u64(&caps, 1)?, capture_u64(&caps, 2)?, capture_u64(&caps, 3)?, capture_u64(&caps, 4)?);
        if hours < 24 && minutes < 60 && seconds < 60 {
            return days.checked_mul(24 * 3600)?.checked_add(3600 * hours + 60 * minutes + seconds);
        }
        return None;
    }
    None
}

/// Formats seconds as `HH:MM:SS`, hours are not wrapped into days.
pub fn seconds_to_walltime(seconds: u64) -> String {
    let secs = seconds % 60;
    let minutes = seconds / 60;
    format!("{:02}:{:02}:{:02}", minutes / 60, minutes % 60, secs)
}

/// Converts a PBS size such as `4kb` or `12tw` to bytes (base 1024).
pub fn size_to_bytes(size_str: &str) -> Option<u64> {
    let caps = SIZE_RE.captures(size_str)?;
    let amount = capture_u64(&caps, 1)?;
    let unit = SizeUnit::from_order(caps.get(2).map(|order| order.as_str()))?;
    amount.checked_mul(unit.bytes())
}

/// Renders a byte count in the given unit, rounding up: `12gb`.
pub fn bytes_to_size(bytes: u64, unit: SizeUnit) -> String {
    let amount = bytes.div_ceil(unit.bytes());
    format!("{}{}", amount, unit.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walltime_forms() {
        assert_eq!(walltime_to_seconds("1234"), Some(1234));
        assert_eq!(walltime_to_seconds("13:12"), Some(792));
        assert_eq!(walltime_to_seconds("3:02:45"), Some(10965));
        assert_eq!(walltime_to_seconds("72:00:00"), Some(72 * 3600));
        assert_eq!(walltime_to_seconds("3:01:02:03"), Some(262923));
    }

    #[test]
    fn test_walltime_rejects_malformed() {
        assert_eq!(walltime_to_seconds("1:2:3"), None);
        assert_eq!(walltime_to_seconds("1-02-03"), None);
        assert_eq!(walltime_to_seconds("10:60"), None);
        assert_eq!(walltime_to_seconds("1:24:00:00"), None);
        assert_eq!(walltime_to_seconds("1:00:75:00"), None);
        assert_eq!(walltime_to_seconds(""), None);
    }

    #[test]
    fn test_size_to_bytes() {
        assert_eq!(size_to_bytes("12"), None);
        assert_eq!(size_to_bytes("12b"), Some(12));
        assert_eq!(size_to_bytes("4kb"), Some(4096));
        assert_eq!(size_to_bytes("12kb"), Some(12288));
        assert_eq!(size_to_bytes("2gb"), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(size_to_bytes("12tw"), Some(13194139533312));
        assert_eq!(size_to_bytes("bogus"), None);
        assert_eq!(size_to_bytes("12qb"), None);
    }

    #[test]
    fn test_bytes_to_size_rounds_up() {
        assert_eq!(bytes_to_size(34320, SizeUnit::Kb), "34kb");
        assert_eq!(bytes_to_size(12884463294, SizeUnit::Gb), "12gb");
        assert_eq!(bytes_to_size(12884901889, SizeUnit::Gb), "13gb");
    }

    #[test]
    fn test_seconds_to_walltime() {
        assert_eq!(seconds_to_walltime(12), "00:00:12");
        assert_eq!(seconds_to_walltime(1234), "00:20:34");
        assert_eq!(seconds_to_walltime(12345), "03:25:45");
        assert_eq!(seconds_to_walltime(72 * 3600), "72:00:00");
    }
}
