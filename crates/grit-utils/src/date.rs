use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::Local;

use crate::error::UtilError;
use crate::Result;

/// A git timestamp with timezone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitDate {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Timezone offset in minutes from UTC (e.g. -300 for EST).
    pub tz_offset: i32,
}

/// Git stores the timezone as a decimal-parsed integer: `-0500` reads as -500.
fn tz_offset_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.unsigned_abs() as i32;
    sign * ((abs / 100) * 60 + abs % 100)
}

fn minutes_to_tz_offset(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.unsigned_abs() as i32;
    sign * ((abs / 60) * 100 + abs % 60)
}

impl GitDate {
    /// Create a GitDate from a Unix timestamp and timezone offset in minutes.
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current time with the local timezone offset.
    pub fn now() -> Self {
        let now = Local::now();
        let offset_secs = now.offset().local_minus_utc();
        Self {
            timestamp: now.timestamp(),
            tz_offset: offset_secs / 60,
        }
    }

    /// Parse the raw git format: `"<epoch> <±hhmm>"`, or just `"<epoch>"`.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(2, ' ');

        let ts_str = parts.next().unwrap_or_default();
        let timestamp: i64 = ts_str
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{ts_str}'")))?;

        let tz_offset = match parts.next() {
            Some(tz_str) => {
                let tz_str = tz_str.trim();
                let tz_int: i32 = tz_str
                    .parse()
                    .map_err(|_| UtilError::DateParse(format!("invalid timezone: '{tz_str}'")))?;
                tz_offset_to_minutes(tz_int)
            }
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }
}

/// An identity with a timestamp, as it appears in commit and reflog lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: GitDate,
}

impl Signature {
    /// Parse from git's canonical format: `Name <email> epoch ±hhmm`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::SignatureParse("missing '>'".into()))?;
        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::SignatureParse("missing '<'".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];

        let date_str = input[gt_pos + 1..].trim();
        let date_str = std::str::from_utf8(date_str)
            .map_err(|_| UtilError::SignatureParse("non-UTF-8 date".into()))?;
        let date = GitDate::parse_raw(date_str)?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            date,
        })
    }

    /// Format in git's canonical form: `Name <email> epoch ±hhmm`.
    pub fn to_bytes(&self) -> BString {
        let tz = minutes_to_tz_offset(self.date.tz_offset);
        let mut out = BString::new(Vec::with_capacity(64));
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(format!("{} {:+05}", self.date.timestamp, tz).as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_with_zone() {
        let d = GitDate::parse_raw("1234567890 +0000").unwrap();
        assert_eq!(d.timestamp, 1234567890);
        assert_eq!(d.tz_offset, 0);
    }

    #[test]
    fn parse_raw_negative_zone() {
        let d = GitDate::parse_raw("1234567890 -0530").unwrap();
        assert_eq!(d.tz_offset, -330);
    }

    #[test]
    fn parse_raw_without_zone() {
        let d = GitDate::parse_raw("99").unwrap();
        assert_eq!(d.timestamp, 99);
        assert_eq!(d.tz_offset, 0);
    }

    #[test]
    fn parse_raw_rejects_garbage() {
        assert!(GitDate::parse_raw("not-a-date").is_err());
        assert!(GitDate::parse_raw("123 bogus").is_err());
    }

    #[test]
    fn signature_roundtrip() {
        let sig = Signature {
            name: BString::from("John Doe"),
            email: BString::from("john@example.com"),
            date: GitDate::new(1234567890, 0),
        };
        let bytes = sig.to_bytes();
        assert_eq!(
            bytes,
            BString::from("John Doe <john@example.com> 1234567890 +0000")
        );
        let parsed = Signature::parse(bytes.as_bstr()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn signature_negative_offset() {
        let sig = Signature {
            name: BString::from("A"),
            email: BString::from("a@b.c"),
            date: GitDate::new(1700000000, -90),
        };
        let bytes = sig.to_bytes();
        assert!(bytes.ends_with(b"1700000000 -0130"));
        let parsed = Signature::parse(bytes.as_bstr()).unwrap();
        assert_eq!(parsed.date.tz_offset, -90);
    }

    #[test]
    fn signature_name_with_spaces() {
        let line = BString::from("Jane Q. Public <jane@example.com> 1000000000 +0200");
        let sig = Signature::parse(line.as_bstr()).unwrap();
        assert_eq!(sig.name, "Jane Q. Public");
        assert_eq!(sig.email, "jane@example.com");
        assert_eq!(sig.date.tz_offset, 120);
    }

    #[test]
    fn signature_missing_brackets() {
        assert!(Signature::parse(BStr::new(b"no brackets here 123 +0000")).is_err());
    }
}
