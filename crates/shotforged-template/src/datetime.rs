//! Date and time tokens for staging folders and filenames.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::anatomy::AnatomyData;

/// Date/time tokens for `now`.
///
/// | token | example | meaning |
/// |-------|---------|---------|
/// | `d` / `dd` | `5` / `05` | day of month |
/// | `ddd` / `dddd` | `Mon` / `Monday` | weekday |
/// | `m` / `mm` | `3` / `03` | month |
/// | `mmm` / `mmmm` | `Mar` / `March` | month name |
/// | `yy` / `yyyy` | `26` / `2026` | year |
/// | `H` / `HH` | `9` / `09` | 24-hour clock |
/// | `h` / `hh` / `ht` | `9` / `09` / `AM` | 12-hour clock |
/// | `M` / `MM` | `7` / `07` | minute |
/// | `S` / `SS` | `4` / `04` | second |
pub fn datetime_data<Tz: TimeZone>(now: &DateTime<Tz>) -> AnatomyData
where
    Tz::Offset: std::fmt::Display,
{
    let mut data = AnatomyData::new();
    let hour12 = match now.hour() % 12 {
        0 => 12,
        h => h,
    };

    data.insert("d", now.day().to_string());
    data.insert("dd", format!("{:02}", now.day()));
    data.insert("ddd", now.format("%a").to_string());
    data.insert("dddd", now.format("%A").to_string());
    data.insert("m", now.month().to_string());
    data.insert("mm", format!("{:02}", now.month()));
    data.insert("mmm", now.format("%b").to_string());
    data.insert("mmmm", now.format("%B").to_string());
    data.insert("yy", format!("{:02}", now.year() % 100));
    data.insert("yyyy", now.year().to_string());
    data.insert("H", now.hour().to_string());
    data.insert("HH", format!("{:02}", now.hour()));
    data.insert("h", hour12.to_string());
    data.insert("hh", format!("{hour12:02}"));
    data.insert("ht", if now.hour() < 12 { "AM" } else { "PM" });
    data.insert("M", now.minute().to_string());
    data.insert("MM", format!("{:02}", now.minute()));
    data.insert("S", now.second().to_string());
    data.insert("SS", format!("{:02}", now.second()));
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_datetime_tokens() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 21, 7, 4).unwrap();
        let data = datetime_data(&now);
        let get = |key: &str| data.get_str(&[key]).unwrap();

        assert_eq!(get("yyyy"), "2026");
        assert_eq!(get("yy"), "26");
        assert_eq!(get("mm"), "03");
        assert_eq!(get("m"), "3");
        assert_eq!(get("mmm"), "Mar");
        assert_eq!(get("mmmm"), "March");
        assert_eq!(get("dd"), "05");
        assert_eq!(get("ddd"), "Thu");
        assert_eq!(get("HH"), "21");
        assert_eq!(get("hh"), "09");
        assert_eq!(get("ht"), "PM");
        assert_eq!(get("MM"), "07");
        assert_eq!(get("SS"), "04");
    }

    #[test]
    fn test_midnight_is_twelve_am() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let data = datetime_data(&now);
        assert_eq!(data.get_str(&["h"]).as_deref(), Some("12"));
        assert_eq!(data.get_str(&["ht"]).as_deref(), Some("AM"));
    }
}
