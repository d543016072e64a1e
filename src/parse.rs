//! Fixed-offset date string parsers.
//!
//! Both input formats are parsed positionally, the way the chip-facing
//! firmware consumes them: every field sits at a fixed byte offset, so the
//! only scanning needed is an up-front length check. Two formats are
//! supported:
//!
//! - an ISO 8601 style timestamp, `2018-01-01T08:00:00` (anything after the
//!   seconds field, such as fractional seconds or a zone designator, is
//!   ignored);
//! - an RFC 1123 style HTTP date, `Tue, 04 May 2021 08:09:10 GMT`,
//!   optionally prefixed with its `Date: ` header label.
//!
//! Malformed input is reported via [`ParseError`] rather than read past.

use crate::datetime::{DateTime, DateTimeError};

/// Errors that can occur while parsing a date string.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The input is shorter than the fixed field layout requires
    TooShort,
    /// A position that must hold a decimal digit does not
    InvalidDigit,
    /// The extracted fields failed range validation
    DateTime(DateTimeError),
}

impl From<DateTimeError> for ParseError {
    fn from(e: DateTimeError) -> Self {
        ParseError::DateTime(e)
    }
}

/// Reads the two-digit decimal field starting at `index`.
fn two_digits(bytes: &[u8], index: usize) -> Result<u8, ParseError> {
    let tens = bytes[index];
    let ones = bytes[index + 1];
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return Err(ParseError::InvalidDigit);
    }
    Ok((tens - b'0') * 10 + (ones - b'0'))
}

impl DateTime {
    /// Parses an ISO 8601 style timestamp, e.g. `2018-01-01T08:00:00`.
    ///
    /// The six two-digit fields are taken from their fixed offsets; trailing
    /// fractional seconds or time zone text is ignored. The format carries
    /// no day of week, so the weekday is set to Sunday (0) and is only
    /// correct by coincidence; hundredths are 0.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooShort`] for inputs under 19 bytes,
    /// [`ParseError::InvalidDigit`] for non-digit field characters, and a
    /// nested [`DateTimeError`] when a field parses but is out of range.
    pub fn from_iso8601(s: &str) -> Result<Self, ParseError> {
        let bytes = s.as_bytes();
        if bytes.len() < 19 {
            return Err(ParseError::TooShort);
        }
        let year = 2000 + u16::from(two_digits(bytes, 2)?);
        let month = two_digits(bytes, 5)?;
        let day = two_digits(bytes, 8)?;
        let hour = two_digits(bytes, 11)?;
        let minute = two_digits(bytes, 14)?;
        let second = two_digits(bytes, 17)?;
        Ok(DateTime::new(year, month, day, 0, hour, minute, second, 0)?)
    }

    /// Parses an RFC 1123 style HTTP date, e.g.
    /// `Tue, 04 May 2021 08:09:10 GMT`, with or without a leading `Date: `
    /// header label.
    ///
    /// Weekday and month abbreviations are resolved by their distinguishing
    /// letters; unmatched first letters fall back to Friday and December
    /// respectively. Exact RFC 1123 spacing is assumed, since every field is
    /// read from a fixed offset. Hundredths are 0.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooShort`] if the fixed layout does not fit,
    /// [`ParseError::InvalidDigit`] for non-digit numeric fields, and a
    /// nested [`DateTimeError`] for out-of-range field values.
    pub fn from_http_date(s: &str) -> Result<Self, ParseError> {
        let bytes = s.as_bytes();
        // A leading 'D' means the "Date: " label is present
        let cursor = if bytes.first() == Some(&b'D') { 6 } else { 0 };
        if bytes.len() < cursor + 25 {
            return Err(ParseError::TooShort);
        }

        let weekday = match bytes[cursor] {
            // Tue or Thu
            b'T' => {
                if bytes[cursor + 1] == b'u' {
                    2
                } else {
                    4
                }
            }
            // Sat or Sun
            b'S' => {
                if bytes[cursor + 1] == b'a' {
                    6
                } else {
                    0
                }
            }
            b'M' => 1,
            b'W' => 3,
            _ => 5,
        };

        let day = two_digits(bytes, cursor + 5)?;

        let month = match bytes[cursor + 8] {
            // Jan, Jun, or Jul
            b'J' => {
                if bytes[cursor + 9] == b'a' {
                    1
                } else if bytes[cursor + 10] == b'n' {
                    6
                } else {
                    7
                }
            }
            b'F' => 2,
            // Mar or May
            b'M' => {
                if bytes[cursor + 10] == b'r' {
                    3
                } else {
                    5
                }
            }
            // Apr or Aug
            b'A' => {
                if bytes[cursor + 9] == b'p' {
                    4
                } else {
                    8
                }
            }
            b'S' => 9,
            b'O' => 10,
            b'N' => 11,
            _ => 12,
        };

        let year = 2000 + u16::from(two_digits(bytes, cursor + 14)?);
        let hour = two_digits(bytes, cursor + 17)?;
        let minute = two_digits(bytes, cursor + 20)?;
        let second = two_digits(bytes, cursor + 23)?;
        Ok(DateTime::new(
            year, month, day, weekday, hour, minute, second, 0,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_basic() {
        let dt = DateTime::from_iso8601("2021-05-04T08:09:10").unwrap();
        assert_eq!(dt.year(), 2021);
        assert_eq!(dt.month(), 5);
        assert_eq!(dt.day(), 4);
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 9);
        assert_eq!(dt.second(), 10);
        assert_eq!(dt.weekday(), 0);
        assert_eq!(dt.hundredth(), 0);
    }

    #[test]
    fn test_iso8601_ignores_trailing_text() {
        let dt = DateTime::from_iso8601("2018-01-01T08:00:00.123+08:00").unwrap();
        assert_eq!(dt.year(), 2018);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 0);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.hundredth(), 0);
    }

    #[test]
    fn test_iso8601_too_short() {
        assert_eq!(
            DateTime::from_iso8601("2021-05-04T08:09").unwrap_err(),
            ParseError::TooShort
        );
        assert_eq!(DateTime::from_iso8601("").unwrap_err(), ParseError::TooShort);
    }

    #[test]
    fn test_iso8601_non_digit() {
        assert_eq!(
            DateTime::from_iso8601("2021-0x-04T08:09:10").unwrap_err(),
            ParseError::InvalidDigit
        );
    }

    #[test]
    fn test_iso8601_out_of_range_field() {
        assert_eq!(
            DateTime::from_iso8601("2021-13-04T08:09:10").unwrap_err(),
            ParseError::DateTime(DateTimeError::InvalidDateTime("month must be 1-12"))
        );
        assert!(DateTime::from_iso8601("2021-05-04T25:09:10").is_err());
    }

    #[test]
    fn test_http_date_basic() {
        let dt = DateTime::from_http_date("Tue, 04 May 2021 08:09:10 GMT").unwrap();
        assert_eq!(dt.weekday(), 2);
        assert_eq!(dt.day(), 4);
        assert_eq!(dt.month(), 5);
        assert_eq!(dt.year(), 2021);
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 9);
        assert_eq!(dt.second(), 10);
        assert_eq!(dt.hundredth(), 0);
    }

    #[test]
    fn test_http_date_with_header_label() {
        let plain = DateTime::from_http_date("Tue, 04 May 2021 08:09:10 GMT").unwrap();
        let labeled = DateTime::from_http_date("Date: Tue, 04 May 2021 08:09:10 GMT").unwrap();
        assert_eq!(plain, labeled);
    }

    #[test]
    fn test_http_date_weekdays() {
        let cases = [
            ("Sun, 02 May 2021 00:00:00 GMT", 0),
            ("Mon, 03 May 2021 00:00:00 GMT", 1),
            ("Tue, 04 May 2021 00:00:00 GMT", 2),
            ("Wed, 05 May 2021 00:00:00 GMT", 3),
            ("Thu, 06 May 2021 00:00:00 GMT", 4),
            ("Fri, 07 May 2021 00:00:00 GMT", 5),
            ("Sat, 08 May 2021 00:00:00 GMT", 6),
        ];
        for (input, weekday) in cases {
            let dt = DateTime::from_http_date(input).unwrap();
            assert_eq!(dt.weekday(), weekday, "weekday of {}", input);
        }
    }

    #[test]
    fn test_http_date_months() {
        let cases = [
            ("Fri, 01 Jan 2021 00:00:00 GMT", 1),
            ("Mon, 01 Feb 2021 00:00:00 GMT", 2),
            ("Mon, 01 Mar 2021 00:00:00 GMT", 3),
            ("Thu, 01 Apr 2021 00:00:00 GMT", 4),
            ("Sat, 01 May 2021 00:00:00 GMT", 5),
            ("Tue, 01 Jun 2021 00:00:00 GMT", 6),
            ("Thu, 01 Jul 2021 00:00:00 GMT", 7),
            ("Sun, 01 Aug 2021 00:00:00 GMT", 8),
            ("Wed, 01 Sep 2021 00:00:00 GMT", 9),
            ("Fri, 01 Oct 2021 00:00:00 GMT", 10),
            ("Mon, 01 Nov 2021 00:00:00 GMT", 11),
            ("Wed, 01 Dec 2021 00:00:00 GMT", 12),
        ];
        for (input, month) in cases {
            let dt = DateTime::from_http_date(input).unwrap();
            assert_eq!(dt.month(), month, "month of {}", input);
        }
    }

    #[test]
    fn test_http_date_too_short() {
        assert_eq!(
            DateTime::from_http_date("Tue, 04 May 2021").unwrap_err(),
            ParseError::TooShort
        );
        // The label consumes six bytes of the fixed layout
        assert_eq!(
            DateTime::from_http_date("Date: Tue, 04 May 2021 08:0").unwrap_err(),
            ParseError::TooShort
        );
    }

    #[test]
    fn test_http_date_non_digit_field() {
        assert_eq!(
            DateTime::from_http_date("Tue, xx May 2021 08:09:10 GMT").unwrap_err(),
            ParseError::InvalidDigit
        );
    }

    #[test]
    fn test_http_date_out_of_range_day() {
        assert_eq!(
            DateTime::from_http_date("Tue, 32 May 2021 08:09:10 GMT").unwrap_err(),
            ParseError::DateTime(DateTimeError::InvalidDateTime("day of month must be 1-31"))
        );
    }
}
