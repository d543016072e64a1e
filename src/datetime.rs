//! `DateTime` model and BCD conversion for the RV-1805-C3 RTC.
//!
//! The RV-1805-C3 stores its date and time in 8 consecutive BCD registers,
//! starting at the hundredths register:
//! - Hundredths, Seconds, Minutes, Hours, Date, Months, Years, Weekdays
//!
//! [`DateTime`] is the decoded in-memory form of that block. Every field is
//! validated against its own range on construction; the day of month is
//! deliberately not cross-checked against month or leap year, matching the
//! device (which happily holds February 31).
//!
//! Conversion errors are reported via [`DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Converts a decimal value (0-99) to packed BCD.
///
/// Tens digit in the high nibble, ones digit in the low nibble. Behavior for
/// inputs above 99 is unspecified; callers validate first.
pub fn to_bcd(decimal: u8) -> u8 {
    (decimal / 10 * 16) + (decimal % 10)
}

/// Converts a packed BCD byte back to its decimal value.
pub fn from_bcd(bcd: u8) -> u8 {
    (bcd / 16 * 10) + (bcd % 16)
}

/// Errors that can occur during date/time validation or conversion.
#[derive(Debug, PartialEq)]
pub enum DateTimeError {
    /// A field is outside its valid range; the message names the field
    InvalidDateTime(&'static str),
    /// The year is not after 1999 (this driver only supports years >= 2000)
    YearNotAfter1999,
    /// The year is not before 2100 (no century rollover support)
    YearNotBefore2100,
}

/// One field of a [`DateTime`], in device register order.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeComponent {
    /// Hundredths of a second (0-99)
    Hundredth = 0,
    /// Seconds (0-59)
    Second = 1,
    /// Minutes (0-59)
    Minute = 2,
    /// Hours (0-23)
    Hour = 3,
    /// Day of month (1-31)
    DayOfMonth = 4,
    /// Month (1-12)
    Month = 5,
    /// Year as an offset from 2000 (0-99)
    Year = 6,
    /// Day of week (0-6, 0 = Sunday)
    Weekday = 7,
}

/// A validated date and time as held by the RV-1805-C3.
///
/// Construction goes through [`DateTime::new`], the string parsers, the
/// chrono conversion, or [`DateTime::from_registers`]; all of them enforce
/// the per-field ranges, so an instance always encodes to valid BCD.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DateTime {
    hundredth: u8,
    second: u8,
    minute: u8,
    hour: u8,
    day: u8,
    month: u8,
    year: u16,
    weekday: u8,
}

impl DateTime {
    /// Creates a `DateTime` from individual fields.
    ///
    /// Fields are validated in the order year, month, day of month, day of
    /// week, hour, minute, second, hundredth; the first out-of-range field
    /// is reported and nothing is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::YearNotAfter1999`] or
    /// [`DateTimeError::YearNotBefore2100`] for years outside 2000-2099,
    /// and [`DateTimeError::InvalidDateTime`] for any other range failure.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        weekday: u8,
        hour: u8,
        minute: u8,
        second: u8,
        hundredth: u8,
    ) -> Result<Self, DateTimeError> {
        if year < 2000 {
            return Err(DateTimeError::YearNotAfter1999);
        }
        if year > 2099 {
            return Err(DateTimeError::YearNotBefore2100);
        }
        if month < 1 || month > 12 {
            return Err(DateTimeError::InvalidDateTime("month must be 1-12"));
        }
        // Not checked against the month; the device accepts February 31
        if day < 1 || day > 31 {
            return Err(DateTimeError::InvalidDateTime("day of month must be 1-31"));
        }
        if weekday > 6 {
            return Err(DateTimeError::InvalidDateTime("day of week must be 0-6"));
        }
        if hour > 23 {
            return Err(DateTimeError::InvalidDateTime("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(DateTimeError::InvalidDateTime("minute must be 0-59"));
        }
        if second > 59 {
            return Err(DateTimeError::InvalidDateTime("second must be 0-59"));
        }
        if hundredth > 99 {
            return Err(DateTimeError::InvalidDateTime("hundredth must be 0-99"));
        }
        Ok(Self {
            hundredth,
            second,
            minute,
            hour,
            day,
            month,
            year,
            weekday,
        })
    }

    /// Decodes the 8 BCD registers read from the device, hundredths first.
    ///
    /// # Errors
    ///
    /// Returns an error if the register contents decode to an out-of-range
    /// field, so corrupt data read back from the device is reported instead
    /// of silently carried.
    pub fn from_registers(data: [u8; 8]) -> Result<Self, DateTimeError> {
        Self::new(
            2000 + u16::from(from_bcd(data[6])),
            from_bcd(data[5]),
            from_bcd(data[4]),
            from_bcd(data[7]),
            from_bcd(data[3]),
            from_bcd(data[2]),
            from_bcd(data[1]),
            from_bcd(data[0]),
        )
    }

    /// Encodes to the 8 BCD registers in device order, hundredths first.
    pub fn to_registers(&self) -> [u8; 8] {
        [
            to_bcd(self.hundredth),
            to_bcd(self.second),
            to_bcd(self.minute),
            to_bcd(self.hour),
            to_bcd(self.day),
            to_bcd(self.month),
            to_bcd((self.year - 2000) as u8),
            to_bcd(self.weekday),
        ]
    }

    /// Overwrites a single field, leaving the rest untouched.
    ///
    /// The year is passed as an offset from 2000 (0-99), matching its
    /// register representation.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::InvalidDateTime`] if the value is outside
    /// the field's range.
    pub fn set_component(
        &mut self,
        component: DateTimeComponent,
        value: u8,
    ) -> Result<(), DateTimeError> {
        match component {
            DateTimeComponent::Hundredth => {
                if value > 99 {
                    return Err(DateTimeError::InvalidDateTime("hundredth must be 0-99"));
                }
                self.hundredth = value;
            }
            DateTimeComponent::Second => {
                if value > 59 {
                    return Err(DateTimeError::InvalidDateTime("second must be 0-59"));
                }
                self.second = value;
            }
            DateTimeComponent::Minute => {
                if value > 59 {
                    return Err(DateTimeError::InvalidDateTime("minute must be 0-59"));
                }
                self.minute = value;
            }
            DateTimeComponent::Hour => {
                if value > 23 {
                    return Err(DateTimeError::InvalidDateTime("hour must be 0-23"));
                }
                self.hour = value;
            }
            DateTimeComponent::DayOfMonth => {
                if value < 1 || value > 31 {
                    return Err(DateTimeError::InvalidDateTime("day of month must be 1-31"));
                }
                self.day = value;
            }
            DateTimeComponent::Month => {
                if value < 1 || value > 12 {
                    return Err(DateTimeError::InvalidDateTime("month must be 1-12"));
                }
                self.month = value;
            }
            DateTimeComponent::Year => {
                if value > 99 {
                    return Err(DateTimeError::InvalidDateTime("year offset must be 0-99"));
                }
                self.year = 2000 + u16::from(value);
            }
            DateTimeComponent::Weekday => {
                if value > 6 {
                    return Err(DateTimeError::InvalidDateTime("day of week must be 0-6"));
                }
                self.weekday = value;
            }
        }
        Ok(())
    }

    /// Full year (2000-2099).
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Month (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of month (1-31).
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Day of week (0-6, 0 = Sunday).
    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    /// Hour (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second (0-59).
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Hundredths of a second (0-99).
    pub fn hundredth(&self) -> u8 {
        self.hundredth
    }
}

impl From<&DateTime> for [u8; 8] {
    fn from(dt: &DateTime) -> [u8; 8] {
        dt.to_registers()
    }
}

/// Renders `YYYY-MM-DDTHH:MM:SS`, a fresh 19 character timestamp per call.
impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl TryFrom<&DateTime> for NaiveDateTime {
    type Error = DateTimeError;

    /// Converts to a chrono `NaiveDateTime`, sub-second as milliseconds.
    ///
    /// # Errors
    ///
    /// Fails for field combinations that are not calendar dates (the device
    /// model allows February 31, chrono does not).
    fn try_from(dt: &DateTime) -> Result<Self, Self::Error> {
        let date =
            NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
                .ok_or(DateTimeError::InvalidDateTime("not a calendar date"))?;
        let time = NaiveTime::from_hms_milli_opt(
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
            u32::from(dt.hundredth) * 10,
        )
        .ok_or(DateTimeError::InvalidDateTime("not a valid time of day"))?;
        Ok(NaiveDateTime::new(date, time))
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = DateTimeError;

    /// Converts from a chrono `NaiveDateTime`.
    ///
    /// The weekday is derived from the date; sub-second precision is
    /// truncated to hundredths.
    ///
    /// # Errors
    ///
    /// Fails for years outside the 2000-2099 window.
    fn try_from(dt: NaiveDateTime) -> Result<Self, Self::Error> {
        if dt.year() < 2000 {
            return Err(DateTimeError::YearNotAfter1999);
        }
        if dt.year() > 2099 {
            return Err(DateTimeError::YearNotBefore2100);
        }
        Self::new(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.weekday().num_days_from_sunday() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            // nanosecond() exceeds 1e9 on a leap second; clamp to the field
            ((dt.nanosecond() / 10_000_000).min(99)) as u8,
        )
    }
}
