//! Register definitions and bitfield structures for the RV-1805-C3 RTC.
//!
//! This module contains the register address map, the configuration keys
//! required by the write-protected registers, bitfield definitions for the
//! control and status registers, and the closed configuration enums used by
//! the driver.

use bitfield::bitfield;

/// Register addresses for the RV-1805-C3 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Hundredths of a second register (0-99)
    Hundredths = 0x00,
    /// Seconds register (0-59)
    Seconds = 0x01,
    /// Minutes register (0-59)
    Minutes = 0x02,
    /// Hours register (0-23)
    Hours = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Months register (1-12)
    Months = 0x05,
    /// Years register (0-99, offset from 2000)
    Years = 0x06,
    /// Weekdays register (0-6)
    Weekdays = 0x07,
    /// Hundredths alarm register
    AlarmHundredths = 0x08,
    /// Seconds alarm register
    AlarmSeconds = 0x09,
    /// Minutes alarm register
    AlarmMinutes = 0x0A,
    /// Hours alarm register
    AlarmHours = 0x0B,
    /// Date alarm register
    AlarmDate = 0x0C,
    /// Months alarm register
    AlarmMonths = 0x0D,
    /// Weekdays alarm register
    AlarmWeekdays = 0x0E,
    /// Status register
    Status = 0x0F,
    /// Control 1 register
    Control1 = 0x10,
    /// Control 2 register
    Control2 = 0x11,
    /// Interrupt mask register
    InterruptMask = 0x12,
    /// Square wave output register
    SquareWave = 0x13,
    /// XT oscillator calibration register
    CalibrationXt = 0x14,
    /// RC oscillator calibration upper register
    CalibrationRcUpper = 0x15,
    /// RC oscillator calibration lower register
    CalibrationRcLower = 0x16,
    /// Sleep control register
    SleepControl = 0x17,
    /// Countdown timer control register
    CountdownControl = 0x18,
    /// Countdown timer current value register
    CountdownTimer = 0x19,
    /// Countdown timer initial value register
    TimerInitialValue = 0x1A,
    /// Watchdog timer register
    WatchdogTimer = 0x1B,
    /// Oscillator control register (write protected)
    OscillatorControl = 0x1C,
    /// Oscillator status register
    OscillatorStatus = 0x1D,
    /// Configuration key register
    ConfigurationKey = 0x1F,
    /// Trickle charge register (write protected)
    TrickleCharge = 0x20,
    /// BREF control register (write protected)
    BrefControl = 0x21,
    /// Cap RC control register (write protected)
    CapRcControl = 0x26,
    /// IO battery mode register (write protected)
    IoBatmode = 0x27,
    /// Identification register 0 (read only)
    Id0 = 0x28,
    /// Identification register 1 (read only)
    Id1 = 0x29,
    /// Analog status register (read only)
    AnalogStatus = 0x2F,
    /// Output control register (write protected)
    OutputControl = 0x30,
}

/// Part number signature read back from the identification registers.
pub const PART_NUMBER: [u8; 2] = [0x18, 0x05];

/// Configuration key values accepted by the configuration key register.
///
/// A protected register only accepts a write if the matching key was written
/// to [`RegAddr::ConfigurationKey`] immediately before, so key and target
/// writes are always issued as a back-to-back pair.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigKey {
    /// Unlocks the oscillator control register
    OscillatorControl = 0xA1,
    /// Triggers a software reset when written
    SoftwareReset = 0x3C,
    /// Unlocks the analog/BREF/IO register bank
    Registers = 0x9D,
}

/// Interrupt sources of the RV-1805-C3.
///
/// The discriminant is the bit position of the source's enable bit in the
/// interrupt mask register, and of its flag bit in the status register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptType {
    /// External interrupt pin
    External = 1,
    /// Alarm match
    Alarm = 2,
    /// Countdown timer
    Timer = 3,
    /// Battery voltage below BREF threshold
    BatteryLow = 4,
    /// Watchdog timer
    Watchdog = 5,
}

impl From<u8> for InterruptType {
    /// Creates an `InterruptType` from a mask register bit position.
    ///
    /// # Panics
    /// Panics if the value is not 1-5.
    fn from(v: u8) -> Self {
        match v {
            1 => InterruptType::External,
            2 => InterruptType::Alarm,
            3 => InterruptType::Timer,
            4 => InterruptType::BatteryLow,
            5 => InterruptType::Watchdog,
            _ => panic!("Invalid value for InterruptType: {}", v),
        }
    }
}
impl From<InterruptType> for u8 {
    /// Converts an `InterruptType` to its mask register bit position.
    fn from(v: InterruptType) -> Self {
        v as u8
    }
}

/// Delay between a sleep request and entering sleep mode.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepWaitPeriod {
    /// Enter sleep immediately
    Immediately = 0b000,
    /// Wait about 8 ms before sleeping
    Ms8 = 0b001,
    /// Wait about 16 ms before sleeping
    Ms16 = 0b010,
    /// Wait about 24 ms before sleeping
    Ms24 = 0b011,
    /// Wait about 32 ms before sleeping
    Ms32 = 0b100,
    /// Wait about 40 ms before sleeping
    Ms40 = 0b101,
    /// Wait about 48 ms before sleeping
    Ms48 = 0b110,
    /// Wait about 56 ms before sleeping
    Ms56 = 0b111,
}

impl From<u8> for SleepWaitPeriod {
    /// Creates a `SleepWaitPeriod` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0b000-0b111.
    fn from(v: u8) -> Self {
        match v {
            0b000 => SleepWaitPeriod::Immediately,
            0b001 => SleepWaitPeriod::Ms8,
            0b010 => SleepWaitPeriod::Ms16,
            0b011 => SleepWaitPeriod::Ms24,
            0b100 => SleepWaitPeriod::Ms32,
            0b101 => SleepWaitPeriod::Ms40,
            0b110 => SleepWaitPeriod::Ms48,
            0b111 => SleepWaitPeriod::Ms56,
            _ => panic!("Invalid value for SleepWaitPeriod: {}", v),
        }
    }
}
impl From<SleepWaitPeriod> for u8 {
    /// Converts a `SleepWaitPeriod` to its raw register value.
    fn from(v: SleepWaitPeriod) -> Self {
        v as u8
    }
}

/// Signal sources selectable for the PSW/nIRQ2 power switch pin.
///
/// Note that 0b010 is not a defined function on this part.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerSwitchFunction {
    /// Inverse of the combined interrupt signal
    InverseCombinedIrq = 0b000,
    /// Square wave output
    SquareWave = 0b001,
    /// Inverse of the alarm interrupt signal
    InverseAlarmIrq = 0b011,
    /// Timer interrupt signal
    TimerIrq = 0b100,
    /// Inverse of the timer interrupt signal
    InverseTimerIrq = 0b101,
    /// Sleep mode indication
    Sleep = 0b110,
    /// Static output level driven from control 1
    Static = 0b111,
}

impl From<u8> for PowerSwitchFunction {
    /// Creates a `PowerSwitchFunction` from a raw register field value.
    ///
    /// # Panics
    /// Panics if the value is 0b010 or larger than 0b111.
    fn from(v: u8) -> Self {
        match v {
            0b000 => PowerSwitchFunction::InverseCombinedIrq,
            0b001 => PowerSwitchFunction::SquareWave,
            0b011 => PowerSwitchFunction::InverseAlarmIrq,
            0b100 => PowerSwitchFunction::TimerIrq,
            0b101 => PowerSwitchFunction::InverseTimerIrq,
            0b110 => PowerSwitchFunction::Sleep,
            0b111 => PowerSwitchFunction::Static,
            _ => panic!("Invalid value for PowerSwitchFunction: {}", v),
        }
    }
}
impl From<PowerSwitchFunction> for u8 {
    /// Converts a `PowerSwitchFunction` to its raw register field value.
    fn from(v: PowerSwitchFunction) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ident) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                $typ(v)
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Status register (0x0F).
    ///
    /// Bits 1-5 are the interrupt flag field returned by
    /// [`clear_interrupts`](crate::RV1805C3::clear_interrupts); bit 0 is the
    /// secondary external flag, which the driver leaves untouched.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    pub century_carry, set_century_carry: 7;
    pub battery_power, set_battery_power: 6;
    pub watchdog_flag, set_watchdog_flag: 5;
    pub battery_low_flag, set_battery_low_flag: 4;
    pub timer_flag, set_timer_flag: 3;
    pub alarm_flag, set_alarm_flag: 2;
    pub external_flag, set_external_flag: 1;
    pub external1_flag, set_external1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Control 1 register (0x10).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control1(u8);
    impl Debug;
    pub stop, set_stop: 7;
    pub twelve_hour, set_twelve_hour: 6;
    pub static_output, set_static_output: 5;
    pub square_output, set_square_output: 4;
    pub reset_polarity, set_reset_polarity: 3;
    pub auto_reset, set_auto_reset: 2;
    pub power_switch_strong, set_power_switch_strong: 1;
    pub write_rtc, set_write_rtc: 0;
}
from_register_u8!(Control1);

bitfield! {
    /// Control 2 register (0x11).
    ///
    /// The 3-bit `out2_function` field selects the PSW/nIRQ2 pin source, see
    /// [`PowerSwitchFunction`].
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control2(u8);
    impl Debug;
    pub reset_in_sleep, set_reset_in_sleep: 5;
    pub out2_function, set_out2_function: 4, 2;
    pub out1_function, set_out1_function: 1, 0;
}
from_register_u8!(Control2);

bitfield! {
    /// Interrupt mask register (0x12).
    ///
    /// Enable bit positions match the [`InterruptType`] discriminants.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct InterruptMask(u8);
    impl Debug;
    pub century_enable, set_century_enable: 7;
    pub watchdog_enable, set_watchdog_enable: 5;
    pub battery_low_enable, set_battery_low_enable: 4;
    pub timer_enable, set_timer_enable: 3;
    pub alarm_enable, set_alarm_enable: 2;
    pub external_enable, set_external_enable: 1;
    pub external1_enable, set_external1_enable: 0;
}
from_register_u8!(InterruptMask);

impl InterruptMask {
    /// Sets or clears the enable bit for one interrupt source.
    pub fn set_enabled(&mut self, interrupt: InterruptType, enabled: bool) {
        match interrupt {
            InterruptType::External => self.set_external_enable(enabled),
            InterruptType::Alarm => self.set_alarm_enable(enabled),
            InterruptType::Timer => self.set_timer_enable(enabled),
            InterruptType::BatteryLow => self.set_battery_low_enable(enabled),
            InterruptType::Watchdog => self.set_watchdog_enable(enabled),
        }
    }

    /// Returns whether one interrupt source is enabled.
    pub fn enabled(&self, interrupt: InterruptType) -> bool {
        match interrupt {
            InterruptType::External => self.external_enable(),
            InterruptType::Alarm => self.alarm_enable(),
            InterruptType::Timer => self.timer_enable(),
            InterruptType::BatteryLow => self.battery_low_enable(),
            InterruptType::Watchdog => self.watchdog_enable(),
        }
    }
}

bitfield! {
    /// Sleep control register (0x17).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct SleepControl(u8);
    impl Debug;
    pub sleep_request, set_sleep_request: 7;
    pub from into SleepWaitPeriod, sleep_wait, set_sleep_wait: 2, 0;
}
from_register_u8!(SleepControl);

bitfield! {
    /// Countdown timer control register (0x18).
    ///
    /// Holds both the countdown timer configuration and, in bits 4:2, the
    /// alarm repeat field written by
    /// [`set_alarm_mode`](crate::RV1805C3::set_alarm_mode).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct CountdownControl(u8);
    impl Debug;
    pub timer_enable, set_timer_enable: 7;
    pub timer_interrupt_level, set_timer_interrupt_level: 6;
    pub timer_repeat, set_timer_repeat: 5;
    pub alarm_repeat, set_alarm_repeat: 4, 2;
    pub timer_frequency, set_timer_frequency: 1, 0;
}
from_register_u8!(CountdownControl);

bitfield! {
    /// Oscillator control register (0x1C, write protected).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct OscillatorControl(u8);
    impl Debug;
    pub rc_oscillator, set_rc_oscillator: 7;
    pub autocalibration, set_autocalibration: 6, 5;
    pub backup_switchover, set_backup_switchover: 4;
    pub failure_switchover, set_failure_switchover: 3;
    pub sleep_interface_disable, set_sleep_interface_disable: 2;
    pub failure_interrupt_enable, set_failure_interrupt_enable: 1;
    pub autocal_fail_interrupt_enable, set_autocal_fail_interrupt_enable: 0;
}
from_register_u8!(OscillatorControl);

bitfield! {
    /// Oscillator status register (0x1D).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct OscillatorStatus(u8);
    impl Debug;
    pub crystal_calibration, set_crystal_calibration: 7, 6;
    pub power_switch_lock, set_power_switch_lock: 5;
    pub oscillator_mode, set_oscillator_mode: 4;
    pub oscillator_failure, set_oscillator_failure: 1;
    pub autocalibration_failure, set_autocalibration_failure: 0;
}
from_register_u8!(OscillatorStatus);

bitfield! {
    /// Interrupt flags captured and cleared by
    /// [`clear_interrupts`](crate::RV1805C3::clear_interrupts).
    ///
    /// This is the compact view of status bits 1-5, shifted down so the flag
    /// positions line up with [`InterruptType`] minus one.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct InterruptFlags(u8);
    impl Debug;
    pub watchdog, set_watchdog: 4;
    pub battery_low, set_battery_low: 3;
    pub timer, set_timer: 2;
    pub alarm, set_alarm: 1;
    pub external, set_external: 0;
}
from_register_u8!(InterruptFlags);

impl InterruptFlags {
    /// Returns true if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_mask_bit_positions() {
        let mut mask = InterruptMask::default();
        mask.set_enabled(InterruptType::External, true);
        assert_eq!(mask.0, 1 << 1);
        mask.set_enabled(InterruptType::Watchdog, true);
        assert_eq!(mask.0, (1 << 1) | (1 << 5));
        mask.set_enabled(InterruptType::External, false);
        assert_eq!(mask.0, 1 << 5);
        assert!(mask.enabled(InterruptType::Watchdog));
        assert!(!mask.enabled(InterruptType::Alarm));
    }

    #[test]
    fn test_countdown_control_fields() {
        let mut control = CountdownControl(0);
        control.set_timer_enable(true);
        control.set_timer_repeat(true);
        control.set_alarm_repeat(0b101);
        control.set_timer_frequency(0b10);
        assert_eq!(control.0, 0b1011_0110);
        // Rewriting the timer fields must not disturb the alarm repeat field
        control.set_timer_enable(false);
        control.set_timer_frequency(0b11);
        assert_eq!(control.alarm_repeat(), 0b101);
    }

    #[test]
    fn test_sleep_wait_period_roundtrip() {
        for raw in 0..=7u8 {
            let period = SleepWaitPeriod::from(raw);
            assert_eq!(u8::from(period), raw);
        }
    }

    #[test]
    fn test_power_switch_function_values() {
        assert_eq!(u8::from(PowerSwitchFunction::InverseCombinedIrq), 0b000);
        assert_eq!(u8::from(PowerSwitchFunction::Static), 0b111);
        assert_eq!(PowerSwitchFunction::from(0b110), PowerSwitchFunction::Sleep);
    }

    #[test]
    #[should_panic]
    fn test_power_switch_function_invalid() {
        let _ = PowerSwitchFunction::from(0b010);
    }

    #[test]
    fn test_interrupt_flags_accessors() {
        let flags = InterruptFlags(0b1_1111);
        assert!(flags.external());
        assert!(flags.alarm());
        assert!(flags.timer());
        assert!(flags.battery_low());
        assert!(flags.watchdog());
        assert!(!flags.is_empty());
        assert!(InterruptFlags::default().is_empty());
    }
}
