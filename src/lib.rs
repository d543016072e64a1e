#![no_std]
//! A platform-agnostic driver for the RV-1805-C3 extreme low power
//! real-time clock.
//!
//! The RV-1805-C3 keeps time in hundredths of a second through years
//! (2000-2099) in battery-backed BCD registers, and provides an alarm with
//! ten repeat modes, a countdown timer, five maskable interrupt sources, a
//! switchable crystal/RC oscillator and a configurable power switch output.
//! Some control registers are write protected and only accept a value
//! immediately after a matching key byte is written to the configuration
//! key register; the driver issues those pairs back to back.
//!
//! The driver is `no_std` and talks to the device through an
//! [`embedded_hal::i2c::I2c`] implementation. An async variant with the
//! same surface is available in [`asynch`] behind the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use rv1805c3::RV1805C3;
//!
//! let mut rtc = RV1805C3::new(i2c);
//! rtc.init()?;
//!
//! // Set the clock from an HTTP Date header and read it back
//! rtc.set_datetime_from_http_date("Tue, 04 May 2021 08:09:10 GMT")?;
//! let now = rtc.datetime()?;
//! ```

use embedded_hal::i2c::I2c;

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    }};
}

mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
mod datetime;
mod parse;
mod registers;

pub use alarm::{AlarmMode, CountdownUnit};
pub use datetime::{from_bcd, to_bcd, DateTime, DateTimeComponent, DateTimeError};
pub use parse::ParseError;
pub use registers::{
    ConfigKey, Control1, Control2, CountdownControl, InterruptFlags, InterruptMask, InterruptType,
    OscillatorControl, OscillatorStatus, PowerSwitchFunction, RegAddr, SleepControl,
    SleepWaitPeriod, Status, PART_NUMBER,
};

/// Fixed I2C bus address of the RV-1805-C3.
pub const DEVICE_ADDRESS: u8 = 0x69;

/// Errors returned by the driver.
#[derive(Debug)]
pub enum RV1805C3Error<I2CE> {
    /// An error on the underlying I2C bus
    I2c(I2CE),
    /// A date/time field failed range validation
    DateTime(DateTimeError),
    /// A date string failed to parse
    Parse(ParseError),
    /// The identification registers did not return the RV-1805-C3 signature
    UnknownDevice,
}

impl<I2CE> From<I2CE> for RV1805C3Error<I2CE> {
    fn from(e: I2CE) -> Self {
        RV1805C3Error::I2c(e)
    }
}

/// RV-1805-C3 real-time clock driver.
///
/// Owns the bus handle; every operation is a blocking read-modify-write on
/// the device registers. The driver itself holds no date/time state, so
/// each call works from a fresh register snapshot.
pub struct RV1805C3<I2C: I2c> {
    i2c: I2C,
}

impl<I2C: I2c> RV1805C3<I2C> {
    /// Creates a new driver instance from an I2C bus implementation.
    ///
    /// The device address is fixed in hardware, see [`DEVICE_ADDRESS`].
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Releases the underlying I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Checks the part identification and applies the recommended power-up
    /// configuration.
    ///
    /// Reads the two identification registers and requires the RV-1805-C3
    /// signature, then enables automatic oscillator switching and reduces
    /// backup-power leakage.
    ///
    /// # Errors
    ///
    /// Returns [`RV1805C3Error::UnknownDevice`] if the signature does not
    /// match, or an I2C error from the bus.
    pub fn init(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let id = self.part_number()?;
        debug!("RV1805C3: id registers {:02x} {:02x}", id[0], id[1]);
        if id != PART_NUMBER {
            return Err(RV1805C3Error::UnknownDevice);
        }
        self.enable_oscillator_switching()?;
        self.reduce_leakage()
    }

    /// Reads the two read-only identification registers.
    pub fn part_number(&mut self) -> Result<[u8; 2], RV1805C3Error<I2C::Error>> {
        let mut id = [0u8; 2];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Id0 as u8], &mut id)?;
        Ok(id)
    }

    fn read_register(&mut self, register: RegAddr) -> Result<u8, RV1805C3Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[register as u8], &mut data)?;
        Ok(data[0])
    }

    fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.i2c.write(DEVICE_ADDRESS, &[register as u8, value])?;
        Ok(())
    }

    /// Writes a protected register, preceded by its configuration key.
    ///
    /// The key's validity window is chip internal and does not survive an
    /// intervening register access, so the two writes are issued back to
    /// back. There is no unlock-once mode.
    fn write_protected(
        &mut self,
        key: ConfigKey,
        register: RegAddr,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.write_register(RegAddr::ConfigurationKey, key as u8)?;
        self.write_register(register, value)
    }

    /// Reads the current date and time from the device.
    pub fn datetime(&mut self) -> Result<DateTime, RV1805C3Error<I2C::Error>> {
        let mut data = [0u8; 8];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Hundredths as u8], &mut data)?;
        DateTime::from_registers(data).map_err(RV1805C3Error::DateTime)
    }

    /// Writes a date and time to the live clock registers in one
    /// transaction, starting at the hundredths register.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), RV1805C3Error<I2C::Error>> {
        let data: [u8; 8] = datetime.into();
        debug!("RV1805C3: writing clock registers {:02x?}", data);
        self.i2c.write(
            DEVICE_ADDRESS,
            &[
                RegAddr::Hundredths as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
                data[7],
            ],
        )?;
        Ok(())
    }

    /// Updates a single date/time field on the device.
    ///
    /// Reads a fresh snapshot of the clock registers, replaces one field and
    /// writes the full record back, so the update is never based on a stale
    /// in-memory copy. The year is passed as an offset from 2000.
    pub fn set_component(
        &mut self,
        component: DateTimeComponent,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut datetime = self.datetime()?;
        datetime
            .set_component(component, value)
            .map_err(RV1805C3Error::DateTime)?;
        self.set_datetime(&datetime)
    }

    /// Parses an ISO 8601 timestamp and writes it to the clock registers.
    ///
    /// The weekday is set to Sunday, see [`DateTime::from_iso8601`].
    pub fn set_datetime_from_iso8601(&mut self, s: &str) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_iso8601(s).map_err(RV1805C3Error::Parse)?;
        self.set_datetime(&datetime)
    }

    /// Parses an HTTP date string and writes it to the clock registers.
    pub fn set_datetime_from_http_date(
        &mut self,
        s: &str,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_http_date(s).map_err(RV1805C3Error::Parse)?;
        self.set_datetime(&datetime)
    }

    /// Writes a date and time to the alarm compare registers in one
    /// transaction, starting at the hundredths alarm register.
    ///
    /// Which fields take part in the comparison is governed by the repeat
    /// mode, see [`set_alarm_mode`](Self::set_alarm_mode).
    pub fn set_alarm(&mut self, datetime: &DateTime) -> Result<(), RV1805C3Error<I2C::Error>> {
        let data: [u8; 8] = datetime.into();
        self.i2c.write(
            DEVICE_ADDRESS,
            &[
                RegAddr::AlarmHundredths as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
                data[7],
            ],
        )?;
        Ok(())
    }

    /// Parses an ISO 8601 timestamp and writes it to the alarm compare
    /// registers.
    pub fn set_alarm_from_iso8601(&mut self, s: &str) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_iso8601(s).map_err(RV1805C3Error::Parse)?;
        self.set_alarm(&datetime)
    }

    /// Parses an HTTP date string and writes it to the alarm compare
    /// registers.
    pub fn set_alarm_from_http_date(&mut self, s: &str) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_http_date(s).map_err(RV1805C3Error::Parse)?;
        self.set_alarm(&datetime)
    }

    /// Selects the alarm repeat mode.
    ///
    /// The sub-second modes additionally force the hundredths alarm register
    /// to the matching wildcard pattern before enabling the repeat field.
    pub fn set_alarm_mode(&mut self, mode: AlarmMode) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.countdown_control()?;
        if let Some(wildcard) = mode.hundredths_wildcard() {
            self.write_register(RegAddr::AlarmHundredths, wildcard)?;
        }
        control.set_alarm_repeat(mode.repeat_field());
        debug!("RV1805C3: countdown control {:?}", control);
        self.set_countdown_control(control)
    }

    /// Programs and enables the countdown timer.
    ///
    /// The period is written to both the current value and the initial value
    /// register, since the chip reloads from the latter on repeat. With
    /// `interrupt_as_pulse` the timer interrupt is a short pulse instead of
    /// a level held until cleared. A period of 0 is a no-op: no register is
    /// touched.
    pub fn set_countdown_timer(
        &mut self,
        period: u8,
        unit: CountdownUnit,
        repeat: bool,
        interrupt_as_pulse: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        if period == 0 {
            return Ok(());
        }

        // The counter rolls over after period ticks, hence the minus one
        self.write_register(RegAddr::CountdownTimer, period - 1)?;
        self.write_register(RegAddr::TimerInitialValue, period - 1)?;

        let mut control = self.countdown_control()?;
        control.set_timer_frequency(unit.into());
        control.set_timer_interrupt_level(!interrupt_as_pulse);
        control.set_timer_repeat(repeat);
        control.set_timer_enable(true);
        self.set_countdown_control(control)
    }

    /// Enables one interrupt source in the interrupt mask register.
    pub fn enable_interrupt(
        &mut self,
        interrupt: InterruptType,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut mask = self.interrupt_mask()?;
        mask.set_enabled(interrupt, true);
        self.set_interrupt_mask(mask)
    }

    /// Disables one interrupt source in the interrupt mask register.
    pub fn disable_interrupt(
        &mut self,
        interrupt: InterruptType,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut mask = self.interrupt_mask()?;
        mask.set_enabled(interrupt, false);
        self.set_interrupt_mask(mask)
    }

    /// Reads and clears the pending interrupt flags.
    ///
    /// Returns the five flag bits that were set before the call; the century
    /// carry, battery power and secondary external bits of the status
    /// register are preserved.
    pub fn clear_interrupts(&mut self) -> Result<InterruptFlags, RV1805C3Error<I2C::Error>> {
        let status = self.status()?;

        let mut flags = InterruptFlags::default();
        flags.set_external(status.external_flag());
        flags.set_alarm(status.alarm_flag());
        flags.set_timer(status.timer_flag());
        flags.set_battery_low(status.battery_low_flag());
        flags.set_watchdog(status.watchdog_flag());

        let mut cleared = status;
        cleared.set_external_flag(false);
        cleared.set_alarm_flag(false);
        cleared.set_timer_flag(false);
        cleared.set_battery_low_flag(false);
        cleared.set_watchdog_flag(false);
        self.set_status(cleared)?;

        Ok(flags)
    }

    /// Selects the crystal oscillator and disables autocalibration.
    ///
    /// Write protected; the configuration key is sent first.
    pub fn enable_crystal_oscillator(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control()?;
        control.set_rc_oscillator(false);
        control.set_autocalibration(0);
        self.write_protected(
            ConfigKey::OscillatorControl,
            RegAddr::OscillatorControl,
            control.into(),
        )
    }

    /// Runs from the RC oscillator all the time to minimize power usage,
    /// autocalibrating against the crystal every 512 seconds.
    ///
    /// Write protected; the configuration key is sent first.
    pub fn disable_crystal_oscillator(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control()?;
        control.set_rc_oscillator(true);
        control.set_autocalibration(0b11);
        self.write_protected(
            ConfigKey::OscillatorControl,
            RegAddr::OscillatorControl,
            control.into(),
        )
    }

    /// Switches to the RC oscillator automatically on backup power and on
    /// crystal failure.
    pub fn enable_oscillator_switching(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control()?;
        control.set_backup_switchover(true);
        control.set_failure_switchover(true);
        control.set_sleep_interface_disable(false);
        control.set_failure_interrupt_enable(false);
        control.set_autocal_fail_interrupt_enable(false);
        self.set_oscillator_control(control)
    }

    /// Reduces leakage current while running from backup power.
    ///
    /// Disables the I2C interface and the WDI, nRST and CLK/nINT pins when
    /// powered from the backup source or in sleep mode. The IO and output
    /// control registers are in the protected bank, so each write is
    /// preceded by its configuration key.
    pub fn reduce_leakage(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control2()?;
        control.set_reset_in_sleep(false);
        self.set_control2(control)?;

        self.write_protected(ConfigKey::Registers, RegAddr::IoBatmode, 0x00)?;
        self.write_protected(ConfigKey::Registers, RegAddr::OutputControl, 0x30)
    }

    /// Requests sleep mode after the given wait period.
    ///
    /// With `disable_interface` the I2C interface is powered down for the
    /// duration of sleep; use with caution, the device stops responding on
    /// the bus until wakeup.
    pub fn sleep(
        &mut self,
        wait_period: SleepWaitPeriod,
        disable_interface: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        if disable_interface {
            let mut control = self.oscillator_control()?;
            control.set_sleep_interface_disable(true);
            self.write_protected(
                ConfigKey::OscillatorControl,
                RegAddr::OscillatorControl,
                control.into(),
            )?;
        }

        let mut sleep = self.sleep_control()?;
        sleep.set_sleep_request(true);
        sleep.set_sleep_wait(wait_period);
        self.set_sleep_control(sleep)
    }

    /// Selects the signal source driven on the PSW/nIRQ2 power switch pin.
    pub fn set_power_switch_function(
        &mut self,
        function: PowerSwitchFunction,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control2()?;
        control.set_out2_function(function.into());
        self.set_control2(control)
    }

    /// Locks the power switch function against further changes.
    pub fn lock_power_switch(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut status = self.oscillator_status()?;
        status.set_power_switch_lock(true);
        self.set_oscillator_status(status)
    }

    /// Unlocks the power switch function.
    pub fn unlock_power_switch(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut status = self.oscillator_status()?;
        status.set_power_switch_lock(false);
        self.set_oscillator_status(status)
    }

    /// Drives a static level on the power switch pin.
    ///
    /// Only effective with [`PowerSwitchFunction::Static`] selected and the
    /// power switch unlocked, see
    /// [`unlock_power_switch`](Self::unlock_power_switch).
    pub fn set_static_power_switch_output(
        &mut self,
        high: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control1()?;
        control.set_static_output(high);
        self.set_control1(control)
    }

    /// Triggers a software reset by writing the reset key.
    pub fn reset(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.write_register(RegAddr::ConfigurationKey, ConfigKey::SoftwareReset as u8)
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> RV1805C3<I2C> {
            $(
                paste::paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, RV1805C3Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), RV1805C3Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (status, RegAddr::Status, Status),
    (control1, RegAddr::Control1, Control1),
    (control2, RegAddr::Control2, Control2),
    (interrupt_mask, RegAddr::InterruptMask, InterruptMask),
    (sleep_control, RegAddr::SleepControl, SleepControl),
    (countdown_control, RegAddr::CountdownControl, CountdownControl),
    (oscillator_control, RegAddr::OscillatorControl, OscillatorControl),
    (oscillator_status, RegAddr::OscillatorStatus, OscillatorStatus)
);

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    #[test]
    fn test_init_success() {
        let mock = I2cMock::new(&[
            // Identification check
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Id0 as u8], vec![0x18, 0x05]),
            // Oscillator switching on backup power and XT failure
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8],
                vec![0x00],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8, 0b0001_1000],
            ),
            // Leakage reduction: control 2, then the keyed register bank
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x20]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8, 0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ConfigurationKey as u8, 0x9D]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::IoBatmode as u8, 0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ConfigurationKey as u8, 0x9D]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::OutputControl as u8, 0x30]),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.init().unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_init_unknown_device() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Id0 as u8],
            vec![0xFF, 0x00],
        )]);
        let mut rtc = RV1805C3::new(mock);
        assert!(matches!(
            rtc.init().unwrap_err(),
            RV1805C3Error::UnknownDevice
        ));
        rtc.i2c.done();
    }

    #[test]
    fn test_datetime_read_and_render() {
        // 2021-05-04 (Tuesday) 08:09:10.00
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Hundredths as u8],
            vec![0x00, 0x10, 0x09, 0x08, 0x04, 0x05, 0x21, 0x02],
        )]);
        let mut rtc = RV1805C3::new(mock);
        let now = rtc.datetime().unwrap();
        assert_eq!(now.year(), 2021);
        assert_eq!(now.month(), 5);
        assert_eq!(now.day(), 4);
        assert_eq!(now.weekday(), 2);
        assert_eq!(now.second(), 10);
        assert_eq!(now.to_string(), "2021-05-04T08:09:10");
        rtc.i2c.done();
    }

    #[test]
    fn test_datetime_rejects_corrupt_registers() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Hundredths as u8],
            vec![0x00, 0x75, 0x00, 0x00, 0x01, 0x01, 0x21, 0x00],
        )]);
        let mut rtc = RV1805C3::new(mock);
        assert!(matches!(
            rtc.datetime().unwrap_err(),
            RV1805C3Error::DateTime(_)
        ));
        rtc.i2c.done();
    }

    #[test]
    fn test_set_datetime() {
        let datetime = DateTime::new(2021, 5, 4, 2, 8, 9, 10, 0).unwrap();
        let mock = I2cMock::new(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Hundredths as u8,
                0x00,
                0x10,
                0x09,
                0x08,
                0x04,
                0x05,
                0x21,
                0x02,
            ],
        )]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_datetime(&datetime).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_component_uses_fresh_snapshot() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Hundredths as u8],
                vec![0x00, 0x05, 0x09, 0x08, 0x04, 0x05, 0x21, 0x02],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    RegAddr::Hundredths as u8,
                    0x00,
                    0x05,
                    0x21,
                    0x08,
                    0x04,
                    0x05,
                    0x21,
                    0x02,
                ],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_component(DateTimeComponent::Minute, 21).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_datetime_from_iso8601() {
        let mock = I2cMock::new(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Hundredths as u8,
                0x00,
                0x10,
                0x09,
                0x08,
                0x04,
                0x05,
                0x21,
                0x00, // weekday defaults to Sunday
            ],
        )]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_datetime_from_iso8601("2021-05-04T08:09:10").unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_datetime_parse_error_is_reported() {
        let mock = I2cMock::new(&[]);
        let mut rtc = RV1805C3::new(mock);
        assert!(matches!(
            rtc.set_datetime_from_iso8601("2021-05").unwrap_err(),
            RV1805C3Error::Parse(ParseError::TooShort)
        ));
        rtc.i2c.done();
    }

    #[test]
    fn test_set_alarm_from_http_date() {
        let mock = I2cMock::new(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::AlarmHundredths as u8,
                0x00,
                0x10,
                0x09,
                0x08,
                0x04,
                0x05,
                0x21,
                0x02,
            ],
        )]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_alarm_from_http_date("Tue, 04 May 2021 08:09:10 GMT")
            .unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_alarm_mode_once_per_tenth() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8],
                vec![0x00],
            ),
            // Wildcard for any tenth, then repeat field at maximum
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::AlarmHundredths as u8, 0xF0]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8, 0b0001_1100],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_alarm_mode(AlarmMode::OncePerTenth).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_alarm_mode_preserves_timer_bits() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8],
                vec![0b1000_0010],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8, 0b1001_0010],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_alarm_mode(AlarmMode::OncePerDay).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_countdown_timer_zero_is_noop() {
        let mock = I2cMock::new(&[]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_countdown_timer(0, CountdownUnit::Seconds, true, true)
            .unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_countdown_timer() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::CountdownTimer as u8, 9]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::TimerInitialValue as u8, 9]),
            // Alarm repeat field (bits 4:2) must survive the rewrite
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8],
                vec![0b0001_0000],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8, 0b1011_0010],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_countdown_timer(10, CountdownUnit::Seconds, true, true)
            .unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_set_countdown_timer_level_interrupt() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::CountdownTimer as u8, 0]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::TimerInitialValue as u8, 0]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8],
                vec![0x00],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::CountdownControl as u8, 0b1100_0011],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_countdown_timer(1, CountdownUnit::Minutes, false, false)
            .unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_enable_and_disable_interrupt() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::InterruptMask as u8],
                vec![0x00],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::InterruptMask as u8, 1 << 2]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::InterruptMask as u8],
                vec![0xFF],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::InterruptMask as u8, 0xF7]),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.enable_interrupt(InterruptType::Alarm).unwrap();
        rtc.disable_interrupt(InterruptType::Timer).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_clear_interrupts_returns_previous_flags() {
        let mock = I2cMock::new(&[
            // All five flags set, plus century carry
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Status as u8], vec![0b1011_1110]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Status as u8, 0b1000_0000]),
            // Nothing pending on the second call
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Status as u8], vec![0b1000_0000]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Status as u8, 0b1000_0000]),
        ]);
        let mut rtc = RV1805C3::new(mock);

        let flags = rtc.clear_interrupts().unwrap();
        assert!(flags.external());
        assert!(flags.alarm());
        assert!(flags.timer());
        assert!(flags.battery_low());
        assert!(flags.watchdog());

        let flags = rtc.clear_interrupts().unwrap();
        assert!(flags.is_empty());
        rtc.i2c.done();
    }

    #[test]
    fn test_crystal_oscillator_keyed_writes() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8],
                vec![0xFF],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ConfigurationKey as u8, 0xA1]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8, 0b0001_1111],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8],
                vec![0x00],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ConfigurationKey as u8, 0xA1]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8, 0b1110_0000],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.enable_crystal_oscillator().unwrap();
        rtc.disable_crystal_oscillator().unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_sleep() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SleepControl as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::SleepControl as u8, 0b1000_0001]),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.sleep(SleepWaitPeriod::Ms8, false).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_sleep_with_interface_disable() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8],
                vec![0b0001_1000],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ConfigurationKey as u8, 0xA1]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorControl as u8, 0b0001_1100],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SleepControl as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::SleepControl as u8, 0b1000_0000]),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.sleep(SleepWaitPeriod::Immediately, true).unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_power_switch_control() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8, 0b0001_1000]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorStatus as u8],
                vec![0b0010_0000],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::OscillatorStatus as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0b0010_0000]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorStatus as u8],
                vec![0x00],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::OscillatorStatus as u8, 0b0010_0000],
            ),
        ]);
        let mut rtc = RV1805C3::new(mock);
        rtc.set_power_switch_function(PowerSwitchFunction::Sleep)
            .unwrap();
        rtc.unlock_power_switch().unwrap();
        rtc.set_static_power_switch_output(true).unwrap();
        rtc.lock_power_switch().unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_reset() {
        let mock = I2cMock::new(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![RegAddr::ConfigurationKey as u8, 0x3C],
        )]);
        let mut rtc = RV1805C3::new(mock);
        rtc.reset().unwrap();
        rtc.i2c.done();
    }

    #[test]
    fn test_register_accessors() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Status as u8], vec![0x80]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::InterruptMask as u8, 0x04]),
        ]);
        let mut rtc = RV1805C3::new(mock);
        let status = rtc.status().unwrap();
        assert!(status.century_carry());
        assert!(!status.alarm_flag());
        let mut mask = InterruptMask::default();
        mask.set_alarm_enable(true);
        rtc.set_interrupt_mask(mask).unwrap();
        rtc.i2c.done();
    }
}
