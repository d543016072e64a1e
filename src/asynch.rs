//! Async implementation of the RV-1805-C3 driver.
//!
//! This module provides an async interface to the RV-1805-C3 RTC using the
//! `embedded-hal-async` traits. It is only available when the `async`
//! feature is enabled and mirrors the surface of the blocking driver.
//!
//! # Example
//!
//! ```rust,ignore
//! use rv1805c3::asynch::RV1805C3;
//!
//! let mut rtc = RV1805C3::new(i2c);
//! rtc.init().await?;
//!
//! rtc.set_datetime_from_iso8601("2021-05-04T08:09:10").await?;
//! let now = rtc.datetime().await?;
//! ```

use embedded_hal_async::i2c::I2c;

use crate::{
    AlarmMode, ConfigKey, Control1, Control2, CountdownControl, CountdownUnit, DateTime,
    DateTimeComponent, InterruptFlags, InterruptMask, InterruptType, OscillatorControl,
    OscillatorStatus, PowerSwitchFunction, RV1805C3Error, RegAddr, SleepControl, SleepWaitPeriod,
    Status, DEVICE_ADDRESS, PART_NUMBER,
};

/// RV-1805-C3 real-time clock async driver.
///
/// Holds no date/time state; every operation works from a fresh register
/// snapshot, awaiting each bus transaction.
pub struct RV1805C3<I2C: I2c> {
    i2c: I2C,
}

impl<I2C: I2c> RV1805C3<I2C> {
    /// Creates a new async driver instance from an I2C bus implementation.
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
    /// # Errors
    ///
    /// Returns [`RV1805C3Error::UnknownDevice`] if the identification
    /// signature does not match, or an I2C error from the bus.
    pub async fn init(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let id = self.part_number().await?;
        debug!("RV1805C3: id registers {:02x} {:02x}", id[0], id[1]);
        if id != PART_NUMBER {
            return Err(RV1805C3Error::UnknownDevice);
        }
        self.enable_oscillator_switching().await?;
        self.reduce_leakage().await
    }

    /// Reads the two read-only identification registers.
    pub async fn part_number(&mut self) -> Result<[u8; 2], RV1805C3Error<I2C::Error>> {
        let mut id = [0u8; 2];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Id0 as u8], &mut id)
            .await?;
        Ok(id)
    }

    async fn read_register(&mut self, register: RegAddr) -> Result<u8, RV1805C3Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[register as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    async fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.i2c
            .write(DEVICE_ADDRESS, &[register as u8, value])
            .await?;
        Ok(())
    }

    /// Writes a protected register, preceded by its configuration key.
    ///
    /// Key and target are issued back to back; the unlock window does not
    /// survive an intervening register access.
    async fn write_protected(
        &mut self,
        key: ConfigKey,
        register: RegAddr,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.write_register(RegAddr::ConfigurationKey, key as u8)
            .await?;
        self.write_register(register, value).await
    }

    /// Reads the current date and time from the device.
    pub async fn datetime(&mut self) -> Result<DateTime, RV1805C3Error<I2C::Error>> {
        let mut data = [0u8; 8];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Hundredths as u8], &mut data)
            .await?;
        DateTime::from_registers(data).map_err(RV1805C3Error::DateTime)
    }

    /// Writes a date and time to the live clock registers in one
    /// transaction, starting at the hundredths register.
    pub async fn set_datetime(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let data: [u8; 8] = datetime.into();
        self.i2c
            .write(
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
            )
            .await?;
        Ok(())
    }

    /// Updates a single date/time field from a fresh register snapshot.
    ///
    /// The year is passed as an offset from 2000.
    pub async fn set_component(
        &mut self,
        component: DateTimeComponent,
        value: u8,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut datetime = self.datetime().await?;
        datetime
            .set_component(component, value)
            .map_err(RV1805C3Error::DateTime)?;
        self.set_datetime(&datetime).await
    }

    /// Parses an ISO 8601 timestamp and writes it to the clock registers.
    pub async fn set_datetime_from_iso8601(
        &mut self,
        s: &str,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_iso8601(s).map_err(RV1805C3Error::Parse)?;
        self.set_datetime(&datetime).await
    }

    /// Parses an HTTP date string and writes it to the clock registers.
    pub async fn set_datetime_from_http_date(
        &mut self,
        s: &str,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_http_date(s).map_err(RV1805C3Error::Parse)?;
        self.set_datetime(&datetime).await
    }

    /// Writes a date and time to the alarm compare registers in one
    /// transaction, starting at the hundredths alarm register.
    pub async fn set_alarm(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let data: [u8; 8] = datetime.into();
        self.i2c
            .write(
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
            )
            .await?;
        Ok(())
    }

    /// Parses an ISO 8601 timestamp and writes it to the alarm compare
    /// registers.
    pub async fn set_alarm_from_iso8601(
        &mut self,
        s: &str,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_iso8601(s).map_err(RV1805C3Error::Parse)?;
        self.set_alarm(&datetime).await
    }

    /// Parses an HTTP date string and writes it to the alarm compare
    /// registers.
    pub async fn set_alarm_from_http_date(
        &mut self,
        s: &str,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let datetime = DateTime::from_http_date(s).map_err(RV1805C3Error::Parse)?;
        self.set_alarm(&datetime).await
    }

    /// Selects the alarm repeat mode.
    ///
    /// The sub-second modes additionally force the hundredths alarm register
    /// to the matching wildcard pattern before enabling the repeat field.
    pub async fn set_alarm_mode(
        &mut self,
        mode: AlarmMode,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.countdown_control().await?;
        if let Some(wildcard) = mode.hundredths_wildcard() {
            self.write_register(RegAddr::AlarmHundredths, wildcard)
                .await?;
        }
        control.set_alarm_repeat(mode.repeat_field());
        self.set_countdown_control(control).await
    }

    /// Programs and enables the countdown timer.
    ///
    /// A period of 0 is a no-op: no register is touched.
    pub async fn set_countdown_timer(
        &mut self,
        period: u8,
        unit: CountdownUnit,
        repeat: bool,
        interrupt_as_pulse: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        if period == 0 {
            return Ok(());
        }

        self.write_register(RegAddr::CountdownTimer, period - 1)
            .await?;
        self.write_register(RegAddr::TimerInitialValue, period - 1)
            .await?;

        let mut control = self.countdown_control().await?;
        control.set_timer_frequency(unit.into());
        control.set_timer_interrupt_level(!interrupt_as_pulse);
        control.set_timer_repeat(repeat);
        control.set_timer_enable(true);
        self.set_countdown_control(control).await
    }

    /// Enables one interrupt source in the interrupt mask register.
    pub async fn enable_interrupt(
        &mut self,
        interrupt: InterruptType,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut mask = self.interrupt_mask().await?;
        mask.set_enabled(interrupt, true);
        self.set_interrupt_mask(mask).await
    }

    /// Disables one interrupt source in the interrupt mask register.
    pub async fn disable_interrupt(
        &mut self,
        interrupt: InterruptType,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut mask = self.interrupt_mask().await?;
        mask.set_enabled(interrupt, false);
        self.set_interrupt_mask(mask).await
    }

    /// Reads and clears the pending interrupt flags, returning the five
    /// flag bits that were set before the call.
    pub async fn clear_interrupts(&mut self) -> Result<InterruptFlags, RV1805C3Error<I2C::Error>> {
        let status = self.status().await?;

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
        self.set_status(cleared).await?;

        Ok(flags)
    }

    /// Selects the crystal oscillator and disables autocalibration.
    pub async fn enable_crystal_oscillator(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control().await?;
        control.set_rc_oscillator(false);
        control.set_autocalibration(0);
        self.write_protected(
            ConfigKey::OscillatorControl,
            RegAddr::OscillatorControl,
            control.into(),
        )
        .await
    }

    /// Runs from the RC oscillator all the time to minimize power usage,
    /// autocalibrating against the crystal every 512 seconds.
    pub async fn disable_crystal_oscillator(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control().await?;
        control.set_rc_oscillator(true);
        control.set_autocalibration(0b11);
        self.write_protected(
            ConfigKey::OscillatorControl,
            RegAddr::OscillatorControl,
            control.into(),
        )
        .await
    }

    /// Switches to the RC oscillator automatically on backup power and on
    /// crystal failure.
    pub async fn enable_oscillator_switching(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.oscillator_control().await?;
        control.set_backup_switchover(true);
        control.set_failure_switchover(true);
        control.set_sleep_interface_disable(false);
        control.set_failure_interrupt_enable(false);
        control.set_autocal_fail_interrupt_enable(false);
        self.set_oscillator_control(control).await
    }

    /// Reduces leakage current while running from backup power.
    pub async fn reduce_leakage(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control2().await?;
        control.set_reset_in_sleep(false);
        self.set_control2(control).await?;

        self.write_protected(ConfigKey::Registers, RegAddr::IoBatmode, 0x00)
            .await?;
        self.write_protected(ConfigKey::Registers, RegAddr::OutputControl, 0x30)
            .await
    }

    /// Requests sleep mode after the given wait period.
    pub async fn sleep(
        &mut self,
        wait_period: SleepWaitPeriod,
        disable_interface: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        if disable_interface {
            let mut control = self.oscillator_control().await?;
            control.set_sleep_interface_disable(true);
            self.write_protected(
                ConfigKey::OscillatorControl,
                RegAddr::OscillatorControl,
                control.into(),
            )
            .await?;
        }

        let mut sleep = self.sleep_control().await?;
        sleep.set_sleep_request(true);
        sleep.set_sleep_wait(wait_period);
        self.set_sleep_control(sleep).await
    }

    /// Selects the signal source driven on the PSW/nIRQ2 power switch pin.
    pub async fn set_power_switch_function(
        &mut self,
        function: PowerSwitchFunction,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control2().await?;
        control.set_out2_function(function.into());
        self.set_control2(control).await
    }

    /// Locks the power switch function against further changes.
    pub async fn lock_power_switch(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut status = self.oscillator_status().await?;
        status.set_power_switch_lock(true);
        self.set_oscillator_status(status).await
    }

    /// Unlocks the power switch function.
    pub async fn unlock_power_switch(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut status = self.oscillator_status().await?;
        status.set_power_switch_lock(false);
        self.set_oscillator_status(status).await
    }

    /// Drives a static level on the power switch pin.
    pub async fn set_static_power_switch_output(
        &mut self,
        high: bool,
    ) -> Result<(), RV1805C3Error<I2C::Error>> {
        let mut control = self.control1().await?;
        control.set_static_output(high);
        self.set_control1(control).await
    }

    /// Triggers a software reset by writing the reset key.
    pub async fn reset(&mut self) -> Result<(), RV1805C3Error<I2C::Error>> {
        self.write_register(RegAddr::ConfigurationKey, ConfigKey::SoftwareReset as u8)
            .await
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> RV1805C3<I2C> {
            $(
                paste::paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, RV1805C3Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub async fn [< set_ $name >](&mut self, value: $typ) -> Result<(), RV1805C3Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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
