//! Session configuration

use crate::addr::BankMode;
use crate::device::Device;
use crate::poll::{Budget, Budgets};

/// Flash session configuration.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::{addr::BankMode, device, Config};
///
/// let config = Config::from_device(&device::STM32H5XX_2048_NS)
///     .set_lock_timeout_ms(10)
///     .set_bank_mode(BankMode::Dual);
/// assert_eq!(config.erase_timeout_ms(), 400);
/// assert_eq!(config.lock_timeout_ms(), 10);
/// // mass erase waits are not bounded unless asked for
/// assert_eq!(config.mass_erase_timeout_ms(), 0);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    bank_mode: BankMode,
    lock_timeout_ms: u32,
    erase_timeout_ms: u32,
    mass_erase_timeout_ms: u32,
    program_timeout_ms: u32,
}

impl Config {
    /// Configuration without any timeout, waits never give up.
    pub const UNBOUNDED: Config = Config {
        bank_mode: BankMode::Dual,
        lock_timeout_ms: 0,
        erase_timeout_ms: 0,
        mass_erase_timeout_ms: 0,
        program_timeout_ms: 0,
    };

    /// Configuration derived from a device descriptor.
    ///
    /// Lock and unlock waits use the erase timeout. The descriptor timeout
    /// covers one sector, the mass erase wait is left unbounded.
    pub const fn from_device(device: &Device) -> Config {
        Config {
            bank_mode: BankMode::Dual,
            lock_timeout_ms: device.erase_timeout_ms,
            erase_timeout_ms: device.erase_timeout_ms,
            mass_erase_timeout_ms: 0,
            program_timeout_ms: device.program_timeout_ms,
        }
    }

    /// Set the bank organisation.
    #[must_use = "set_bank_mode returns a modified Config"]
    pub const fn set_bank_mode(mut self, bank_mode: BankMode) -> Config {
        self.bank_mode = bank_mode;
        self
    }

    /// Set the timeout of the unlock and lock sequences.
    ///
    /// `0` waits forever.
    #[must_use = "set_lock_timeout_ms returns a modified Config"]
    pub const fn set_lock_timeout_ms(mut self, ms: u32) -> Config {
        self.lock_timeout_ms = ms;
        self
    }

    /// Set the timeout of a sector erase.
    ///
    /// `0` waits forever.
    #[must_use = "set_erase_timeout_ms returns a modified Config"]
    pub const fn set_erase_timeout_ms(mut self, ms: u32) -> Config {
        self.erase_timeout_ms = ms;
        self
    }

    /// Set the timeout of a mass erase.
    ///
    /// `0` waits forever.
    #[must_use = "set_mass_erase_timeout_ms returns a modified Config"]
    pub const fn set_mass_erase_timeout_ms(mut self, ms: u32) -> Config {
        self.mass_erase_timeout_ms = ms;
        self
    }

    /// Set the timeout of one quad-word program.
    ///
    /// `0` waits forever.
    #[must_use = "set_program_timeout_ms returns a modified Config"]
    pub const fn set_program_timeout_ms(mut self, ms: u32) -> Config {
        self.program_timeout_ms = ms;
        self
    }

    /// Bank organisation.
    pub const fn bank_mode(&self) -> BankMode {
        self.bank_mode
    }

    /// Timeout of the unlock and lock sequences.
    pub const fn lock_timeout_ms(&self) -> u32 {
        self.lock_timeout_ms
    }

    /// Timeout of a sector erase.
    pub const fn erase_timeout_ms(&self) -> u32 {
        self.erase_timeout_ms
    }

    /// Timeout of a mass erase.
    pub const fn mass_erase_timeout_ms(&self) -> u32 {
        self.mass_erase_timeout_ms
    }

    /// Timeout of one quad-word program.
    pub const fn program_timeout_ms(&self) -> u32 {
        self.program_timeout_ms
    }

    /// Poll budgets at `clock_hz`.
    pub const fn budgets(&self, clock_hz: u32) -> Budgets {
        Budgets {
            lock: Budget::from_millis(self.lock_timeout_ms, clock_hz),
            erase: Budget::from_millis(self.erase_timeout_ms, clock_hz),
            mass_erase: Budget::from_millis(self.mass_erase_timeout_ms, clock_hz),
            program: Budget::from_millis(self.program_timeout_ms, clock_hz),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_device(&crate::device::STM32H5XX_2048_NS)
    }
}
