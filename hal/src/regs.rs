//! Flash controller register map
//!
//! The controller exposes two parallel views of its control registers, one
//! for non-secure and one for secure accesses. Which view applies is decided
//! once when the flash is unlocked, see [`RegisterSet`].

use crate::addr::{BankMode, Sector};
use crate::bus::Bus;

/// Base address of the flash interface registers.
pub const FLASH_BASE: u32 = 0x4002_2000;

/// Non-secure key register.
pub const NSKEYR: u32 = FLASH_BASE + 0x004;
/// Secure key register.
pub const SECKEYR: u32 = FLASH_BASE + 0x008;
/// Non-secure status register.
pub const NSSR: u32 = FLASH_BASE + 0x020;
/// Secure status register.
pub const SECSR: u32 = FLASH_BASE + 0x024;
/// Non-secure control register.
pub const NSCR: u32 = FLASH_BASE + 0x028;
/// Secure control register.
pub const SECCR: u32 = FLASH_BASE + 0x02C;
/// Non-secure clear control register.
pub const NSCCR: u32 = FLASH_BASE + 0x030;
/// Secure clear control register.
pub const SECCCR: u32 = FLASH_BASE + 0x034;
/// Option status register 2, value to program.
pub const OPTSR2_PRG: u32 = FLASH_BASE + 0x074;
/// Secure block-based registers for bank 1 (`SECBB1R1` to `SECBB1R4`).
pub const SECBB1R: [u32; 4] = [
    FLASH_BASE + 0x0A0,
    FLASH_BASE + 0x0A4,
    FLASH_BASE + 0x0A8,
    FLASH_BASE + 0x0AC,
];
/// Secure block-based registers for bank 2 (`SECBB2R1` to `SECBB2R4`).
pub const SECBB2R: [u32; 4] = [
    FLASH_BASE + 0x1A0,
    FLASH_BASE + 0x1A4,
    FLASH_BASE + 0x1A8,
    FLASH_BASE + 0x1AC,
];

/// First unlock key.
pub const KEY1: u32 = 0x4567_0123;
/// Second unlock key.
pub const KEY2: u32 = 0xCDEF_89AB;

/// Security attribution unit registers.
pub mod sau {
    /// Control register.
    pub const CTRL: u32 = 0xE000_EDD0;
    /// Region number register.
    pub const RNR: u32 = 0xE000_EDD8;
    /// Region base address register.
    pub const RBAR: u32 = 0xE000_EDDC;
    /// Region limit address register.
    pub const RLAR: u32 = 0xE000_EDE0;

    /// Start of the device information area (flash size, package, UID).
    pub const INFO_BASE: u32 = 0x08FF_F800;
    /// Limit of the device information area, region enabled and marked
    /// non-secure callable.
    pub const INFO_LIMIT: u32 = 0x08FF_F8E1;
}

// status register (SR) flags
pub(crate) mod flags {
    pub const BSY: u32 = 1;
    pub const WBNE: u32 = 1 << 1;
    pub const DBNE: u32 = 1 << 3;
    pub const EOP: u32 = 1 << 16;
    pub const WRPERR: u32 = 1 << 17;
    pub const PGSERR: u32 = 1 << 18;
    pub const STRBERR: u32 = 1 << 19;
    pub const INCERR: u32 = 1 << 20;
    pub const OBKERR: u32 = 1 << 21;
    pub const OBKWERR: u32 = 1 << 22;
    pub const OPTCHANGEERR: u32 = 1 << 23;

    /// Errors that abort a program or erase operation.
    pub const PGERR: u32 = WRPERR | STRBERR | PGSERR | INCERR | OBKERR | OBKWERR;
}

/// Status register bits that fail a program or erase operation.
///
/// The same mask is written to the clear register to reset the flags.
pub const ERROR_MASK: u32 = flags::PGERR;

/// Control register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cr {
    val: u32,
}

impl Cr {
    /// Idle control register, no operation selected.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Cr;
    /// assert_eq!(Cr::IDLE.raw(), 0);
    /// ```
    pub const IDLE: Cr = Cr::new(0);

    /// Reset value of the register, the controller is locked.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Cr;
    /// assert!(Cr::RESET.locked());
    /// ```
    pub const RESET: Cr = Cr::IDLE.set_lock();

    const LOCK: u32 = 1;
    const PG: u32 = 1 << 1;
    const SER: u32 = 1 << 2;
    const STRT: u32 = 1 << 5;
    const PNB_POS: u32 = 6;
    const PNB_MASK: u32 = 0x7F << Self::PNB_POS;
    const MER: u32 = 1 << 15;
    const BKSEL: u32 = 1 << 31;

    /// Create a new Cr register from a raw value.
    pub const fn new(val: u32) -> Cr {
        Cr { val }
    }

    /// Get the raw value of the register.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Cr;
    /// const CR: Cr = Cr::new(0x1234_5678);
    /// assert_eq!(CR.raw(), 0x1234_5678);
    /// ```
    pub const fn raw(self) -> u32 {
        self.val
    }

    /// Set the lock bit.
    ///
    /// Once set, the register can only be written again after the key
    /// sequence.
    #[must_use = "set_lock returns a modified Cr"]
    pub const fn set_lock(mut self) -> Cr {
        self.val |= Self::LOCK;
        self
    }

    /// Returns `true` if the lock bit is set.
    pub const fn locked(&self) -> bool {
        self.val & Self::LOCK != 0
    }

    /// Enable programming.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Cr;
    /// assert_eq!(Cr::IDLE.set_pg().raw(), 0b10);
    /// ```
    #[must_use = "set_pg returns a modified Cr"]
    pub const fn set_pg(mut self) -> Cr {
        self.val |= Self::PG;
        self
    }

    /// Returns `true` if programming is enabled.
    pub const fn pg(&self) -> bool {
        self.val & Self::PG != 0
    }

    /// Select a sector erase of `sector`.
    ///
    /// This sets the sector erase bit, the page number field and the bank
    /// select bit in one value.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::{
    ///     addr::{Bank, Sector},
    ///     regs::Cr,
    /// };
    ///
    /// let cr = Cr::IDLE.set_sector_erase(Sector::new(Bank::Bank2, 3));
    /// assert_eq!(cr.raw(), (1 << 31) | (3 << 6) | (1 << 2));
    /// assert_eq!(cr.sector(), Some(Sector::new(Bank::Bank2, 3)));
    /// ```
    #[must_use = "set_sector_erase returns a modified Cr"]
    pub const fn set_sector_erase(mut self, sector: Sector) -> Cr {
        self.val &= !(Self::PNB_MASK | Self::BKSEL);
        self.val |= Self::SER
            | (((sector.page() as u32) << Self::PNB_POS) & Self::PNB_MASK)
            | ((sector.bank() as u32) << 31);
        self
    }

    /// Sector selected for erase, if the sector erase bit is set.
    pub const fn sector(&self) -> Option<Sector> {
        if self.val & Self::SER == 0 {
            None
        } else {
            let page: u8 = ((self.val & Self::PNB_MASK) >> Self::PNB_POS) as u8;
            let bank = if self.val & Self::BKSEL == 0 {
                crate::addr::Bank::Bank1
            } else {
                crate::addr::Bank::Bank2
            };
            Some(Sector::new(bank, page))
        }
    }

    /// Select a mass erase of both banks.
    #[must_use = "set_mass_erase returns a modified Cr"]
    pub const fn set_mass_erase(mut self) -> Cr {
        self.val |= Self::MER;
        self
    }

    /// Returns `true` if mass erase is selected.
    pub const fn mass_erase(&self) -> bool {
        self.val & Self::MER != 0
    }

    /// Set the start bit, launching the selected erase.
    #[must_use = "set_start returns a modified Cr"]
    pub const fn set_start(mut self) -> Cr {
        self.val |= Self::STRT;
        self
    }

    /// Returns `true` if the start bit is set.
    pub const fn start(&self) -> bool {
        self.val & Self::STRT != 0
    }
}

impl From<u32> for Cr {
    fn from(val: u32) -> Self {
        Self { val }
    }
}

impl From<Cr> for u32 {
    fn from(cr: Cr) -> Self {
        cr.val
    }
}

impl Default for Cr {
    fn default() -> Self {
        Cr::RESET
    }
}

/// Status register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sr {
    val: u32,
}

impl Sr {
    /// Create a new Sr register from a raw value.
    pub const fn new(val: u32) -> Sr {
        Sr { val }
    }

    /// Get the raw value of the register.
    pub const fn raw(self) -> u32 {
        self.val
    }

    /// Returns `true` while an operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Sr;
    /// assert!(Sr::new(0b1).busy());
    /// assert!(!Sr::new(1 << 16).busy());
    /// ```
    pub const fn busy(&self) -> bool {
        self.val & flags::BSY != 0
    }

    /// Returns `true` if the write buffer holds data not yet programmed.
    pub const fn write_buffer_not_empty(&self) -> bool {
        self.val & flags::WBNE != 0
    }

    /// Returns `true` if the data buffer holds data not yet programmed.
    pub const fn data_buffer_not_empty(&self) -> bool {
        self.val & flags::DBNE != 0
    }

    /// Returns `true` if the end of operation flag is set.
    pub const fn eop(&self) -> bool {
        self.val & flags::EOP != 0
    }

    /// Returns `true` if an option byte change error is flagged.
    ///
    /// This error does not fail program or erase operations.
    pub const fn opt_change_err(&self) -> bool {
        self.val & flags::OPTCHANGEERR != 0
    }

    /// Error flags that fail a program or erase operation.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::regs::Sr;
    /// assert_eq!(Sr::new((1 << 17) | (1 << 16) | 1).errors(), 1 << 17);
    /// ```
    pub const fn errors(&self) -> u32 {
        self.val & ERROR_MASK
    }

    /// Decode the most specific error flag.
    ///
    /// Returns `None` when no error flag of [`ERROR_MASK`] is set.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::{flash::Error, regs::Sr};
    ///
    /// assert_eq!(Sr::new(0).error(), None);
    /// assert_eq!(Sr::new(1 << 17).error(), Some(Error::Wp));
    /// // sequence errors accompany the root cause
    /// assert_eq!(Sr::new((1 << 18) | (1 << 20)).error(), Some(Error::Inconsistency));
    /// assert_eq!(Sr::new(1 << 18).error(), Some(Error::Seq));
    /// ```
    pub const fn error(&self) -> Option<crate::flash::Error> {
        use crate::flash::Error;

        let sr: u32 = self.val;
        if sr & flags::WRPERR != 0 {
            Some(Error::Wp)
        } else if sr & flags::STRBERR != 0 {
            Some(Error::Strobe)
        } else if sr & flags::INCERR != 0 {
            Some(Error::Inconsistency)
        } else if sr & flags::OBKERR != 0 {
            Some(Error::Obk)
        } else if sr & flags::OBKWERR != 0 {
            Some(Error::ObkWrite)
        } else if sr & flags::PGSERR != 0 {
            // check last because it can be set with other flags
            Some(Error::Seq)
        } else {
            None
        }
    }
}

impl From<u32> for Sr {
    fn from(val: u32) -> Self {
        Self { val }
    }
}

/// One view of the flash control registers.
///
/// Selected once at initialization, every operation after that goes through
/// the selected view without knowing which one it is.
pub trait RegisterSet: core::fmt::Debug + Sync {
    /// Key register address.
    fn keyr(&self) -> u32;
    /// Status register address.
    fn sr(&self) -> u32;
    /// Control register address.
    fn cr(&self) -> u32;
    /// Clear control register address.
    fn ccr(&self) -> u32;
    /// Returns `true` for the secure view.
    fn is_secure(&self) -> bool;

    /// Open the flash to this view after unlocking.
    ///
    /// The non-secure view needs nothing.
    fn grant_access(&self, bus: &mut dyn Bus, bank_mode: BankMode) {
        let _ = (bus, bank_mode);
    }
}

register_set!(NonSecure, NS, false, "Non-secure flash registers.");

register_set!(Secure, SEC, true, "Secure flash registers.", {
    fn grant_access(&self, bus: &mut dyn Bus, bank_mode: BankMode) {
        SECBB1R.iter().for_each(|&reg| bus.write(reg, u32::MAX));
        if bank_mode == BankMode::Dual {
            SECBB2R.iter().for_each(|&reg| bus.write(reg, u32::MAX));
        }

        bus.write(sau::RNR, 0);
        bus.write(sau::RBAR, sau::INFO_BASE);
        bus.write(sau::RLAR, sau::INFO_LIMIT);
        bus.write(sau::CTRL, 1);
    }
});

/// Non-secure register view.
pub static NON_SECURE: NonSecure = NonSecure::new();

/// Secure register view.
pub static SECURE: Secure = Secure::new();

/// Select the register view for the security state.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::regs::{self, RegisterSet};
///
/// assert_eq!(regs::select(false).cr(), regs::NSCR);
/// assert_eq!(regs::select(true).cr(), regs::SECCR);
/// assert!(regs::select(true).is_secure());
/// ```
pub fn select(secure: bool) -> &'static dyn RegisterSet {
    if secure { &SECURE } else { &NON_SECURE }
}
