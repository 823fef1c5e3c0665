//! Address to bank and sector resolution
//!
//! The flash is split into two banks of equal size, each made of 8 KiB
//! sectors. Erase commands address a sector by bank and page number, both
//! are derived here from a linear address.
//!
//! Resolution never fails. Addresses outside of the flash wrap into some
//! bank and page, callers are trusted to pass addresses inside the region.

/// Sector size in bytes.
pub const SECTOR_SIZE: u32 = 1 << SECTOR_SHIFT;

/// log2 of the sector size, fixed for this controller family.
pub const SECTOR_SHIFT: u32 = 13;

/// Highest page number within a bank.
pub const MAX_PAGE: u8 = 0x7F;

/// Bank organisation of the flash.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BankMode {
    /// Two banks, the upper half of the flash is bank 2.
    #[default]
    Dual,
    /// One bank covering the whole flash.
    ///
    /// None of the supported devices use this, it is kept for family members
    /// with a single-bank configuration.
    Single,
}

/// Flash bank.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Bank {
    /// First bank, lower half of the address space.
    Bank1 = 0,
    /// Second bank, upper half of the address space.
    Bank2 = 1,
}

impl Bank {
    /// Bank index as used by the bank select bit.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl From<Bank> for u8 {
    fn from(bank: Bank) -> Self {
        bank as u8
    }
}

/// An erasable 8 KiB sector, addressed by bank and page number.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sector {
    bank: Bank,
    page: u8,
}

impl Sector {
    /// Create a sector from a bank and a page number.
    ///
    /// The page number is truncated to the 7-bit page field.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::addr::{Bank, Sector};
    ///
    /// let sector = Sector::new(Bank::Bank2, 127);
    /// assert_eq!(sector.bank(), Bank::Bank2);
    /// assert_eq!(sector.page(), 127);
    /// assert_eq!(Sector::new(Bank::Bank1, 128).page(), 0);
    /// ```
    pub const fn new(bank: Bank, page: u8) -> Sector {
        Sector {
            bank,
            page: page & MAX_PAGE,
        }
    }

    /// Bank of the sector.
    pub const fn bank(&self) -> Bank {
        self.bank
    }

    /// Page number of the sector within its bank.
    pub const fn page(&self) -> u8 {
        self.page
    }
}

/// Flash geometry of a session, set once at initialization.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    base: u32,
    size: u32,
    mode: BankMode,
}

impl Geometry {
    /// Create a geometry from the flash base address and total size in bytes.
    ///
    /// The size is expected to be a power of two.
    pub const fn new(base: u32, size: u32, mode: BankMode) -> Geometry {
        Geometry { base, size, mode }
    }

    /// Base address of the flash.
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Total size of the flash in bytes.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Bank organisation.
    pub const fn bank_mode(&self) -> BankMode {
        self.mode
    }

    /// Size of one bank in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::addr::{BankMode, Geometry};
    ///
    /// let dual = Geometry::new(0x0800_0000, 0x0020_0000, BankMode::Dual);
    /// assert_eq!(dual.bank_size(), 0x0010_0000);
    ///
    /// let single = Geometry::new(0x0800_0000, 0x0020_0000, BankMode::Single);
    /// assert_eq!(single.bank_size(), 0x0020_0000);
    /// ```
    pub const fn bank_size(&self) -> u32 {
        match self.mode {
            BankMode::Dual => self.size >> 1,
            BankMode::Single => self.size,
        }
    }

    /// Bank holding `addr`.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::addr::{Bank, BankMode, Geometry};
    ///
    /// let geo = Geometry::new(0x0800_0000, 0x0020_0000, BankMode::Dual);
    /// assert_eq!(geo.bank(0x0800_0000), Bank::Bank1);
    /// assert_eq!(geo.bank(0x080F_FFFF), Bank::Bank1);
    /// assert_eq!(geo.bank(0x0810_0000), Bank::Bank2);
    /// ```
    pub const fn bank(&self, addr: u32) -> Bank {
        match self.mode {
            BankMode::Dual => {
                if addr >= self.base.wrapping_add(self.size >> 1) {
                    Bank::Bank2
                } else {
                    Bank::Bank1
                }
            }
            BankMode::Single => Bank::Bank1,
        }
    }

    /// Page number of `addr` within its bank.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::addr::{BankMode, Geometry};
    ///
    /// let geo = Geometry::new(0x0800_0000, 0x0020_0000, BankMode::Dual);
    /// assert_eq!(geo.page(0x0800_0000), 0);
    /// assert_eq!(geo.page(0x0800_2000), 1);
    /// assert_eq!(geo.page(0x080F_E000), 127);
    /// assert_eq!(geo.page(0x0810_0000), 0);
    /// ```
    pub const fn page(&self, addr: u32) -> u8 {
        let mask: u32 = self.bank_size().wrapping_sub(1);
        ((addr & mask) >> SECTOR_SHIFT) as u8
    }

    /// Sector holding `addr`.
    pub const fn sector(&self, addr: u32) -> Sector {
        Sector::new(self.bank(addr), self.page(addr))
    }

    /// Start address of `sector`.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::addr::{Bank, BankMode, Geometry, Sector};
    ///
    /// let geo = Geometry::new(0x0800_0000, 0x0020_0000, BankMode::Dual);
    /// assert_eq!(geo.sector_addr(Sector::new(Bank::Bank2, 1)), 0x0810_2000);
    /// ```
    pub const fn sector_addr(&self, sector: Sector) -> u32 {
        self.base
            .wrapping_add((sector.bank() as u32).wrapping_mul(self.bank_size()))
            .wrapping_add((sector.page() as u32) << SECTOR_SHIFT)
    }
}
