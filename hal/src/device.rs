//! Device descriptors
//!
//! One descriptor per supported device and security alias. The flash
//! algorithm is built for exactly one of them.

use crate::addr::SECTOR_SIZE;

/// Non-secure alias of the flash.
pub const FLASH_BASE_NS: u32 = 0x0800_0000;

/// Secure alias of the flash.
pub const FLASH_BASE_S: u32 = 0x0C00_0000;

/// Program page size announced to the host, in bytes.
pub const PROGRAM_PAGE_SIZE: u32 = 1024;

/// Value of erased flash bytes.
pub const ERASED_VALUE: u8 = 0xFF;

/// Flash region of one device variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    /// Name reported to the host.
    pub name: &'static str,
    /// Start address of the flash alias.
    pub base: u32,
    /// Flash size in bytes.
    pub size: u32,
    /// Size of the chunks the host programs at once.
    pub page_size: u32,
    /// Erase granule.
    pub sector_size: u32,
    /// Value of erased flash bytes.
    pub erased_value: u8,
    /// Suggested program page timeout.
    pub program_timeout_ms: u32,
    /// Suggested sector erase timeout.
    pub erase_timeout_ms: u32,
}

impl Device {
    const fn stm32h5(name: &'static str, base: u32, size: u32) -> Device {
        Device {
            name,
            base,
            size,
            page_size: PROGRAM_PAGE_SIZE,
            sector_size: SECTOR_SIZE,
            erased_value: ERASED_VALUE,
            program_timeout_ms: 400,
            erase_timeout_ms: 400,
        }
    }

    /// Number of sectors of the device.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::device;
    ///
    /// assert_eq!(device::STM32H5XX_2048_NS.num_sectors(), 256);
    /// assert_eq!(device::STM32H503_128_NS.num_sectors(), 16);
    /// ```
    pub const fn num_sectors(&self) -> u32 {
        self.size / self.sector_size
    }

    /// Returns `true` if the descriptor targets the secure alias.
    pub const fn is_secure_alias(&self) -> bool {
        self.base == FLASH_BASE_S
    }

    /// Last address of the flash.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::device;
    ///
    /// assert_eq!(device::STM32H5XX_1024_S.end(), 0x0C0F_FFFF);
    /// ```
    pub const fn end(&self) -> u32 {
        self.base + (self.size - 1)
    }
}

/// STM32H5xx 2 MiB, non-secure alias.
pub const STM32H5XX_2048_NS: Device =
    Device::stm32h5("STM32H5xx 2M NSecure Flash", FLASH_BASE_NS, 0x0020_0000);
/// STM32H5xx 2 MiB, secure alias.
pub const STM32H5XX_2048_S: Device =
    Device::stm32h5("STM32H5xx 2M Secure Flash", FLASH_BASE_S, 0x0020_0000);
/// STM32H5xx 1 MiB, non-secure alias.
pub const STM32H5XX_1024_NS: Device =
    Device::stm32h5("STM32H5xx 1M NSecure Flash", FLASH_BASE_NS, 0x0010_0000);
/// STM32H5xx 1 MiB, secure alias.
pub const STM32H5XX_1024_S: Device =
    Device::stm32h5("STM32H5xx 1M Secure Flash", FLASH_BASE_S, 0x0010_0000);
/// STM32H5xx 512 KiB, non-secure alias.
pub const STM32H5XX_512_NS: Device =
    Device::stm32h5("STM32H5xx 512K NSecure Flash", FLASH_BASE_NS, 0x0008_0000);
/// STM32H5xx 512 KiB, secure alias.
pub const STM32H5XX_512_S: Device =
    Device::stm32h5("STM32H5xx 512K Secure Flash", FLASH_BASE_S, 0x0008_0000);
/// STM32H5xx 256 KiB, non-secure alias.
pub const STM32H5XX_256_NS: Device =
    Device::stm32h5("STM32H5xx 256K NSecure Flash", FLASH_BASE_NS, 0x0004_0000);
/// STM32H5xx 256 KiB, secure alias.
pub const STM32H5XX_256_S: Device =
    Device::stm32h5("STM32H5xx 256K Secure Flash", FLASH_BASE_S, 0x0004_0000);
/// STM32H503 128 KiB, non-secure alias.
pub const STM32H503_128_NS: Device =
    Device::stm32h5("STM32H503 128k NSecure Flash", FLASH_BASE_NS, 0x0002_0000);

/// All supported descriptors.
pub const ALL: [Device; 9] = [
    STM32H5XX_2048_NS,
    STM32H5XX_2048_S,
    STM32H5XX_1024_NS,
    STM32H5XX_1024_S,
    STM32H5XX_512_NS,
    STM32H5XX_512_S,
    STM32H5XX_256_NS,
    STM32H5XX_256_S,
    STM32H503_128_NS,
];
