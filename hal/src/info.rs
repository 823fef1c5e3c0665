//! Device electronic signature and security state

use crate::bus::Bus;
use crate::regs::OPTSR2_PRG;

/// Address of the flash size word.
pub const FLASHSIZE: u32 = 0x08FF_F80C;

/// Address of the debug MCU identity code register.
pub const DBGMCU_IDCODE: u32 = 0xE004_4000;

/// TrustZone enable field of `OPTSR2`.
const TZEN_MASK: u32 = 0xFF00_0000;
/// Field value with TrustZone enabled.
const TZEN_ENABLED: u32 = 0xB400_0000;

/// Flash size in kibibytes
///
/// # Example
///
/// ```no_run
/// use stm32h5xx_flash_algo::{bus::Mmio, info::flash_size_kibibyte};
///
/// let mut bus = unsafe { Mmio::steal() };
/// // valid for the NUCLEO-H563ZI
/// assert_eq!(flash_size_kibibyte(&mut bus), 2048);
/// ```
pub fn flash_size_kibibyte(bus: &mut dyn Bus) -> u16 {
    (bus.read(FLASHSIZE) & 0x0000_FFFF) as u16
}

/// Flash size in bytes
pub fn flash_size(bus: &mut dyn Bus) -> u32 {
    u32::from(flash_size_kibibyte(bus)) << 10
}

/// Returns `true` if TrustZone is enabled in the option bytes.
///
/// With TrustZone enabled the flash must be driven through the secure
/// registers.
pub fn trust_zone_enabled(bus: &mut dyn Bus) -> bool {
    bus.read(OPTSR2_PRG) & TZEN_MASK == TZEN_ENABLED
}

/// Device line
///
/// Returned by [`dev_id`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum DevId {
    /// STM32H503
    H503 = 0x474,
    /// STM32H562, STM32H563 and STM32H573
    H56x = 0x484,
}

impl TryFrom<u16> for DevId {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x474 => Ok(DevId::H503),
            0x484 => Ok(DevId::H56x),
            _ => Err(value),
        }
    }
}

impl From<DevId> for u16 {
    fn from(id: DevId) -> Self {
        id as u16
    }
}

/// Get the device line
///
/// If the identifier is unknown it will be returned in the `Err` variant of
/// the `Result`.
///
/// # Example
///
/// ```no_run
/// use stm32h5xx_flash_algo::{bus::Mmio, info};
///
/// let mut bus = unsafe { Mmio::steal() };
/// assert_eq!(info::dev_id(&mut bus), Ok(info::DevId::H56x));
/// ```
pub fn dev_id(bus: &mut dyn Bus) -> Result<DevId, u16> {
    let raw: u16 = (bus.read(DBGMCU_IDCODE) & 0xFFF) as u16;
    DevId::try_from(raw)
}
