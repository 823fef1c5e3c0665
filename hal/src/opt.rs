//! Option byte flash algorithm
//!
//! Programming the option bytes is not supported. This path accepts every
//! operation without touching the device, so a host can load it without
//! failing; nothing is ever written.

use crate::flash::{BlankCheck, Error, Function};
use core::num::NonZeroU32;

/// Option byte session.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionBytes {
    function: Function,
}

impl OptionBytes {
    /// Start an option byte session.
    pub fn init(address: u32, clock_hz: u32, function: Function) -> Result<Self, Error> {
        debug!(
            "option bytes init {:#010X} clk={} fn={}",
            address,
            clock_hz,
            function as u32
        );
        Ok(OptionBytes { function })
    }

    /// End the session.
    pub fn uninit(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Function passed at initialization.
    pub fn function(&self) -> Function {
        self.function
    }

    /// Blank check, see [`blank_check`].
    pub fn blank_check(&self, address: u32, size: u32, pattern: u8) -> BlankCheck {
        blank_check(address, size, pattern)
    }

    /// Accepted, does nothing.
    pub fn erase_chip(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Accepted, does nothing.
    pub fn erase_sector(&mut self, address: u32) -> Result<(), Error> {
        let _ = address;
        Ok(())
    }

    /// Accepted, does nothing.
    pub fn program_page(&mut self, address: u32, size: u32, data: &[u8]) -> Result<(), Error> {
        let _ = (address, size, data);
        Ok(())
    }

    /// Verify, see [`verify`].
    pub fn verify(&self, address: u32, size: u32, data: &[u8]) -> u32 {
        verify(address, size, data)
    }

    /// Verify, failing with the first mismatching address.
    ///
    /// A mismatch at address `0` is reported as `1`.
    pub fn verify_range(&self, address: u32, size: u32, data: &[u8]) -> Result<(), NonZeroU32> {
        let end: u32 = self.verify(address, size, data);
        if end == address.wrapping_add(size) {
            Ok(())
        } else {
            Err(NonZeroU32::new(end).unwrap_or(NonZeroU32::MIN))
        }
    }
}

/// Option byte blank check.
///
/// Option bytes never need an erase, they always report blank.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::{flash::BlankCheck, opt};
///
/// assert_eq!(opt::blank_check(0x0800_0000, 0x100, 0xFF), BlankCheck::Blank);
/// ```
pub const fn blank_check(address: u32, size: u32, pattern: u8) -> BlankCheck {
    let _ = (address, size, pattern);
    BlankCheck::Blank
}

/// Option byte verify.
///
/// Reports the whole range as matching by returning the end address.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::opt::verify;
///
/// assert_eq!(verify(0x0800_0000, 0x400, &[]), 0x0800_0400);
/// ```
pub const fn verify(address: u32, size: u32, data: &[u8]) -> u32 {
    let _ = data;
    address.wrapping_add(size)
}
