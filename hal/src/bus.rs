//! Register and memory access

use core::ptr::{read_volatile, write_volatile};

/// Word access to the target address space.
///
/// Every register and flash access of the driver goes through this trait,
/// which makes the controller replaceable by a model on the host.
pub trait Bus {
    /// Read the 32-bit word at `addr`.
    fn read(&mut self, addr: u32) -> u32;

    /// Write `val` to the 32-bit word at `addr`.
    fn write(&mut self, addr: u32, val: u32);

    /// Data synchronization barrier.
    ///
    /// Completes all outstanding writes before the next access.
    fn dsb(&mut self);

    /// Mask interrupts for the rest of the session.
    fn disable_interrupts(&mut self);

    /// Called between two polls of a status bit.
    fn relax(&mut self) {}

    /// Read-modify-write of the word at `addr`.
    fn modify(&mut self, addr: u32, f: &dyn Fn(u32) -> u32) {
        let val: u32 = self.read(addr);
        self.write(addr, f(val));
    }
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u32, val: u32) {
        (**self).write(addr, val)
    }

    fn dsb(&mut self) {
        (**self).dsb()
    }

    fn disable_interrupts(&mut self) {
        (**self).disable_interrupts()
    }

    fn relax(&mut self) {
        (**self).relax()
    }

    fn modify(&mut self, addr: u32, f: &dyn Fn(u32) -> u32) {
        (**self).modify(addr, f)
    }
}

/// Memory mapped access on the Cortex-M33 core.
#[derive(Debug)]
pub struct Mmio {
    _priv: (),
}

impl Mmio {
    /// Steal the target address space.
    ///
    /// # Safety
    ///
    /// 1. Must only be called on the target, the addresses passed to
    ///    [`Bus`] methods are dereferenced as raw pointers.
    /// 2. Nothing else may access the flash controller while the returned
    ///    value is in use.
    pub const unsafe fn steal() -> Self {
        Self { _priv: () }
    }
}

impl Bus for Mmio {
    #[inline]
    fn read(&mut self, addr: u32) -> u32 {
        unsafe { read_volatile(addr as usize as *const u32) }
    }

    #[inline]
    fn write(&mut self, addr: u32, val: u32) {
        unsafe { write_volatile(addr as usize as *mut u32, val) }
    }

    #[inline]
    fn dsb(&mut self) {
        cortex_m::asm::dsb()
    }

    #[inline]
    fn disable_interrupts(&mut self) {
        cortex_m::interrupt::disable()
    }

    #[inline]
    fn relax(&mut self) {
        cortex_m::asm::nop()
    }
}
