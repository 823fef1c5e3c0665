//! Flash programming engine
//!
//! A [`Flash`] is one programming session: it is created by unlocking the
//! controller, erases and programs through the register view selected at
//! that point, and is locked again with [`Flash::uninit`].
//!
//! Every operation waits for the controller to be idle, and every wait is
//! bounded by the poll budgets of the session [`Config`].

use crate::{
    addr::{Geometry, Sector},
    bus::Bus,
    config::Config,
    info,
    poll::{Budget, Budgets},
    regs::{self, Cr, ERROR_MASK, RegisterSet, Sr},
};
use core::num::NonZeroU32;

/// Smallest programmable unit in bytes.
///
/// The ECC of the flash covers 128 bits, a program always writes a whole
/// quad-word.
pub const QUAD_WORD: u32 = 16;

/// Flash errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Timeout error.
    ///
    /// The busy flag did not clear within the poll budget.
    Timeout,
    /// The session was locked by [`Flash::uninit`].
    Locked,
    /// Write protection error.
    ///
    /// An address to be erased or programmed belongs to a write-protected
    /// sector.
    Wp,
    /// Programming sequence error.
    ///
    /// A write to the flash memory was performed while PG was not set, or
    /// the write buffer was not complete.
    Seq,
    /// Strobe error.
    ///
    /// A quad-word was written more than once before being programmed.
    Strobe,
    /// Inconsistency error.
    ///
    /// The words of a quad-word do not belong to the same quad-word, or the
    /// access type changed during the sequence.
    Inconsistency,
    /// Option byte key error.
    Obk,
    /// Option byte key write error.
    ObkWrite,
}

impl Error {
    /// Failure code reported to the host.
    ///
    /// The entry point contract only distinguishes success (`0`) from
    /// failure, every error maps to `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::flash::Error;
    ///
    /// assert_eq!(Error::Wp.code().get(), 1);
    /// assert_eq!(Error::Timeout.code().get(), 1);
    /// ```
    pub const fn code(self) -> NonZeroU32 {
        NonZeroU32::MIN
    }
}

/// Operation the host is about to perform, passed at initialization.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Function {
    /// Erase.
    Erase = 1,
    /// Program.
    Program = 2,
    /// Verify.
    Verify = 3,
}

impl TryFrom<u32> for Function {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Function::Erase),
            2 => Ok(Function::Program),
            3 => Ok(Function::Verify),
            _ => Err(value),
        }
    }
}

/// Result of a blank check.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlankCheck {
    /// The region holds the erased pattern, erase can be skipped.
    Blank,
    /// The region must be erased before programming.
    NotBlank,
}

impl BlankCheck {
    /// Entry point return value, `0` for blank.
    pub const fn code(self) -> u32 {
        match self {
            BlankCheck::Blank => 0,
            BlankCheck::NotBlank => 1,
        }
    }

    /// Blank as `Ok`, not blank as error code `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::flash::BlankCheck;
    ///
    /// assert_eq!(BlankCheck::Blank.result(), Ok(()));
    /// assert_eq!(BlankCheck::NotBlank.result().map_err(|e| e.get()), Err(1));
    /// ```
    pub const fn result(self) -> Result<(), NonZeroU32> {
        match self {
            BlankCheck::Blank => Ok(()),
            BlankCheck::NotBlank => Err(NonZeroU32::MIN),
        }
    }
}

/// Blank check of the main flash.
///
/// Always reports [`BlankCheck::NotBlank`]: because of the ECC only an erased
/// sector can be programmed, even when it already holds the erased pattern,
/// so every program has to be preceded by an erase.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::flash::{blank_check, BlankCheck};
///
/// assert_eq!(blank_check(0x0800_0000, 0x2000, 0xFF), BlankCheck::NotBlank);
/// ```
pub const fn blank_check(address: u32, size: u32, pattern: u8) -> BlankCheck {
    let _ = (address, size, pattern);
    BlankCheck::NotBlank
}

/// Size rounded up to whole quad-words.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::flash::quad_word_len;
///
/// assert_eq!(quad_word_len(0), 0);
/// assert_eq!(quad_word_len(1), 16);
/// assert_eq!(quad_word_len(20), 32);
/// assert_eq!(quad_word_len(32), 32);
/// assert_eq!(quad_word_len(u32::MAX), 0xFFFF_FFF0);
/// ```
pub const fn quad_word_len(size: u32) -> u32 {
    match size.checked_next_multiple_of(QUAD_WORD) {
        Some(len) => len,
        None => u32::MAX & !(QUAD_WORD - 1),
    }
}

/// Host buffer of a program request, `size` rounded up to whole quad-words.
///
/// The host over-allocates its page buffer, the bytes past `size` are part
/// of the request and are programmed as given.
///
/// # Safety
///
/// `ptr` must be valid for reads of [`quad_word_len`]`(size)` bytes for the
/// lifetime `'a`, and that memory must not be written in the meantime.
///
/// # Example
///
/// ```
/// use stm32h5xx_flash_algo::flash::host_buffer;
///
/// let page: [u8; 32] = [0xA5; 32];
/// let data: &[u8] = &page[..20];
/// // SAFETY: page holds 32 bytes
/// let buf: &[u8] = unsafe { host_buffer(data.as_ptr(), 20) };
/// assert_eq!(buf.len(), 32);
/// ```
pub unsafe fn host_buffer<'a>(ptr: *const u8, size: u32) -> &'a [u8] {
    unsafe { core::slice::from_raw_parts(ptr, quad_word_len(size) as usize) }
}

/// Lock state of a session.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// The control register accepts commands.
    Unlocked,
    /// The control register is locked, only [`Flash::uninit`] is accepted.
    Locked,
}

/// Flash programming session.
#[derive(Debug)]
pub struct Flash<B> {
    bus: B,
    regs: &'static dyn RegisterSet,
    geometry: Geometry,
    budgets: Budgets,
    erased_value: u8,
    function: Function,
    state: State,
}

impl<B: Bus> Flash<B> {
    /// Unlock the flash for program and erase operations.
    ///
    /// This masks interrupts, selects the secure or non-secure registers from
    /// the TrustZone state, writes the key sequence, opens the flash to the
    /// secure world if needed and reads the flash size.
    ///
    /// `clock_hz` is the core clock used to turn the [`Config`] timeouts into
    /// poll budgets, `0` selects the reset clock.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stm32h5xx_flash_algo::{
    ///     bus::Mmio,
    ///     device,
    ///     flash::{Flash, Function},
    ///     Config,
    /// };
    ///
    /// let bus = unsafe { Mmio::steal() };
    /// let config = Config::from_device(&device::STM32H5XX_2048_NS);
    /// let mut flash = Flash::init(bus, config, 0x0800_0000, 0, Function::Erase)?;
    /// flash.erase_sector(0x0810_0000)?;
    /// flash.uninit()?;
    /// # Ok::<(), stm32h5xx_flash_algo::flash::Error>(())
    /// ```
    pub fn init(
        mut bus: B,
        config: Config,
        address: u32,
        clock_hz: u32,
        function: Function,
    ) -> Result<Self, Error> {
        bus.disable_interrupts();

        let secure: bool = info::trust_zone_enabled(&mut bus);
        let regs: &'static dyn RegisterSet = regs::select(secure);
        let budgets: Budgets = config.budgets(clock_hz);

        debug!(
            "init {:#010X} clk={} fn={} secure={}",
            address,
            clock_hz,
            function as u32,
            secure
        );
        match info::dev_id(&mut bus) {
            Ok(id) => trace!("dev_id={:#05X}", id as u16),
            Err(raw) => warn!("unknown dev_id {:#05X}", raw),
        }

        let mut flash = Flash {
            bus,
            regs,
            geometry: Geometry::new(address, 0, config.bank_mode()),
            budgets,
            erased_value: crate::device::ERASED_VALUE,
            function,
            state: State::Locked,
        };

        flash.unlock()?;
        flash.state = State::Unlocked;

        flash
            .regs
            .grant_access(&mut flash.bus, flash.geometry.bank_mode());
        flash.wait_for_not_busy(flash.budgets.lock)?;

        let size: u32 = info::flash_size(&mut flash.bus);
        flash.geometry = Geometry::new(address, size, config.bank_mode());
        debug!("flash size {=u32} bytes", size);

        Ok(flash)
    }

    fn unlock(&mut self) -> Result<(), Error> {
        let keyr: u32 = self.regs.keyr();
        self.bus.write(keyr, regs::KEY1);
        self.bus.write(keyr, regs::KEY2);
        self.bus.dsb();
        self.wait_for_not_busy(self.budgets.lock)
    }

    /// Lock the flash.
    ///
    /// The session only accepts `uninit` afterwards, calling it again writes
    /// the lock bit again.
    pub fn uninit(&mut self) -> Result<(), Error> {
        self.write_cr(Cr::IDLE.set_lock());
        self.bus.dsb();
        self.state = State::Locked;
        debug!("locked");
        self.wait_for_not_busy(self.budgets.lock)
    }

    /// Set the value reported for bytes past the end of a program buffer.
    ///
    /// Defaults to `0xFF`, the erased value of every supported device.
    #[must_use = "set_erased_value returns a modified Flash"]
    pub fn set_erased_value(mut self, erased_value: u8) -> Self {
        self.erased_value = erased_value;
        self
    }

    /// Lock state of the session.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` if the secure registers drive the flash.
    pub fn is_secure(&self) -> bool {
        self.regs.is_secure()
    }

    /// Register view selected at initialization.
    pub fn registers(&self) -> &'static dyn RegisterSet {
        self.regs
    }

    /// Flash geometry: base address, size and bank organisation.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Base address passed at initialization.
    pub fn base(&self) -> u32 {
        self.geometry.base()
    }

    /// Flash size read from the device.
    pub fn size(&self) -> u32 {
        self.geometry.size()
    }

    /// Size of one bank in bytes.
    pub fn bank_size(&self) -> u32 {
        self.geometry.bank_size()
    }

    /// Sector holding `address`.
    pub fn sector(&self, address: u32) -> Sector {
        self.geometry.sector(address)
    }

    /// Start address of `sector`.
    pub fn sector_addr(&self, sector: Sector) -> u32 {
        self.geometry.sector_addr(sector)
    }

    /// Function passed at initialization.
    pub fn function(&self) -> Function {
        self.function
    }

    /// Get a reference to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Free the bus from the session.
    ///
    /// This does not lock the flash.
    pub fn free(self) -> B {
        self.bus
    }

    /// Read the status register of the selected view.
    pub fn sr(&mut self) -> Sr {
        let sr: u32 = self.regs.sr();
        Sr::new(self.bus.read(sr))
    }

    fn write_cr(&mut self, cr: Cr) {
        let addr: u32 = self.regs.cr();
        self.bus.write(addr, cr.raw())
    }

    fn set_start(&mut self) {
        let addr: u32 = self.regs.cr();
        self.bus.modify(addr, &|cr| Cr::new(cr).set_start().raw())
    }

    fn clear_errors(&mut self) {
        let ccr: u32 = self.regs.ccr();
        self.bus.write(ccr, ERROR_MASK)
    }

    fn ensure_unlocked(&self) -> Result<(), Error> {
        match self.state {
            State::Unlocked => Ok(()),
            State::Locked => Err(Error::Locked),
        }
    }

    fn wait_for_not_busy(&mut self, budget: Budget) -> Result<(), Error> {
        let mut countdown = budget.start();
        loop {
            if !self.sr().busy() {
                return Ok(());
            }
            if !countdown.tick() {
                warn!("busy wait timed out");
                return Err(Error::Timeout);
            }
            self.bus.relax();
        }
    }

    /// Fail with the flagged error, clearing the flags first.
    fn check_errors(&mut self) -> Result<(), Error> {
        let sr: Sr = self.sr();
        match sr.error() {
            None => Ok(()),
            Some(err) => {
                warn!("operation failed sr={:#010X}", sr.raw());
                self.clear_errors();
                Err(err)
            }
        }
    }

    /// Blank check of the main flash, see [`blank_check`].
    pub fn blank_check(&self, address: u32, size: u32, pattern: u8) -> BlankCheck {
        blank_check(address, size, pattern)
    }

    /// Erase both banks.
    ///
    /// The wait is bounded by the mass erase timeout of the [`Config`], which
    /// is unbounded unless set.
    ///
    /// The error flags are not evaluated after a mass erase, only a timeout
    /// fails this operation. Flags left by the erase are cleared by the next
    /// operation.
    pub fn erase_chip(&mut self) -> Result<(), Error> {
        self.ensure_unlocked()?;

        self.clear_errors();
        self.write_cr(Cr::IDLE.set_mass_erase());
        self.set_start();
        self.bus.dsb();

        self.wait_for_not_busy(self.budgets.mass_erase)?;

        let sr: Sr = self.sr();
        if sr.errors() != 0 {
            warn!("mass erase flagged sr={:#010X}", sr.raw());
        }
        Ok(())
    }

    /// Erase the 8 KiB sector holding `address`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use stm32h5xx_flash_algo::{bus::Mmio, flash::{Flash, Function}, Config};
    /// # let bus = unsafe { Mmio::steal() };
    /// let mut flash = Flash::init(bus, Config::default(), 0x0800_0000, 0, Function::Erase)?;
    /// // bank 2, page 0 of a 2 MiB device
    /// flash.erase_sector(0x0810_0000)?;
    /// # Ok::<(), stm32h5xx_flash_algo::flash::Error>(())
    /// ```
    pub fn erase_sector(&mut self, address: u32) -> Result<(), Error> {
        self.ensure_unlocked()?;

        let sector: Sector = self.geometry.sector(address);
        trace!(
            "erase {:#010X} bank={} page={}",
            address,
            sector.bank().index(),
            sector.page()
        );

        self.wait_for_not_busy(self.budgets.erase)?;
        self.clear_errors();

        self.write_cr(Cr::IDLE.set_sector_erase(sector));
        self.set_start();
        self.bus.dsb();

        self.wait_for_not_busy(self.budgets.erase)?;
        self.check_errors()
    }

    /// Program `size` bytes of `data` starting at `address`.
    ///
    /// `size` is rounded up to whole quad-words and the rounded length is
    /// programmed. Bytes past `size` come from `data` when it is long enough,
    /// bytes past the end of `data` are the erased value.
    ///
    /// The first failing quad-word aborts the operation, the quad-words
    /// before it remain programmed.
    pub fn program_page(&mut self, address: u32, size: u32, data: &[u8]) -> Result<(), Error> {
        self.ensure_unlocked()?;

        let len: u32 = quad_word_len(size);
        trace!("program {:#010X} size={=u32} len={=u32}", address, size, len);

        let mut offset: u32 = 0;
        while offset < len {
            let quad: [u8; QUAD_WORD as usize] = self.quad_word(data, offset as usize);
            self.program_quad_word(address.wrapping_add(offset), &quad)?;
            offset += QUAD_WORD;
        }

        self.write_cr(Cr::IDLE);
        Ok(())
    }

    fn quad_word(&self, data: &[u8], offset: usize) -> [u8; QUAD_WORD as usize] {
        let mut quad = [self.erased_value; QUAD_WORD as usize];
        if let Some(src) = data.get(offset..) {
            let n: usize = src.len().min(quad.len());
            quad[..n].copy_from_slice(&src[..n]);
        }
        quad
    }

    fn program_quad_word(
        &mut self,
        address: u32,
        quad: &[u8; QUAD_WORD as usize],
    ) -> Result<(), Error> {
        self.wait_for_not_busy(self.budgets.program)?;
        self.clear_errors();
        self.write_cr(Cr::IDLE.set_pg());

        let mut addr: u32 = address;
        for lane in quad.chunks_exact(4) {
            let word: u32 = u32::from(lane[0])
                | u32::from(lane[1]) << 8
                | u32::from(lane[2]) << 16
                | u32::from(lane[3]) << 24;
            self.bus.write(addr, word);
            addr = addr.wrapping_add(4);
        }
        self.bus.dsb();

        self.wait_for_not_busy(self.budgets.program)?;
        self.check_errors()
    }
}
