//! Model of the STM32H5 flash controller for host tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use stm32h5xx_flash_algo::{
    bus::Bus,
    info::{DBGMCU_IDCODE, FLASHSIZE},
    regs::{self, ERROR_MASK},
};

pub const NS_BASE: u32 = 0x0800_0000;
pub const S_BASE: u32 = 0x0C00_0000;
pub const SECTOR: u32 = 0x2000;

pub const BSY: u32 = 1;
pub const EOP: u32 = 1 << 16;
pub const WRPERR: u32 = 1 << 17;
pub const PGSERR: u32 = 1 << 18;
pub const INCERR: u32 = 1 << 20;

const CR_LOCK: u32 = 1;
const CR_PG: u32 = 1 << 1;
const CR_SER: u32 = 1 << 2;
const CR_STRT: u32 = 1 << 5;
const CR_MER: u32 = 1 << 15;

/// Observable bus events, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write(u32, u32),
    Dsb,
    IrqOff,
}

/// One register view of the controller.
#[derive(Debug, Default, Clone)]
pub struct View {
    pub cr: u32,
    pub sr: u32,
    key_stage: u8,
    pub locked_out: bool,
}

impl View {
    fn reset() -> View {
        View {
            cr: CR_LOCK,
            ..View::default()
        }
    }

    fn locked(&self) -> bool {
        self.cr & CR_LOCK != 0
    }
}

#[derive(Debug)]
pub struct Sim {
    pub mem: Vec<u8>,
    pub size: u32,
    pub trust_zone: bool,
    pub dev_id: u32,
    pub ns: View,
    pub sec: View,
    pub regs: BTreeMap<u32, u32>,
    pub events: Vec<Event>,
    pub irq_disabled: bool,
    /// Polls of the status register reporting busy after each operation.
    pub latency: u32,
    /// The busy flag never clears.
    pub stuck: bool,
    /// Write protected sectors, indexed from the start of the flash.
    pub protected: HashSet<u32>,
    /// Status bits raised by the next completed operation.
    pub inject: u32,
    busy_polls: u32,
    pending: Vec<(u32, u32)>,
}

impl Sim {
    /// Non-secure device with `size` bytes of erased flash.
    pub fn new(size: u32) -> Sim {
        Sim {
            mem: vec![0xFF; size as usize],
            size,
            trust_zone: false,
            dev_id: 0x1000_6484,
            ns: View::reset(),
            sec: View::reset(),
            regs: BTreeMap::new(),
            events: Vec::new(),
            irq_disabled: false,
            latency: 2,
            stuck: false,
            protected: HashSet::new(),
            inject: 0,
            busy_polls: 0,
            pending: Vec::new(),
        }
    }

    /// Device with TrustZone enabled.
    pub fn secure(size: u32) -> Sim {
        Sim {
            trust_zone: true,
            ..Sim::new(size)
        }
    }

    pub fn protect(&mut self, addr: u32) {
        let sector: u32 = self.offset(addr).expect("address outside flash") / SECTOR;
        self.protected.insert(sector);
    }

    pub fn mem_at(&self, addr: u32, len: usize) -> &[u8] {
        let start: usize = self.offset(addr).expect("address outside flash") as usize;
        &self.mem[start..start + len]
    }

    pub fn fill(&mut self, addr: u32, len: usize, val: u8) {
        let start: usize = self.offset(addr).expect("address outside flash") as usize;
        self.mem[start..start + len].fill(val);
    }

    /// Values written to `addr`, in order.
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|ev| match *ev {
                Event::Write(a, v) if a == addr => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Writes to any of `addrs`, in order.
    pub fn writes_among(&self, addrs: &[u32]) -> Vec<(u32, u32)> {
        self.events
            .iter()
            .filter_map(|ev| match *ev {
                Event::Write(a, v) if addrs.contains(&a) => Some((a, v)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn offset(&self, addr: u32) -> Option<u32> {
        [NS_BASE, S_BASE]
            .iter()
            .find(|&&base| addr >= base && addr - base < self.size)
            .map(|&base| addr - base)
    }

    fn view(&mut self, secure: bool) -> &mut View {
        if secure { &mut self.sec } else { &mut self.ns }
    }

    fn start_busy(&mut self) {
        self.busy_polls = self.latency;
    }

    fn complete(&mut self, secure: bool, err: u32) {
        let inject: u32 = core::mem::take(&mut self.inject);
        let view: &mut View = self.view(secure);
        view.sr |= EOP | err | inject;
        self.start_busy();
    }

    fn bank_size(&self) -> u32 {
        self.size / 2
    }

    fn write_key(&mut self, secure: bool, val: u32) {
        let view: &mut View = self.view(secure);
        match (view.key_stage, val) {
            (0, regs::KEY1) => view.key_stage = 1,
            (1, regs::KEY2) => {
                view.key_stage = 0;
                if !view.locked_out {
                    view.cr &= !CR_LOCK;
                }
            }
            _ => {
                view.key_stage = 0;
                view.locked_out = true;
            }
        }
    }

    fn write_cr(&mut self, secure: bool, val: u32) {
        if self.view(secure).locked() {
            return;
        }
        self.view(secure).cr = val & !CR_STRT;
        if val & CR_STRT == 0 {
            return;
        }

        if val & CR_SER != 0 {
            let page: u32 = (val >> 6) & 0x7F;
            let bank: u32 = val >> 31;
            let offset: u32 = bank * self.bank_size() + page * SECTOR;
            let err: u32 = if self.protected.contains(&(offset / SECTOR)) {
                WRPERR
            } else {
                let start: usize = offset as usize;
                self.mem[start..start + SECTOR as usize].fill(0xFF);
                0
            };
            self.complete(secure, err);
        } else if val & CR_MER != 0 {
            let err: u32 = if self.protected.is_empty() {
                self.mem.fill(0xFF);
                0
            } else {
                WRPERR
            };
            self.complete(secure, err);
        } else {
            self.complete(secure, PGSERR);
        }
    }

    fn write_mem(&mut self, addr: u32, val: u32) {
        let secure: bool = addr >= S_BASE;
        let offset: u32 = self.offset(addr).expect("flash write outside flash");
        let cr: u32 = self.view(secure).cr;
        if cr & CR_LOCK != 0 || cr & CR_PG == 0 {
            self.view(secure).sr |= PGSERR;
            return;
        }

        self.pending.push((offset, val));
        if self.pending.len() < 4 {
            return;
        }

        let words: Vec<(u32, u32)> = core::mem::take(&mut self.pending);
        let quad: u32 = words[0].0 & !0xF;
        let consistent: bool = words
            .iter()
            .enumerate()
            .all(|(n, &(off, _))| off == quad + 4 * n as u32);
        let err: u32 = if !consistent {
            INCERR
        } else if self.protected.contains(&(quad / SECTOR)) {
            WRPERR
        } else {
            for &(off, word) in words.iter() {
                for (n, byte) in word.to_le_bytes().iter().enumerate() {
                    // programming only clears bits
                    self.mem[off as usize + n] &= byte;
                }
            }
            0
        };
        self.complete(secure, err);
    }

    fn read_sr(&mut self, secure: bool) -> u32 {
        let sr: u32 = self.view(secure).sr;
        if self.stuck {
            sr | BSY
        } else if self.busy_polls > 0 {
            self.busy_polls -= 1;
            sr | BSY
        } else {
            sr
        }
    }

    pub fn error_flags(&self, secure: bool) -> u32 {
        let view: &View = if secure { &self.sec } else { &self.ns };
        view.sr & ERROR_MASK
    }
}

impl Bus for Sim {
    fn read(&mut self, addr: u32) -> u32 {
        match addr {
            regs::NSSR => self.read_sr(false),
            regs::SECSR => self.read_sr(true),
            regs::NSCR => self.ns.cr,
            regs::SECCR => self.sec.cr,
            regs::OPTSR2_PRG => {
                if self.trust_zone {
                    0xB400_00F8
                } else {
                    0xC300_00F8
                }
            }
            FLASHSIZE => 0xFFFF_0000 | (self.size >> 10),
            DBGMCU_IDCODE => self.dev_id,
            _ => match self.offset(addr) {
                Some(off) => {
                    let off: usize = off as usize;
                    u32::from_le_bytes([
                        self.mem[off],
                        self.mem[off + 1],
                        self.mem[off + 2],
                        self.mem[off + 3],
                    ])
                }
                None => self.regs.get(&addr).copied().unwrap_or(0),
            },
        }
    }

    fn write(&mut self, addr: u32, val: u32) {
        self.events.push(Event::Write(addr, val));
        match addr {
            regs::NSKEYR => self.write_key(false, val),
            regs::SECKEYR => self.write_key(true, val),
            regs::NSCR => self.write_cr(false, val),
            regs::SECCR => self.write_cr(true, val),
            regs::NSCCR => self.ns.sr &= !val,
            regs::SECCCR => self.sec.sr &= !val,
            _ if self.offset(addr).is_some() => self.write_mem(addr, val),
            _ => {
                self.regs.insert(addr, val);
            }
        }
    }

    fn dsb(&mut self) {
        self.events.push(Event::Dsb);
    }

    fn disable_interrupts(&mut self) {
        self.irq_disabled = true;
        self.events.push(Event::IrqOff);
    }
}
