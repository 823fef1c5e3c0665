//! STM32H5 flash algorithm.
//!
//! Unlock, erase and program the dual-bank flash of the STM32H5 family from
//! a flash algorithm loaded into RAM by a debugger.
#![cfg_attr(not(test), no_std)]

mod macros;

pub mod addr;
pub mod bus;
pub mod config;
pub mod device;
pub mod flash;
pub mod info;
pub mod opt;
pub mod poll;
pub mod regs;

pub use config::Config;
pub use flash::{Error, Flash};
