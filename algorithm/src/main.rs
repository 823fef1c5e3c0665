//! STM32H5 flash algorithm image
//!
//! Built for `thumbv8m.main-none-eabihf` this produces the position
//! independent image a debugger loads into RAM. On any other target it
//! builds to an empty program.
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod algo;

#[cfg(not(target_os = "none"))]
fn main() {}
