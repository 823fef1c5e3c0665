mod common;

use common::{NS_BASE, Sim};
use stm32h5xx_flash_algo::{
    Config,
    flash::{self, BlankCheck, Flash, Function},
    opt::{self, OptionBytes},
};

#[test]
fn main_flash_is_never_blank() {
    let flash = Flash::init(Sim::new(0x0020_0000), Config::default(), NS_BASE, 0, Function::Program)
        .unwrap();

    // erased memory still reports not blank
    let result: BlankCheck = flash.blank_check(NS_BASE, 0x2000, 0xFF);
    assert_eq!(result, BlankCheck::NotBlank);
    assert_eq!(result.code(), 1);
    assert_eq!(result.result().map_err(|e| e.get()), Err(1));
    assert_eq!(flash::blank_check(0x0C00_0000, 0, 0x00), BlankCheck::NotBlank);
}

#[test]
fn option_bytes_accept_everything() {
    let mut opt: OptionBytes = OptionBytes::init(0x4002_2000, 0, Function::Erase).unwrap();
    assert_eq!(opt.function(), Function::Erase);

    assert_eq!(opt.blank_check(0x4002_2000, 0x100, 0xFF), BlankCheck::Blank);
    assert_eq!(BlankCheck::Blank.code(), 0);
    assert_eq!(opt.blank_check(0x4002_2000, 0x100, 0xFF).result(), Ok(()));
    assert_eq!(opt.erase_chip(), Ok(()));
    assert_eq!(opt.erase_sector(0x4002_2000), Ok(()));
    assert_eq!(opt.program_page(0x4002_2000, 16, &[0; 16]), Ok(()));
    assert_eq!(opt.verify(0x4002_2000, 0x20, &[0; 0x20]), 0x4002_2020);
    assert_eq!(opt.verify_range(0x4002_2000, 0x20, &[]), Ok(()));
    assert_eq!(opt.uninit(), Ok(()));
}

#[test]
fn option_verify_reports_end() {
    assert_eq!(opt::verify(0x1000, 0, &[]), 0x1000);
    assert_eq!(opt::verify(0xFFFF_FFF0, 0x20, &[]), 0x10);
}
