use stm32_metapac::FLASH;
use stm32h5xx_flash_algo::regs;

fn addr<T>(ptr: *mut T) -> u32 {
    ptr as usize as u32
}

#[test]
fn register_map_matches_pac() {
    assert_eq!(addr(FLASH.as_ptr()), regs::FLASH_BASE);
    assert_eq!(addr(FLASH.nskeyr().as_ptr()), regs::NSKEYR);
    assert_eq!(addr(FLASH.seckeyr().as_ptr()), regs::SECKEYR);
    assert_eq!(addr(FLASH.nssr().as_ptr()), regs::NSSR);
    assert_eq!(addr(FLASH.secsr().as_ptr()), regs::SECSR);
    assert_eq!(addr(FLASH.nscr().as_ptr()), regs::NSCR);
    assert_eq!(addr(FLASH.seccr().as_ptr()), regs::SECCR);
    assert_eq!(addr(FLASH.nsccr().as_ptr()), regs::NSCCR);
    assert_eq!(addr(FLASH.secccr().as_ptr()), regs::SECCCR);
    assert_eq!(addr(FLASH.optsr2_prg().as_ptr()), regs::OPTSR2_PRG);
}

#[test]
fn block_based_registers_follow_bank_layout() {
    for (n, (bb1, bb2)) in regs::SECBB1R.iter().zip(regs::SECBB2R.iter()).enumerate() {
        assert_eq!(*bb1, regs::FLASH_BASE + 0x0A0 + 4 * n as u32);
        assert_eq!(bb2 - bb1, 0x100);
    }
}
