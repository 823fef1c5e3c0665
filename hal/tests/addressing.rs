use static_assertions as sa;
use stm32h5xx_flash_algo::{
    addr::{Bank, BankMode, Geometry, SECTOR_SIZE, Sector},
    device::{self, Device},
    flash::Function,
};

sa::const_assert_eq!(SECTOR_SIZE, 0x2000);
sa::const_assert_eq!(device::STM32H5XX_2048_NS.size, 0x0020_0000);
sa::assert_impl_all!(stm32h5xx_flash_algo::regs::NonSecure: Sync);
sa::assert_impl_all!(stm32h5xx_flash_algo::regs::Secure: Sync);

const BASE: u32 = 0x0800_0000;
const SIZE_2M: u32 = 0x0020_0000;

fn dual(base: u32, size: u32) -> Geometry {
    Geometry::new(base, size, BankMode::Dual)
}

#[test]
fn bank_is_monotonic() {
    let geo: Geometry = dual(BASE, SIZE_2M);
    let mut prev: Bank = Bank::Bank1;
    for addr in (BASE..BASE + SIZE_2M).step_by(0x1000) {
        let bank: Bank = geo.bank(addr);
        assert!(bank >= prev, "bank decreased at {addr:#010X}");
        prev = bank;
    }
    assert_eq!(prev, Bank::Bank2);
}

#[test]
fn bank_boundary_is_half_size() {
    for size in [0x0002_0000, 0x0004_0000, 0x0008_0000, 0x0010_0000, SIZE_2M] {
        let geo: Geometry = dual(BASE, size);
        let half: u32 = BASE + size / 2;
        assert_eq!(geo.bank(half - 1), Bank::Bank1);
        assert_eq!(geo.bank(half), Bank::Bank2);
    }
}

#[test]
fn page_repeats_every_bank() {
    let geo: Geometry = dual(BASE, SIZE_2M);
    let bank_size: u32 = geo.bank_size();
    for addr in (BASE..BASE + bank_size).step_by(0x800) {
        assert_eq!(geo.page(addr), geo.page(addr + bank_size));
    }
}

#[test]
fn sector_scenarios() {
    let geo: Geometry = dual(BASE, SIZE_2M);
    assert_eq!(geo.sector(0x0810_0000), Sector::new(Bank::Bank2, 0));
    assert_eq!(geo.sector(0x0800_0000), Sector::new(Bank::Bank1, 0));
    assert_eq!(geo.sector(0x0800_3FFF), Sector::new(Bank::Bank1, 1));
    assert_eq!(geo.sector(0x081F_E000), Sector::new(Bank::Bank2, 127));

    let secure: Geometry = dual(0x0C00_0000, SIZE_2M);
    assert_eq!(secure.sector(0x0C10_2000), Sector::new(Bank::Bank2, 1));
}

#[test]
fn sector_addr_inverts_sector() {
    let geo: Geometry = dual(BASE, 0x0004_0000);
    for addr in (BASE..BASE + 0x0004_0000).step_by(SECTOR_SIZE as usize) {
        assert_eq!(geo.sector_addr(geo.sector(addr)), addr);
    }
}

#[test]
fn single_bank_never_selects_bank2() {
    let geo: Geometry = Geometry::new(BASE, SIZE_2M, BankMode::Single);
    assert_eq!(geo.bank(BASE + SIZE_2M - 1), Bank::Bank1);
    assert_eq!(geo.bank_size(), SIZE_2M);
    assert_eq!(geo.page(0x0800_2000), 1);
    assert_eq!(geo.page(0x0804_0000), 0x20);
}

#[test]
fn descriptors() {
    assert_eq!(device::ALL.len(), 9);
    for dev in device::ALL.iter() {
        let dev: &Device = dev;
        assert_eq!(dev.sector_size, SECTOR_SIZE);
        assert_eq!(dev.page_size, 1024);
        assert_eq!(dev.erased_value, 0xFF);
        assert_eq!(dev.size % SECTOR_SIZE, 0);
        assert!(dev.size.is_power_of_two());
        assert_eq!(dev.is_secure_alias(), dev.base == 0x0C00_0000);
        assert_eq!(dev.is_secure_alias(), dev.name.contains(" Secure"));
    }
    assert_eq!(device::STM32H503_128_NS.end(), 0x0801_FFFF);
}

#[test]
fn function_codes() {
    assert_eq!(Function::try_from(1u32), Ok(Function::Erase));
    assert_eq!(Function::try_from(2u32), Ok(Function::Program));
    assert_eq!(Function::try_from(3u32), Ok(Function::Verify));
    assert_eq!(Function::try_from(0u32), Err(0));
    assert_eq!(Function::try_from(4u32), Err(4));
}
