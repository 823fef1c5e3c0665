use flash_algorithm::{ErrorCode, FlashAlgorithm, Function, algorithm};
use hal::{
    device::{self, Device},
    flash,
};

#[cfg(feature = "defmt")]
use defmt_rtt as _;

cfg_if::cfg_if! {
    if #[cfg(feature = "h5xx-2048-s")] {
        const DEVICE: Device = device::STM32H5XX_2048_S;
    } else if #[cfg(feature = "h5xx-1024-ns")] {
        const DEVICE: Device = device::STM32H5XX_1024_NS;
    } else if #[cfg(feature = "h5xx-1024-s")] {
        const DEVICE: Device = device::STM32H5XX_1024_S;
    } else if #[cfg(feature = "h5xx-512-ns")] {
        const DEVICE: Device = device::STM32H5XX_512_NS;
    } else if #[cfg(feature = "h5xx-512-s")] {
        const DEVICE: Device = device::STM32H5XX_512_S;
    } else if #[cfg(feature = "h5xx-256-ns")] {
        const DEVICE: Device = device::STM32H5XX_256_NS;
    } else if #[cfg(feature = "h5xx-256-s")] {
        const DEVICE: Device = device::STM32H5XX_256_S;
    } else if #[cfg(feature = "h503-128-ns")] {
        const DEVICE: Device = device::STM32H503_128_NS;
    } else if #[cfg(feature = "h5xx-2048-ns")] {
        const DEVICE: Device = device::STM32H5XX_2048_NS;
    } else {
        compile_error!("a device feature must be enabled, for example `h5xx-2048-ns`");
    }
}

algorithm!(Algorithm, {
    device_name: DEVICE.name,
    device_type: DeviceType::Onchip,
    flash_address: DEVICE.base,
    flash_size: DEVICE.size,
    page_size: DEVICE.page_size,
    empty_value: DEVICE.erased_value,
    program_time_out: DEVICE.program_timeout_ms,
    erase_time_out: DEVICE.erase_timeout_ms,
    sectors: [{
        size: DEVICE.sector_size,
        address: 0x0,
    }]
});

fn function(function: Function) -> flash::Function {
    match function {
        Function::Erase => flash::Function::Erase,
        Function::Program => flash::Function::Program,
        Function::Verify => flash::Function::Verify,
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "opt")] {
        use hal::opt::OptionBytes;

        struct Algorithm {
            opt: OptionBytes,
        }

        impl FlashAlgorithm for Algorithm {
            fn new(address: u32, clock: u32, f: Function) -> Result<Self, ErrorCode> {
                let opt: OptionBytes =
                    OptionBytes::init(address, clock, function(f)).map_err(flash::Error::code)?;
                Ok(Algorithm { opt })
            }

            fn erase_all(&mut self) -> Result<(), ErrorCode> {
                self.opt.erase_chip().map_err(flash::Error::code)
            }

            fn erase_sector(&mut self, addr: u32) -> Result<(), ErrorCode> {
                self.opt.erase_sector(addr).map_err(flash::Error::code)
            }

            fn program_page(&mut self, addr: u32, data: &[u8]) -> Result<(), ErrorCode> {
                self.opt
                    .program_page(addr, data.len() as u32, data)
                    .map_err(flash::Error::code)
            }

            fn blank_check(
                &mut self,
                address: u32,
                size: u32,
                pattern: u8,
            ) -> Result<(), ErrorCode> {
                self.opt.blank_check(address, size, pattern).result()
            }

            fn verify(
                &mut self,
                address: u32,
                size: u32,
                data: Option<&[u8]>,
            ) -> Result<(), ErrorCode> {
                self.opt.verify_range(address, size, data.unwrap_or(&[]))
            }
        }

        impl Drop for Algorithm {
            fn drop(&mut self) {
                let _ = self.opt.uninit();
            }
        }
    } else {
        use hal::{Config, Flash, bus::Mmio};

        struct Algorithm {
            flash: Flash<Mmio>,
        }

        impl FlashAlgorithm for Algorithm {
            fn new(address: u32, clock: u32, f: Function) -> Result<Self, ErrorCode> {
                // the debugger halts the core, nothing else owns the controller
                let bus: Mmio = unsafe { Mmio::steal() };
                let config: Config = Config::from_device(&DEVICE);
                let flash: Flash<Mmio> = Flash::init(bus, config, address, clock, function(f))
                    .map_err(flash::Error::code)?;
                Ok(Algorithm { flash })
            }

            fn erase_all(&mut self) -> Result<(), ErrorCode> {
                self.flash.erase_chip().map_err(flash::Error::code)
            }

            fn erase_sector(&mut self, addr: u32) -> Result<(), ErrorCode> {
                self.flash.erase_sector(addr).map_err(flash::Error::code)
            }

            fn program_page(&mut self, addr: u32, data: &[u8]) -> Result<(), ErrorCode> {
                let size: u32 = data.len() as u32;
                // SAFETY: the host page buffer is a whole number of quad-words
                let buf: &[u8] = unsafe { flash::host_buffer(data.as_ptr(), size) };
                self.flash
                    .program_page(addr, size, buf)
                    .map_err(flash::Error::code)
            }

            fn blank_check(
                &mut self,
                address: u32,
                size: u32,
                pattern: u8,
            ) -> Result<(), ErrorCode> {
                self.flash.blank_check(address, size, pattern).result()
            }
        }

        impl Drop for Algorithm {
            fn drop(&mut self) {
                let _ = self.flash.uninit();
            }
        }
    }
}
