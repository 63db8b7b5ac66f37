// device.rs — Maps the `cpu | gpu` selector to a candle device.
//
// `gpu` means CUDA if present, else Metal, else an error. A GPU request never
// silently runs on the CPU.

use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;

use crate::error::{Error, Result};
use crate::options::DeviceArg;

pub fn select_device(arg: DeviceArg) -> Result<Device> {
    match arg {
        DeviceArg::Cpu => Ok(Device::Cpu),
        DeviceArg::Gpu => {
            if cuda_is_available() {
                let device = Device::new_cuda(0).map_err(|e| Error::DeviceUnavailable {
                    device: arg,
                    reason: format!("CUDA device 0: {e}"),
                })?;
                log::info!("Selected CUDA device 0");
                Ok(device)
            } else if metal_is_available() {
                let device = Device::new_metal(0).map_err(|e| Error::DeviceUnavailable {
                    device: arg,
                    reason: format!("Metal device 0: {e}"),
                })?;
                log::info!("Selected Metal device 0");
                Ok(device)
            } else {
                Err(Error::DeviceUnavailable {
                    device: arg,
                    reason: gpu_hint().to_string(),
                })
            }
        }
    }
}

/// Which accelerator backends this build can use.
pub fn available_backends() -> (bool, bool) {
    (cuda_is_available(), metal_is_available())
}

pub fn device_name(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "CPU",
        Device::Cuda(_) => "CUDA",
        Device::Metal(_) => "Metal",
    }
}

fn gpu_hint() -> &'static str {
    if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        "no GPU backend compiled in; build with `--features metal`"
    } else {
        "no GPU backend available; build with `--features cuda` on a machine with an NVIDIA GPU"
    }
}
