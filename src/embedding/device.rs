use candle_core::Device;
use tracing::{debug, info, warn};

type DeviceCtor = fn(usize) -> candle_core::Result<Device>;

/// Accelerator backends compiled into this build, in preference order.
fn accelerators() -> Vec<(&'static str, DeviceCtor)> {
    #[allow(unused_mut)]
    let mut backends: Vec<(&'static str, DeviceCtor)> = Vec::new();
    #[cfg(feature = "metal")]
    backends.push(("metal", Device::new_metal));
    #[cfg(feature = "cuda")]
    backends.push(("cuda", Device::new_cuda));
    backends
}

/// Picks the first accelerator that initializes, else the CPU.
///
/// Shared by the sentence embedder and the sequence classifier.
pub fn select_device() -> Device {
    let backends = accelerators();
    if backends.is_empty() {
        debug!("No GPU backend compiled, using CPU");
        return Device::Cpu;
    }

    for (name, ctor) in backends {
        match ctor(0) {
            Ok(device) => {
                info!(backend = name, "Using GPU acceleration");
                return device;
            }
            Err(e) => warn!(backend = name, error = %e, "GPU device unavailable"),
        }
    }

    warn!("Falling back to CPU device");
    Device::Cpu
}
