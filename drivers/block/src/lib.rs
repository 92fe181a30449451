//! Block Device Layer
//!
//! Provides abstraction for block devices (hard drives, SSDs, etc.)

#![no_std]

extern crate alloc;
extern crate rinux_kernel as kernel;

pub mod device;
pub mod partition;

use alloc::vec::Vec;
use alloc::sync::Arc;
use spin::Mutex;
use device::BlockDevice;

/// Global list of block devices
static BLOCK_DEVICES: Mutex<Vec<Arc<dyn BlockDevice>>> = Mutex::new(Vec::new());

/// Register a block device
pub fn register_device(device: Arc<dyn BlockDevice>) -> Result<(), &'static str> {
    kernel::kinfo!("block: registered device {:?}", device.name());
    let mut devices = BLOCK_DEVICES.lock();
    devices.push(device);
    Ok(())
}

/// Get a block device by index
pub fn get_device(index: usize) -> Option<Arc<dyn BlockDevice>> {
    let devices = BLOCK_DEVICES.lock();
    devices.get(index).cloned()
}

/// Get number of registered block devices
pub fn device_count() -> usize {
    BLOCK_DEVICES.lock().len()
}

/// Initialize block device subsystem
///
/// Real hardware transports (AHCI, NVMe, ...) register themselves through
/// [`register_device`] before this runs; this crate only owns the registry
/// and the MBR reader.
pub fn init() {}
