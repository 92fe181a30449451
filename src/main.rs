//! Rinux Kernel Main Entry Point
//!
//! This is the main entry point for the Rinux kernel.

#![no_std]
#![no_main]
#![feature(panic_info_message)]

use core::panic::PanicInfo;

/// Kernel entry point
#[no_mangle]
pub extern "C" fn _start() -> ! {
    rinux_kernel::printk::init();
    rinux_kernel::printk::printk("Rinux kernel starting...\n");
    rinux_kernel::printk::printk("Version: 0.1.0\n");

    rinux_mm::init();
    rinux_kernel::init();
    rinux_block::init();
    rinux_fs::init();

    rinux_kernel::printk::printk("Rinux kernel initialization complete!\n");

    // A platform block-device driver registers itself with rinux_block
    // and drives rinux_fs::fat32::read_superblock from here; neither is
    // wired into this entry point.
    loop {
        unsafe {
            core::arch::asm!("hlt");
        }
    }
}

/// Panic handler
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use rinux_kernel::printk::printk;

    printk("\n\n!!! KERNEL PANIC !!!\n");

    if let Some(location) = info.location() {
        printk("Location: ");
        printk(location.file());
        printk("\n");
    }

    if let Some(message) = info.message() {
        rinux_kernel::printkln!("Message: {}", message);
    }

    loop {
        unsafe {
            core::arch::asm!("hlt");
        }
    }
}
