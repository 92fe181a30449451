//! Kernel Initialization
//!
//! Early kernel initialization routines.

use crate::printk::printk;

/// Perform early initialization
pub fn early_init() {
    printk("Early kernel initialization...\n");

    // Setup interrupt handlers
    // Initialize timers
    // Setup per-CPU data structures

    printk("Early initialization complete\n");
}

/// Perform main initialization
pub fn main_init() {
    printk("Main kernel initialization...\n");

    // Initialize scheduler
    // Setup system calls
    // Initialize device drivers

    printk("Main initialization complete\n");
}

/// Perform late initialization
pub fn late_init() {
    printk("Late kernel initialization...\n");

    // Start user space init
    // Mount root filesystem

    printk("Late initialization complete\n");
}
