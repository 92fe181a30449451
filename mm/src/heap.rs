//! Kernel Heap
//!
//! Heap memory management for kernel allocations.

/// Initialize kernel heap
pub fn init() {
    // Set up heap memory region
    // This would typically involve:
    // 1. Allocating physical frames
    // 2. Mapping them to virtual memory
    // 3. Setting up the heap allocator
}
