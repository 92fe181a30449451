//! FAT32 read/lookup driver.
//!
//! Flow: mount builds geometry ([`boot_sector`]) and the root inode; a
//! path walk ([`inode::path_walk`]) invokes the directory scanner
//! ([`dir_entry`]) per path segment, which drives the chain iterator
//! ([`chain`]) over the FAT entry engine ([`table`]).

pub mod boot_sector;
pub mod chain;
pub mod dir_entry;
pub mod inode;
pub mod table;

pub use inode::{mount, path_walk, write_inode, Fat32InodeInfo, Fat32Superblock, FatTimestamp};

use crate::vfs::FilesystemType;
use crate::FsError;
use alloc::sync::Arc;
use rinux_block::device::BlockDevice;
use rinux_block::partition::DiskPartitionTableType;

pub const FILESYSTEM_TYPE: FilesystemType = FilesystemType {
    name: "FAT32",
    flags: 0,
};

/// `filesystem_type.read_superblock`: validate the partition table scheme
/// and hand off to [`mount`].
pub fn read_superblock(
    device: Arc<dyn BlockDevice>,
    dpt_type: DiskPartitionTableType,
    partition_index: usize,
) -> Result<Arc<Fat32Superblock>, FsError> {
    match dpt_type {
        DiskPartitionTableType::Mbr => mount(device, partition_index),
    }
}
