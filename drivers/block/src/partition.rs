//! MBR Partition Table Support
//!
//! Reads the legacy Master Boot Record partition table from LBA 0.
//! GPT and other schemes are not supported.

use crate::device::{BlockDevice, BlockDeviceError};
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Disk partition table type, as passed down to a filesystem's
/// `read_superblock` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskPartitionTableType {
    /// Master Boot Record
    Mbr,
}

/// One entry of the MBR partition table.
#[derive(Debug, Clone, Copy)]
pub struct MbrPartitionEntry {
    /// 1-based partition number (0..4 primary slots)
    pub number: u32,
    /// Raw MBR partition type byte (0x0B/0x0C for FAT32, etc.)
    pub partition_type: u8,
    /// Starting LBA, absolute (not relative to any earlier partition)
    pub starting_lba: u64,
    /// Total number of sectors in the partition
    pub total_sectors: u64,
}

impl MbrPartitionEntry {
    pub fn is_empty(&self) -> bool {
        self.partition_type == 0
    }
}

/// Read and parse the MBR partition table at LBA 0 of `device`.
///
/// Returns up to 4 primary partition entries, empty ones included so that
/// the caller's partition index lines up with the on-disk table offset.
pub fn read_partition_table(
    device: &dyn BlockDevice,
) -> Result<Vec<MbrPartitionEntry>, BlockDeviceError> {
    let mut sector = [0u8; 512];
    device.read_blocks(0, &mut sector)?;

    if sector[510] != 0x55 || sector[511] != 0xAA {
        return Err(BlockDeviceError::ReadError);
    }

    let mut entries = Vec::with_capacity(4);
    for i in 0..4u32 {
        let offset = 446 + (i as usize) * 16;
        let partition_type = sector[offset + 4];

        let starting_lba = u32::from_le_bytes([
            sector[offset + 8],
            sector[offset + 9],
            sector[offset + 10],
            sector[offset + 11],
        ]) as u64;

        let total_sectors = u32::from_le_bytes([
            sector[offset + 12],
            sector[offset + 13],
            sector[offset + 14],
            sector[offset + 15],
        ]) as u64;

        entries.push(MbrPartitionEntry {
            number: i,
            partition_type,
            starting_lba,
            total_sectors,
        });
    }

    Ok(entries)
}

/// Fetch partition `index` from `device`'s MBR table.
pub fn partition(
    device: Arc<dyn BlockDevice>,
    index: usize,
) -> Result<MbrPartitionEntry, BlockDeviceError> {
    let table = read_partition_table(device.as_ref())?;
    table
        .get(index)
        .copied()
        .ok_or(BlockDeviceError::InvalidOffset)
}
