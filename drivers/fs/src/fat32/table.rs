//! FAT entry engine: 28-bit entry read/write with dual-mirror writes.

use crate::fat32::boot_sector::Geometry;
use crate::FsError;
use alloc::vec;
use rinux_block::device::BlockDevice;

const END_OF_CHAIN_MIN: u32 = 0x0FFF_FFF7;

pub fn is_end_of_chain(entry: u32) -> bool {
    entry >= END_OF_CHAIN_MIN
}

fn validate_cluster(geometry: &Geometry, cluster: u32) -> Result<(), FsError> {
    if geometry.is_valid_cluster(cluster) {
        Ok(())
    } else {
        Err(FsError::InvalidArgument)
    }
}

fn sector_and_offset(geometry: &Geometry, cluster: u32) -> (u64, usize) {
    let entries_per_sector = geometry.bytes_per_sector as u64 / 4;
    let sector_index = cluster as u64 / entries_per_sector;
    let offset = (cluster as u64 % entries_per_sector) as usize * 4;
    (sector_index, offset)
}

pub fn read_fat_entry(device: &dyn BlockDevice, geometry: &Geometry, cluster: u32) -> Result<u32, FsError> {
    validate_cluster(geometry, cluster)?;
    let (sector_index, offset) = sector_and_offset(geometry, cluster);
    let mut buf = vec![0u8; geometry.bytes_per_sector as usize];
    device.read_blocks(geometry.fat1_lba + sector_index, &mut buf)?;
    let word = u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]);
    Ok(word & 0x0FFF_FFFF)
}

/// Read-modify-write FAT1, preserving the reserved top 4 bits, then mirror
/// the identical sector to FAT2. FAT1 is authoritative if a crash lands
/// between the two writes.
pub fn write_fat_entry(
    device: &dyn BlockDevice,
    geometry: &Geometry,
    cluster: u32,
    value: u32,
) -> Result<(), FsError> {
    validate_cluster(geometry, cluster)?;
    let (sector_index, offset) = sector_and_offset(geometry, cluster);
    let mut buf = vec![0u8; geometry.bytes_per_sector as usize];
    device.read_blocks(geometry.fat1_lba + sector_index, &mut buf)?;

    let old = u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]);
    let new = (old & 0xF000_0000) | (value & 0x0FFF_FFFF);
    buf[offset..offset + 4].copy_from_slice(&new.to_le_bytes());

    device.write_blocks(geometry.fat1_lba + sector_index, &buf)?;
    if geometry.num_fats >= 2 {
        device.write_blocks(geometry.fat2_lba + sector_index, &buf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use rinux_block::device::BlockDeviceError;
    use spin::Mutex;

    struct MemDisk {
        sectors: Mutex<vec::Vec<[u8; 512]>>,
    }

    impl BlockDevice for MemDisk {
        fn name(&self) -> &str {
            "memdisk"
        }
        fn block_size(&self) -> usize {
            512
        }
        fn num_blocks(&self) -> u64 {
            self.sectors.lock().len() as u64
        }
        fn read_blocks(&self, block_offset: u64, buffer: &mut [u8]) -> Result<usize, BlockDeviceError> {
            let sectors = self.sectors.lock();
            let sector = sectors.get(block_offset as usize).ok_or(BlockDeviceError::InvalidOffset)?;
            buffer[..512].copy_from_slice(sector);
            Ok(1)
        }
        fn write_blocks(&self, block_offset: u64, buffer: &[u8]) -> Result<usize, BlockDeviceError> {
            let mut sectors = self.sectors.lock();
            let sector = sectors.get_mut(block_offset as usize).ok_or(BlockDeviceError::InvalidOffset)?;
            sector.copy_from_slice(&buffer[..512]);
            Ok(1)
        }
        fn flush(&self) -> Result<(), BlockDeviceError> {
            Ok(())
        }
    }

    fn geometry_for(num_fats_sectors: usize) -> (Geometry, MemDisk) {
        let geometry = Geometry {
            partition_start_lba: 0,
            total_sectors: 10_000,
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            num_fats: 2,
            sectors_per_fat: num_fats_sectors as u32,
            fat1_lba: 1,
            fat2_lba: 1 + num_fats_sectors as u64,
            first_data_sector: 1 + 2 * num_fats_sectors as u64,
            bytes_per_cluster: 512,
            root_cluster: 2,
            fsinfo_lba: 0,
            backup_boot_sector_lba: 0,
            total_clusters: 1000,
        };
        let disk = MemDisk {
            sectors: Mutex::new(vec![[0u8; 512]; 1 + 2 * num_fats_sectors + 16]),
        };
        (geometry, disk)
    }

    #[test]
    fn write_mirrors_to_both_fats_preserving_top_bits() {
        let (geometry, disk) = geometry_for(4);
        let device: Arc<dyn BlockDevice> = Arc::new(disk);

        // Seed the top 4 bits at cluster 5's word so the preserve check is meaningful.
        let (sector_index, offset) = sector_and_offset(&geometry, 5);
        let mut seed = [0u8; 512];
        device.read_blocks(geometry.fat1_lba + sector_index, &mut seed).unwrap();
        seed[offset + 3] = 0xA0;
        device.write_blocks(geometry.fat1_lba + sector_index, &seed).unwrap();

        write_fat_entry(device.as_ref(), &geometry, 5, 0x0FFF_FFFF).unwrap();

        let read_back = read_fat_entry(device.as_ref(), &geometry, 5).unwrap();
        assert_eq!(read_back, 0x0FFF_FFFF);

        let mut fat1_sector = [0u8; 512];
        device.read_blocks(geometry.fat1_lba + sector_index, &mut fat1_sector).unwrap();
        let mut fat2_sector = [0u8; 512];
        device.read_blocks(geometry.fat2_lba + sector_index, &mut fat2_sector).unwrap();
        assert_eq!(fat1_sector, fat2_sector);
        assert_eq!(fat1_sector[offset + 3] & 0xF0, 0xA0);
    }

    #[test]
    fn rejects_cluster_below_two() {
        let (geometry, disk) = geometry_for(4);
        let device: Arc<dyn BlockDevice> = Arc::new(disk);
        assert_eq!(
            read_fat_entry(device.as_ref(), &geometry, 0),
            Err(FsError::InvalidArgument)
        );
    }
}
