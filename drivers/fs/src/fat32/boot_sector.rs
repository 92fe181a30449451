//! Boot sector (BPB) and FSInfo parsing.
//!
//! Derives the immutable per-mount geometry from the 512-byte boot sector
//! and the informational FSInfo sector. Neither signature check mirrors
//! Microsoft's full boot-sector validation; they catch gross corruption
//! (wrong partition type, zeroed BPB) without chasing every legacy BPB
//! variant.

use crate::FsError;

/// Geometry derived once at mount and never mutated afterward.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub partition_start_lba: u64,
    pub total_sectors: u64,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub num_fats: u8,
    pub sectors_per_fat: u32,
    pub fat1_lba: u64,
    pub fat2_lba: u64,
    pub first_data_sector: u64,
    pub bytes_per_cluster: u32,
    pub root_cluster: u32,
    pub fsinfo_lba: u64,
    pub backup_boot_sector_lba: u64,
    /// Total addressable data clusters, cluster numbers start at 2.
    pub total_clusters: u64,
}

impl Geometry {
    pub fn cluster_to_lba(&self, cluster: u32) -> u64 {
        self.first_data_sector + (cluster as u64 - 2) * self.sectors_per_cluster as u64
    }

    pub fn is_valid_cluster(&self, cluster: u32) -> bool {
        cluster >= 2 && (cluster as u64) < self.total_clusters + 2
    }
}

/// Informational free-cluster hints. Never required for lookup or chain
/// correctness.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsInfo {
    pub free_cluster_count: u32,
    pub next_free_cluster: u32,
}

pub fn parse_boot_sector(
    buf: &[u8],
    partition_start_lba: u64,
    total_sectors_hint: u64,
) -> Result<Geometry, FsError> {
    if buf.len() < 512 {
        return Err(FsError::InvalidBootSector);
    }
    if buf[510] != 0x55 || buf[511] != 0xAA {
        return Err(FsError::InvalidBootSector);
    }

    let bytes_per_sector = u16::from_le_bytes([buf[11], buf[12]]);
    let sectors_per_cluster = buf[13];
    let reserved_sector_count = u16::from_le_bytes([buf[14], buf[15]]);
    let num_fats = buf[16];
    let tot_sec32 = u32::from_le_bytes([buf[32], buf[33], buf[34], buf[35]]);
    let fat_sz32 = u32::from_le_bytes([buf[36], buf[37], buf[38], buf[39]]);
    let root_clus = u32::from_le_bytes([buf[44], buf[45], buf[46], buf[47]]);
    let fsinfo_sector = u16::from_le_bytes([buf[48], buf[49]]);
    let bk_boot_sec = u16::from_le_bytes([buf[50], buf[51]]);

    if bytes_per_sector == 0
        || !bytes_per_sector.is_power_of_two()
        || sectors_per_cluster == 0
        || !sectors_per_cluster.is_power_of_two()
        || num_fats == 0
        || fat_sz32 == 0
    {
        return Err(FsError::InvalidBootSector);
    }

    let fat1_lba = partition_start_lba + reserved_sector_count as u64;
    let fat2_lba = fat1_lba + fat_sz32 as u64;
    let first_data_sector =
        partition_start_lba + reserved_sector_count as u64 + (num_fats as u64) * (fat_sz32 as u64);
    let bytes_per_cluster = bytes_per_sector as u32 * sectors_per_cluster as u32;
    let total_sectors = if tot_sec32 != 0 {
        tot_sec32 as u64
    } else {
        total_sectors_hint
    };
    let data_sectors = total_sectors.saturating_sub(first_data_sector - partition_start_lba);
    let total_clusters = data_sectors / sectors_per_cluster as u64;

    Ok(Geometry {
        partition_start_lba,
        total_sectors,
        bytes_per_sector,
        sectors_per_cluster,
        num_fats,
        sectors_per_fat: fat_sz32,
        fat1_lba,
        fat2_lba,
        first_data_sector,
        bytes_per_cluster,
        root_cluster: root_clus,
        fsinfo_lba: partition_start_lba + fsinfo_sector as u64,
        backup_boot_sector_lba: partition_start_lba + bk_boot_sec as u64,
        total_clusters,
    })
}

/// Parse an FSInfo sector. A signature mismatch yields the "unknown"
/// sentinel hints (`0xFFFFFFFF`) rather than an error, matching its
/// advisory-only role.
pub fn parse_fsinfo(buf: &[u8]) -> FsInfo {
    if buf.len() < 512 {
        return FsInfo {
            free_cluster_count: 0xFFFF_FFFF,
            next_free_cluster: 0xFFFF_FFFF,
        };
    }
    let lead_sig = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let struct_sig = u32::from_le_bytes([buf[484], buf[485], buf[486], buf[487]]);
    if lead_sig != 0x4161_5252 || struct_sig != 0x6141_7272 {
        return FsInfo {
            free_cluster_count: 0xFFFF_FFFF,
            next_free_cluster: 0xFFFF_FFFF,
        };
    }
    FsInfo {
        free_cluster_count: u32::from_le_bytes([buf[488], buf[489], buf[490], buf[491]]),
        next_free_cluster: u32::from_le_bytes([buf[492], buf[493], buf[494], buf[495]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn boot_sector_bytes(
        bytes_per_sector: u16,
        sectors_per_cluster: u8,
        reserved: u16,
        num_fats: u8,
        fat_sz32: u32,
        root_clus: u32,
        tot_sec32: u32,
    ) -> vec::Vec<u8> {
        let mut buf = vec![0u8; 512];
        buf[11..13].copy_from_slice(&bytes_per_sector.to_le_bytes());
        buf[13] = sectors_per_cluster;
        buf[14..16].copy_from_slice(&reserved.to_le_bytes());
        buf[16] = num_fats;
        buf[32..36].copy_from_slice(&tot_sec32.to_le_bytes());
        buf[36..40].copy_from_slice(&fat_sz32.to_le_bytes());
        buf[44..48].copy_from_slice(&root_clus.to_le_bytes());
        buf[510] = 0x55;
        buf[511] = 0xAA;
        buf
    }

    #[test]
    fn mount_geometry_scenario() {
        let buf = boot_sector_bytes(512, 8, 32, 2, 1000, 2, 0);
        let geometry = parse_boot_sector(&buf, 2048, 2_048_000).unwrap();
        assert_eq!(geometry.fat1_lba, 2080);
        assert_eq!(geometry.fat2_lba, 3080);
        assert_eq!(geometry.first_data_sector, 4080);
        assert_eq!(geometry.bytes_per_cluster, 4096);
    }

    #[test]
    fn rejects_missing_boot_signature() {
        let mut buf = boot_sector_bytes(512, 8, 32, 2, 1000, 2, 0);
        buf[510] = 0;
        assert_eq!(parse_boot_sector(&buf, 2048, 0), Err(FsError::InvalidBootSector));
    }

    #[test]
    fn rejects_zero_fat_size() {
        let buf = boot_sector_bytes(512, 8, 32, 2, 0, 2, 0);
        assert_eq!(parse_boot_sector(&buf, 2048, 0), Err(FsError::InvalidBootSector));
    }

    #[test]
    fn fsinfo_signature_mismatch_yields_unknown_hints() {
        let buf = vec![0u8; 512];
        let fsinfo = parse_fsinfo(&buf);
        assert_eq!(fsinfo.free_cluster_count, 0xFFFF_FFFF);
    }
}
