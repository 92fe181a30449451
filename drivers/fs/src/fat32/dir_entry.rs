//! Short/Long directory entry parsing and the LFN/SFN name matcher.

use alloc::vec::Vec;

bitflags::bitflags! {
    /// The directory entry attribute byte. `LONG_NAME` is the standard
    /// FAT convention of setting all four of read-only/hidden/system/
    /// volume-id at once to mark a long-name continuation entry.
    pub struct FatAttributes: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN    = 0x02;
        const SYSTEM    = 0x04;
        const VOLUME_ID = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE   = 0x20;
        const LONG_NAME = 0x01 | 0x02 | 0x04 | 0x08;
    }
}

pub const ATTR_DIRECTORY: u8 = FatAttributes::DIRECTORY.bits();
pub const ATTR_LONG_NAME: u8 = FatAttributes::LONG_NAME.bits();
pub const ATTR_ARCHIVE: u8 = FatAttributes::ARCHIVE.bits();

pub const NT_LOWERCASE_BASE: u8 = 0x08;
pub const NT_LOWERCASE_EXT: u8 = 0x10;

pub const DIR_ENTRY_SIZE: usize = 32;

pub const NAME_FREE: u8 = 0x00;
pub const NAME_LITERAL_E5: u8 = 0x05;
pub const NAME_DELETED: u8 = 0xE5;

pub const LAST_LONG_ENTRY: u8 = 0x40;

/// A parsed short (8.3) directory entry.
#[derive(Debug, Clone, Copy)]
pub struct RawSfn {
    pub name: [u8; 11],
    pub attr: u8,
    pub nt_res: u8,
    pub crt_time: u16,
    pub crt_date: u16,
    pub wrt_time: u16,
    pub wrt_date: u16,
    pub fst_clus_hi: u16,
    pub fst_clus_lo: u16,
    pub file_size: u32,
}

pub fn parse_sfn(raw: &[u8]) -> RawSfn {
    let mut name = [0u8; 11];
    name.copy_from_slice(&raw[0..11]);
    RawSfn {
        name,
        attr: raw[11],
        nt_res: raw[12],
        crt_time: u16::from_le_bytes([raw[14], raw[15]]),
        crt_date: u16::from_le_bytes([raw[16], raw[17]]),
        wrt_time: u16::from_le_bytes([raw[22], raw[23]]),
        wrt_date: u16::from_le_bytes([raw[24], raw[25]]),
        fst_clus_hi: u16::from_le_bytes([raw[20], raw[21]]),
        fst_clus_lo: u16::from_le_bytes([raw[26], raw[27]]),
        file_size: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
    }
}

/// A parsed long-name fragment.
#[derive(Debug, Clone, Copy)]
pub struct RawLfn {
    pub ord: u8,
    pub name1: [u16; 5],
    pub name2: [u16; 6],
    pub name3: [u16; 2],
}

pub fn parse_lfn(raw: &[u8]) -> RawLfn {
    let mut name1 = [0u16; 5];
    for i in 0..5 {
        name1[i] = u16::from_le_bytes([raw[1 + i * 2], raw[2 + i * 2]]);
    }
    let mut name2 = [0u16; 6];
    for i in 0..6 {
        name2[i] = u16::from_le_bytes([raw[14 + i * 2], raw[15 + i * 2]]);
    }
    let mut name3 = [0u16; 2];
    for i in 0..2 {
        name3[i] = u16::from_le_bytes([raw[28 + i * 2], raw[29 + i * 2]]);
    }
    RawLfn {
        ord: raw[0],
        name1,
        name2,
        name3,
    }
}

impl RawLfn {
    /// The 13 UCS-2 code units this fragment carries, in order.
    pub fn units(&self) -> [u16; 13] {
        let mut out = [0u16; 13];
        out[0..5].copy_from_slice(&self.name1);
        out[5..11].copy_from_slice(&self.name2);
        out[11..13].copy_from_slice(&self.name3);
        out
    }
}

/// Match a target name against an LFN chain, `fragments` ordered from the
/// entry nearest the SFN (chunk #1) outward.
pub fn matches_lfn_chain(fragments: &[RawLfn], target: &[u16]) -> bool {
    let mut j = 0usize;
    for fragment in fragments {
        for unit in fragment.units() {
            if j >= target.len() {
                if unit == 0xFFFF || unit == 0x0000 {
                    continue;
                }
                return false;
            }
            if unit != target[j] {
                return false;
            }
            j += 1;
        }
    }
    j >= target.len()
}

/// Match a target name against the packed 11-byte SFN, honoring the NT
/// lowercase-compatibility bits. Faithfully reproduces the source's
/// per-byte state machine, including its quirks: non-alphanumeric base
/// bytes advance the match index unconditionally, and an extensionless
/// match outside a directory entry has no end-of-target padding case.
pub fn matches_sfn(sfn: &RawSfn, target: &[u8]) -> bool {
    let is_dir = sfn.attr & ATTR_DIRECTORY != 0;
    let lower_base = sfn.nt_res & NT_LOWERCASE_BASE != 0;
    let lower_ext = sfn.nt_res & NT_LOWERCASE_EXT != 0;
    let tlen = target.len();
    let mut j = 0usize;

    for &raw in &sfn.name[0..8] {
        match raw {
            b' ' => {
                if is_dir {
                    if j < tlen && target[j] == b' ' {
                        j += 1;
                    } else if j == tlen {
                        // trailing padding, nothing left to consume
                    } else {
                        return false;
                    }
                } else if j < tlen && target[j] == b'.' {
                    // padding ahead of the extension separator, consumed later
                } else if j < tlen && target[j] == b' ' {
                    j += 1;
                } else {
                    return false;
                }
            }
            b'A'..=b'Z' | b'a'..=b'z' => {
                let expected = if lower_base { raw + 32 } else { raw };
                if j < tlen && target[j] == expected {
                    j += 1;
                } else {
                    return false;
                }
            }
            b'0'..=b'9' => {
                if j < tlen && target[j] == raw {
                    j += 1;
                } else {
                    return false;
                }
            }
            _ => j += 1,
        }
    }

    if !is_dir {
        j += 1; // consume the '.' separator, per source behavior
        for &raw in &sfn.name[8..11] {
            match raw {
                b'0'..=b'9' | b' ' => {
                    if j < tlen && target[j] == raw {
                        j += 1;
                    } else {
                        return false;
                    }
                }
                b'A'..=b'Z' | b'a'..=b'z' => {
                    let expected = if lower_ext { raw + 32 } else { raw };
                    if j < tlen && target[j] == expected {
                        j += 1;
                    } else {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    j == tlen
}

/// Collect the LFN fragments immediately preceding directory entry index
/// `i` within `buf`, nearest-first, stopping at the first non-LFN or
/// deleted entry. Does not cross a cluster boundary.
pub fn collect_preceding_lfns(buf: &[u8], i: usize) -> Vec<RawLfn> {
    let mut fragments = Vec::new();
    let mut k = i;
    while k > 0 {
        let offset = (k - 1) * DIR_ENTRY_SIZE;
        let raw = &buf[offset..offset + DIR_ENTRY_SIZE];
        if raw[11] != ATTR_LONG_NAME || raw[0] == NAME_DELETED {
            break;
        }
        fragments.push(parse_lfn(raw));
        k -= 1;
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sfn_bytes(name: &[u8; 11], attr: u8, nt_res: u8, clus: u32, size: u32) -> [u8; 32] {
        let mut raw = [0u8; 32];
        raw[0..11].copy_from_slice(name);
        raw[11] = attr;
        raw[12] = nt_res;
        raw[20..22].copy_from_slice(&((clus >> 16) as u16).to_le_bytes());
        raw[26..28].copy_from_slice(&((clus & 0xFFFF) as u16).to_le_bytes());
        raw[28..32].copy_from_slice(&size.to_le_bytes());
        raw
    }

    #[test]
    fn lowercase_flags_match_readme_txt() {
        let raw = sfn_bytes(b"README  TXT", ATTR_ARCHIVE, NT_LOWERCASE_BASE | NT_LOWERCASE_EXT, 10, 42);
        let sfn = parse_sfn(&raw);
        assert!(matches_sfn(&sfn, b"readme.txt"));
        assert_eq!(sfn.file_size, 42);
        assert_eq!(((sfn.fst_clus_hi as u32) << 16) | sfn.fst_clus_lo as u32, 10);
    }

    #[test]
    fn directory_entry_matches_without_extension() {
        let raw = sfn_bytes(b"DIR        ", ATTR_DIRECTORY, 0, 0, 0);
        let sfn = parse_sfn(&raw);
        assert!(matches_sfn(&sfn, b"DIR"));
    }

    #[test]
    fn mismatched_name_fails() {
        let raw = sfn_bytes(b"README  TXT", ATTR_ARCHIVE, NT_LOWERCASE_BASE | NT_LOWERCASE_EXT, 10, 42);
        let sfn = parse_sfn(&raw);
        assert!(!matches_sfn(&sfn, b"readme.md"));
    }

    #[test]
    fn lfn_chain_matches_exact_prefix_with_terminator_padding() {
        // "hi" followed by terminator 0x0000 and 0xFFFF padding across 13 units.
        let units: [u16; 13] = [
            b'h' as u16, b'i' as u16, 0x0000, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF,
            0xFFFF, 0xFFFF, 0xFFFF,
        ];
        let fragment = RawLfn {
            ord: 0x41,
            name1: [units[0], units[1], units[2], units[3], units[4]],
            name2: [units[5], units[6], units[7], units[8], units[9], units[10]],
            name3: [units[11], units[12]],
        };
        let target: vec::Vec<u16> = "hi".encode_utf16().collect();
        assert!(matches_lfn_chain(&[fragment], &target));
    }

    fn lfn_bytes(ord: u8, units: &[u16; 13]) -> [u8; 32] {
        let mut raw = [0u8; 32];
        raw[0] = ord;
        raw[11] = ATTR_LONG_NAME;
        for i in 0..5 {
            raw[1 + i * 2..3 + i * 2].copy_from_slice(&units[i].to_le_bytes());
        }
        for i in 0..6 {
            raw[14 + i * 2..16 + i * 2].copy_from_slice(&units[5 + i].to_le_bytes());
        }
        for i in 0..2 {
            raw[28 + i * 2..30 + i * 2].copy_from_slice(&units[11 + i].to_le_bytes());
        }
        raw
    }

    #[test]
    fn collect_preceding_lfns_stops_at_a_deleted_fragment() {
        // A deleted LFN fragment sits two slots before the SFN; the real
        // "hi" fragment sits one slot before it. The deleted fragment must
        // not be picked up as part of the chain.
        let units: [u16; 13] = [
            b'h' as u16, b'i' as u16, 0x0000, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF,
            0xFFFF, 0xFFFF, 0xFFFF,
        ];
        let mut deleted = lfn_bytes(0x41, &units);
        deleted[0] = NAME_DELETED;

        let mut buf = [0u8; 96];
        buf[0..32].copy_from_slice(&deleted);
        buf[32..64].copy_from_slice(&lfn_bytes(0x41, &units));
        buf[64..96].copy_from_slice(&sfn_bytes(b"HI      TXT", ATTR_ARCHIVE, 0, 10, 0));

        let fragments = collect_preceding_lfns(&buf, 2);
        assert_eq!(fragments.len(), 1);
        let target: vec::Vec<u16> = "hi".encode_utf16().collect();
        assert!(matches_lfn_chain(&fragments, &target));
    }
}
