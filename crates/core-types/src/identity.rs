use crate::transport::DeviceInfo;

/// Map a (vendor, product) pair to a USB-serial chip family name.
///
/// Exact-match table for the common CH34x / FTDI / CP210x bridge chips.
/// A pair that is present but not in the table resolves to `"Unknown"`.
pub fn chip_name(vid: u16, pid: u16) -> &'static str {
    match (vid, pid) {
        (0x1a86, 0x55d3) => "CH343",
        (0x1a86, 0x7584) => "CH340S",
        (0x1a86, 0x7522 | 0x7523) => "CH340",
        (0x1a86, 0x5512 | 0x5523 | 0x5584) => "CH341",
        (0x0403, 0x0402 | 0x0403 | 0x0404 | 0x0405 | 0x6001 | 0x0602 | 0x6010) => "FT232",
        (0x10c4, 0x9500 | 0x0102 | 0x0501 | 0x80a9 | 0xea60 | 0xea61 | 0xea63) => "CP210x",
        _ => "Unknown",
    }
}

/// Resolve a possibly-absent device to a chip name.
///
/// No selected device resolves to `None`, which is distinct from a selected
/// device with unrecognized (or unreported) identification codes.
pub fn resolve(info: Option<&DeviceInfo>) -> Option<&'static str> {
    let info = info?;
    match (info.vid, info.pid) {
        (Some(vid), Some(pid)) => Some(chip_name(vid, pid)),
        _ => Some("Unknown"),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chips() {
        assert_eq!(chip_name(0x1a86, 0x55d3), "CH343");
        assert_eq!(chip_name(0x1a86, 0x7523), "CH340");
        assert_eq!(chip_name(0x0403, 0x6001), "FT232");
        assert_eq!(chip_name(0x10c4, 0xea60), "CP210x");
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(chip_name(0xdead, 0xbeef), "Unknown");
        // Right product, wrong vendor
        assert_eq!(chip_name(0x0403, 0xea60), "Unknown");
    }

    #[test]
    fn test_resolve_none_vs_unknown() {
        assert_eq!(resolve(None), None);

        let present = DeviceInfo::new(0x1234, 0x5678);
        assert_eq!(resolve(Some(&present)), Some("Unknown"));

        let unreported = DeviceInfo::default();
        assert_eq!(resolve(Some(&unreported)), Some("Unknown"));

        let known = DeviceInfo::new(0x1a86, 0x55d3);
        assert_eq!(resolve(Some(&known)), Some("CH343"));
    }
}
