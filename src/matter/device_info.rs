//! Default device information for Matter stack.
//!
//! Replaces rs-matter's test defaults. Per-server-node identity (serial
//! number, unique ID, vendor/product) is rebuilt from [`crate::topology`]
//! and the pairing-file override (§4.8); this constant only supplies the
//! fallback used when nothing else overrides it.

use rs_matter::dm::clusters::basic_info::BasicInfoConfig;

pub const DEV_INFO: BasicInfoConfig<'static> = BasicInfoConfig {
    vid: 0xFFF1,
    pid: 0x8001,
    hw_ver: 1,
    hw_ver_str: "1",
    sw_ver: 1,
    sw_ver_str: "1.0",
    serial_no: "MBS-001",
    device_name: "Matterbridge",
    product_name: "Matterbridge",
    vendor_name: "matterbridge-rs",
    ..BasicInfoConfig::new()
};
