//! Pairing-file loader (§4.8).
//!
//! `{certDir}/pairing.json` is an optional out-of-band override of a server
//! node's identity and device-certification bundle. A missing file is not an
//! error; a present-but-unreadable or malformed one is.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
struct RawPairingFile {
    #[serde(rename = "vendorId")]
    vendor_id: Option<u16>,
    #[serde(rename = "vendorName")]
    vendor_name: Option<String>,
    #[serde(rename = "productId")]
    product_id: Option<u16>,
    #[serde(rename = "productName")]
    product_name: Option<String>,
    #[serde(rename = "deviceType")]
    device_type: Option<u32>,
    #[serde(rename = "serialNumber")]
    serial_number: Option<String>,
    #[serde(rename = "uniqueId")]
    unique_id: Option<String>,
    passcode: Option<u32>,
    discriminator: Option<u16>,
    #[serde(rename = "privateKey")]
    private_key: Option<String>,
    certificate: Option<String>,
    #[serde(rename = "intermediateCertificate")]
    intermediate_certificate: Option<String>,
    declaration: Option<String>,
}

/// Device-certification bundle, present only when all four hex blobs were
/// supplied (§4.8: "if all four are present").
#[derive(Debug, Clone)]
pub struct DeviceCertification {
    pub private_key: Vec<u8>,
    pub certificate: Vec<u8>,
    pub intermediate_certificate: Vec<u8>,
    pub declaration: Vec<u8>,
}

/// Validated identity/certification override.
#[derive(Debug, Clone, Default)]
pub struct PairingOverride {
    pub vendor_id: Option<u16>,
    pub vendor_name: Option<String>,
    pub product_id: Option<u16>,
    pub product_name: Option<String>,
    pub device_type: Option<u32>,
    pub serial_number: Option<String>,
    pub unique_id: Option<String>,
    /// Only set together — §4.8: "only apply passcode+discriminator
    /// together".
    pub passcode_and_discriminator: Option<(u32, u16)>,
    pub certification: Option<DeviceCertification>,
}

/// Load and validate `{cert_dir}/pairing.json`. Returns `Ok(None)` when the
/// file does not exist (not an error).
pub fn load(cert_dir: &Path) -> Result<Option<PairingOverride>, ConfigError> {
    let path = cert_dir.join("pairing.json");
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::PairingFileUnreadable(path.clone(), e))?;
    let raw: RawPairingFile =
        serde_json::from_str(&contents).map_err(|e| ConfigError::PairingFileMalformed(path.clone(), e))?;

    validate(raw).map(Some)
}

fn validate(raw: RawPairingFile) -> Result<PairingOverride, ConfigError> {
    let mut out = PairingOverride::default();

    if let Some(name) = raw.vendor_name {
        if name.is_empty() || name.len() > 32 {
            return Err(ConfigError::PairingFieldInvalid(
                "vendorName",
                "must be 1-32 chars".to_string(),
            ));
        }
        out.vendor_name = Some(name);
    }
    out.vendor_id = raw.vendor_id;

    if let Some(name) = raw.product_name {
        if name.is_empty() || name.len() > 32 {
            return Err(ConfigError::PairingFieldInvalid(
                "productName",
                "must be 1-32 chars".to_string(),
            ));
        }
        out.product_name = Some(name);
    }
    out.product_id = raw.product_id;
    out.device_type = raw.device_type;

    if let Some(serial) = raw.serial_number {
        if serial.is_empty() || serial.len() > 32 {
            return Err(ConfigError::PairingFieldInvalid(
                "serialNumber",
                "must be 1-32 chars".to_string(),
            ));
        }
        out.serial_number = Some(serial);
    }
    out.unique_id = raw.unique_id;

    // Only apply passcode+discriminator together (§4.8).
    match (raw.passcode, raw.discriminator) {
        (Some(passcode), Some(discriminator)) => {
            if !(1..=99_999_998).contains(&passcode) || passcode == 0 {
                return Err(ConfigError::PairingFieldInvalid(
                    "passcode",
                    "must be a 6-8 digit Matter-valid passcode".to_string(),
                ));
            }
            if discriminator >= 4096 {
                return Err(ConfigError::PairingFieldInvalid(
                    "discriminator",
                    "must be < 4096 (12-bit)".to_string(),
                ));
            }
            out.passcode_and_discriminator = Some((passcode, discriminator));
        }
        (None, None) => {}
        _ => {
            // Exactly one of the pair given: silently ignored per the
            // "only apply together" rule, neither field is adopted.
        }
    }

    let blobs = (
        raw.private_key,
        raw.certificate,
        raw.intermediate_certificate,
        raw.declaration,
    );
    if let (Some(key), Some(cert), Some(intermediate), Some(declaration)) = blobs {
        out.certification = Some(DeviceCertification {
            private_key: hex_decode("privateKey", &key)?,
            certificate: hex_decode("certificate", &cert)?,
            intermediate_certificate: hex_decode("intermediateCertificate", &intermediate)?,
            declaration: hex_decode("declaration", &declaration)?,
        });
    }

    Ok(out)
}

fn hex_decode(field: &'static str, value: &str) -> Result<Vec<u8>, ConfigError> {
    if value.len() % 2 != 0 {
        return Err(ConfigError::PairingFieldInvalid(field, "odd-length hex string".to_string()));
    }
    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|e| ConfigError::PairingFieldInvalid(field, e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = std::env::temp_dir().join("matterbridge-supervisor-pairing-test-missing");
        let result = load(&dir).expect("missing file is Ok(None)");
        assert!(result.is_none());
    }

    #[test]
    fn passcode_without_discriminator_is_ignored() {
        let raw = RawPairingFile {
            passcode: Some(20202021),
            ..Default::default()
        };
        let parsed = validate(raw).expect("valid");
        assert!(parsed.passcode_and_discriminator.is_none());
    }

    #[test]
    fn passcode_and_discriminator_together_are_applied() {
        let raw = RawPairingFile {
            passcode: Some(20202021),
            discriminator: Some(3840),
            ..Default::default()
        };
        let parsed = validate(raw).expect("valid");
        assert_eq!(parsed.passcode_and_discriminator, Some((20202021, 3840)));
    }

    #[test]
    fn discriminator_out_of_range_is_rejected() {
        let raw = RawPairingFile {
            passcode: Some(20202021),
            discriminator: Some(5000),
            ..Default::default()
        };
        assert!(validate(raw).is_err());
    }

    #[test]
    fn certification_requires_all_four_blobs() {
        let raw = RawPairingFile {
            private_key: Some("ab".to_string()),
            certificate: Some("cd".to_string()),
            ..Default::default()
        };
        let parsed = validate(raw).expect("valid");
        assert!(parsed.certification.is_none());
    }

    #[test]
    fn certification_hex_decodes_when_complete() {
        let raw = RawPairingFile {
            private_key: Some("ab".to_string()),
            certificate: Some("cd".to_string()),
            intermediate_certificate: Some("ef".to_string()),
            declaration: Some("01".to_string()),
            ..Default::default()
        };
        let parsed = validate(raw).expect("valid");
        let cert = parsed.certification.expect("present");
        assert_eq!(cert.private_key, vec![0xab]);
        assert_eq!(cert.declaration, vec![0x01]);
    }
}
