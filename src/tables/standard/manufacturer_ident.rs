//! ST1 Manufacturer Identification Table.

use crate::codec::TableReader;
use crate::constants::ST_MANUFACTURER_IDENT;
use crate::error::{DecodeError, DecodeResult, TableResult};
use crate::table::{FirmwareVersion, TableDefinition, TableKey, TableSession};
use crate::tables::standard::general_config::GeneralConfig;
use serde::Serialize;

/// Serial number bytes: 16 characters, or 8 bytes of BCD when ST0 sets ID_FORM.
const SERIAL_CHARS: usize = 16;
const SERIAL_BCD: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManufacturerIdent {
    pub manufacturer: String,
    pub ed_model: String,
    pub hw_version_number: u8,
    pub hw_revision_number: u8,
    pub fw_version_number: u8,
    pub fw_revision_number: u8,
    pub mfg_serial_number: String,
}

impl ManufacturerIdent {
    /// Firmware version and revision; ST1 carries no build number.
    pub fn firmware(&self) -> FirmwareVersion {
        FirmwareVersion::new(self.fw_version_number, self.fw_revision_number, 0)
    }
}

fn bcd_serial(bytes: &[u8]) -> DecodeResult<String> {
    let mut serial = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        for nibble in [byte >> 4, byte & 0x0F] {
            let digit = char::from_digit(u32::from(nibble), 10)
                .ok_or_else(|| DecodeError::invalid("MFG_SERIAL_NUMBER", format!("nibble 0x{nibble:X}")))?;
            serial.push(digit);
        }
    }
    Ok(serial)
}

impl TableDefinition for ManufacturerIdent {
    /// ID_FORM: serial number stored as BCD.
    type Deps = bool;
    const KEY: TableKey = TableKey::standard(ST_MANUFACTURER_IDENT);
    const NAME: &'static str = "Manufacturer Identification";

    fn dependencies(session: &TableSession) -> TableResult<bool> {
        Ok(session.table::<GeneralConfig>()?.id_form_bcd())
    }

    fn decode(r: &mut TableReader<'_>, bcd_serial_number: &bool) -> DecodeResult<Self> {
        let manufacturer = r.trimmed_chars(4)?;
        let ed_model = r.trimmed_chars(8)?;
        let hw_version_number = r.u8()?;
        let hw_revision_number = r.u8()?;
        let fw_version_number = r.u8()?;
        let fw_revision_number = r.u8()?;
        let mfg_serial_number = if *bcd_serial_number {
            let bytes = r.bytes(SERIAL_BCD)?;
            bcd_serial(&bytes)?
        } else {
            r.trimmed_chars(SERIAL_CHARS)?.trim_start().to_string()
        };
        Ok(Self {
            manufacturer,
            ed_model,
            hw_version_number,
            hw_revision_number,
            fw_version_number,
            fw_revision_number,
            mfg_serial_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SizePolicy;

    #[test]
    fn test_size_follows_id_form() {
        assert_eq!(ManufacturerIdent::size(&false).unwrap(), SizePolicy::Fixed(32));
        assert_eq!(ManufacturerIdent::size(&true).unwrap(), SizePolicy::Fixed(24));
    }

    #[test]
    fn test_decode_char_serial() {
        let mut bytes = b"ITRNCENTRON ".to_vec();
        bytes.extend_from_slice(&[2, 1, 5, 5]);
        bytes.extend_from_slice(b"    000012345678");
        let st1 = ManufacturerIdent::from_bytes(&bytes, &false).unwrap();
        assert_eq!(st1.manufacturer, "ITRN");
        assert_eq!(st1.ed_model, "CENTRON");
        assert_eq!(st1.mfg_serial_number, "000012345678");
        assert_eq!(st1.firmware(), FirmwareVersion::new(5, 5, 0));
    }

    #[test]
    fn test_decode_bcd_serial() {
        let mut bytes = b"ITRNCENTRON ".to_vec();
        bytes.extend_from_slice(&[2, 1, 5, 5]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x12, 0x34, 0x56, 0x78, 0x90, 0x12]);
        let st1 = ManufacturerIdent::from_bytes(&bytes, &true).unwrap();
        assert_eq!(st1.mfg_serial_number, "0000123456789012");

        bytes[16] = 0xAB;
        assert!(ManufacturerIdent::from_bytes(&bytes, &true).is_err());
    }
}
