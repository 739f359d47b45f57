#![no_main]

use libfuzzer_sys::fuzz_target;
use psem_tables::tables::standard::{ActualRegisters, GeneralConfig};
use psem_tables::tables::CATALOG;
use psem_tables::{CaptureFile, MockTransport, TableDefinition, TableSession};

fuzz_target!(|data: &[u8]| {
    // First bytes shape the prerequisite tables, the rest is every table's body.
    if data.len() < 29 {
        return;
    }
    let (header, body) = data.split_at(29);

    let mock = MockTransport::new();
    mock.set_table(GeneralConfig::KEY, header[..19].to_vec());
    let mut registers = header[19..].to_vec();
    for count in &mut registers[2..] {
        *count &= 0x07;
    }
    mock.set_table(ActualRegisters::KEY, registers);
    for key in CATALOG.keys().filter(|key| key.id > 21) {
        mock.set_table(*key, body.to_vec());
    }
    let session = TableSession::new(mock);

    for entry in CATALOG.values() {
        let _ = entry.decode(&session);
    }

    // Whatever decoded must decode again identically from a capture.
    let replay = CaptureFile::capture(&session).into_session();
    for key in session.loaded_tables() {
        if let Some(entry) = CATALOG.get(&key) {
            let live = entry.decode(&session).map(|t| t.debug);
            let captured = entry.decode(&replay).map(|t| t.debug);
            if let (Ok(live), Ok(captured)) = (live, captured) {
                assert_eq!(live, captured);
            }
        }
    }
});
