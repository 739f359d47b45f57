#![no_main]

use libfuzzer_sys::fuzz_target;
use psem_tables::codec::measure;
use psem_tables::{NiFormat, TableReader, TimeFormat};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(ni) = NiFormat::from_code(selector & 0x0F) else {
        return;
    };
    let Ok(time) = TimeFormat::from_code((selector >> 4) % 5) else {
        return;
    };

    // Primitive reads never panic and never move past the buffer.
    let mut r = TableReader::new(rest);
    let mut stalled = 0;
    for step in 0usize.. {
        if r.remaining() == 0 || stalled >= 4 {
            break;
        }
        let before = r.position();
        let result = match step % 4 {
            0 => r.ni(ni).map(drop),
            1 => r.stime(time).map(drop),
            2 => r.ltime(time).map(drop),
            _ => {
                let len = usize::from(selector % 9) + 1;
                match r.optional_section_if(step % 8 != 3, len) {
                    Ok(true) => r.skip(len),
                    Ok(false) => Ok(()),
                    Err(err) => Err(err),
                }
            }
        };
        if result.is_err() {
            break;
        }
        assert!(r.position() <= rest.len());
        stalled = if r.position() == before { stalled + 1 } else { 0 };
    }

    let measured = measure(|r| r.ni(ni).map(drop)).unwrap();
    assert_eq!(measured.len, ni.width());
});
