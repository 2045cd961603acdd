#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate targa;

fuzz_target!(|data: &[u8]| {
    let mut cursor = std::io::Cursor::new(data);
    // The verdict itself is unchecked; the cursor must come back to the
    // start either way.
    let _ = targa::classify(&mut cursor);
    assert_eq!(cursor.position(), 0);
});
