#![no_main]

use libfuzzer_sys::fuzz_target;
use sdkscope::{classfile::parse_class, ClassSignatureTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(class) = parse_class(data) {
        let _ = ClassSignatureTable::from_class(&class);
    }
});
