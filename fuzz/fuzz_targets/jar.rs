#![no_main]

use libfuzzer_sys::fuzz_target;
use sdkscope::archive::jar::JarFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(jar) = JarFile::from_mem(data.to_vec()) {
        for name in jar.names().unwrap_or_default() {
            let _ = jar.read(&name);
        }
    }
});
