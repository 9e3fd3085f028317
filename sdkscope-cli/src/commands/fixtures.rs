//! On-disk SDK tables for command tests.

use std::{
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::app::GlobalOptions;

pub const PUBLIC: u16 = 0x0001;
pub const STATIC: u16 = 0x0008;

/// (access flags, name, descriptor)
pub type MethodSpec = (u16, &'static str, &'static str);

pub const VIEW: &[MethodSpec] = &[
    (PUBLIC, "<init>", "(Landroid/content/Context;)V"),
    (PUBLIC, "draw", "(II)V"),
    (PUBLIC | STATIC, "inflate", "(Landroid/content/Context;I)Landroid/view/View;"),
];

pub fn json() -> GlobalOptions {
    GlobalOptions {
        json: true,
        verbose: false,
    }
}

/// Minimal class file with `java/lang/Object` as super class.
fn class_bytes(internal_name: &str, methods: &[MethodSpec]) -> Vec<u8> {
    let mut pool = Vec::new();
    let mut count = 0_u16;
    let mut utf8 = |pool: &mut Vec<u8>, value: &str| {
        pool.push(1);
        pool.extend_from_slice(&(value.len() as u16).to_be_bytes());
        pool.extend_from_slice(value.as_bytes());
        count += 1;
        count
    };

    let name = utf8(&mut pool, internal_name);
    let object = utf8(&mut pool, "java/lang/Object");
    let members: Vec<(u16, u16, u16)> = methods
        .iter()
        .map(|(flags, name, descriptor)| {
            (*flags, utf8(&mut pool, name), utf8(&mut pool, descriptor))
        })
        .collect();
    // Class constants for this and super follow the strings
    pool.push(7);
    pool.extend_from_slice(&name.to_be_bytes());
    pool.push(7);
    pool.extend_from_slice(&object.to_be_bytes());
    let this_class = count + 1;
    let super_class = count + 2;

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 52]);
    out.extend_from_slice(&(count + 3).to_be_bytes());
    out.extend_from_slice(&pool);
    out.extend_from_slice(&0x0021_u16.to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&(members.len() as u16).to_be_bytes());
    for (flags, name, descriptor) in members {
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&descriptor.to_be_bytes());
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Writes `android-all-N.jar` for every version that has `View` methods, plus
/// `sdks.properties` naming every version. Versions given `None` get no jar at all.
pub fn write_sdks(dir: &Path, versions: &[(u32, Option<&[MethodSpec]>)]) -> PathBuf {
    let mut properties = String::new();
    for (version, methods) in versions {
        let jar = format!("android-all-{version}.jar");
        if let Some(methods) = methods {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file("android/view/View.class", options).unwrap();
            writer
                .write_all(&class_bytes("android/view/View", methods))
                .unwrap();
            fs::write(dir.join(&jar), writer.finish().unwrap().into_inner()).unwrap();
        }
        properties.push_str(&format!("{version}={jar}\n"));
    }

    let path = dir.join("sdks.properties");
    fs::write(&path, properties).unwrap();
    path
}
