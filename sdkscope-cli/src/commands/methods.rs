use std::path::Path;

use anyhow::{bail, Context};
use sdkscope::classfile::{MethodAccessFlags, MethodEntry};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_registry,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct MethodRow {
    access: String,
    is_static: bool,
    return_type: String,
    name: String,
    params: Vec<String>,
    descriptor: String,
}

#[derive(Debug, Serialize)]
struct MethodsOutput {
    sdk: u32,
    class: String,
    super_class: Option<String>,
    methods: Vec<MethodRow>,
    count: usize,
}

fn access_string(flags: MethodAccessFlags) -> String {
    let mut words = Vec::new();
    if flags.contains(MethodAccessFlags::PUBLIC) {
        words.push("public");
    } else if flags.contains(MethodAccessFlags::PROTECTED) {
        words.push("protected");
    } else if flags.contains(MethodAccessFlags::PRIVATE) {
        words.push("private");
    }
    for (flag, word) in [
        (MethodAccessFlags::STATIC, "static"),
        (MethodAccessFlags::FINAL, "final"),
        (MethodAccessFlags::ABSTRACT, "abstract"),
        (MethodAccessFlags::NATIVE, "native"),
        (MethodAccessFlags::SYNTHETIC, "synthetic"),
    ] {
        if flags.contains(flag) {
            words.push(word);
        }
    }
    words.join(" ")
}

impl From<&MethodEntry> for MethodRow {
    fn from(method: &MethodEntry) -> Self {
        MethodRow {
            access: access_string(method.access_flags),
            is_static: method.is_static(),
            return_type: method.return_type.class_name(),
            name: method.name.clone(),
            params: method.param_type_names(),
            descriptor: method.descriptor.clone(),
        }
    }
}

fn collect(sdks: &Path, sdk: u32, class: &str) -> anyhow::Result<MethodsOutput> {
    let registry = load_registry(sdks)?;
    let Some(archive) = registry.get(sdk) else {
        let known: Vec<String> = registry.versions().map(|v| v.to_string()).collect();
        bail!("SDK {sdk} is not configured (known: {})", known.join(", "));
    };

    let class_file = archive
        .class_file(class)
        .with_context(|| format!("failed to read SDK {sdk}"))?;
    let Some(class_file) = class_file else {
        bail!("No such class {class} in SDK level {sdk}");
    };

    let methods: Vec<MethodRow> = class_file.methods.iter().map(MethodRow::from).collect();
    Ok(MethodsOutput {
        sdk,
        class: class_file.name.clone(),
        super_class: class_file.super_name.clone(),
        count: methods.len(),
        methods,
    })
}

pub fn run(sdks: &Path, sdk: u32, class: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let output = collect(sdks, sdk, class)?;

    print_output(&output, opts, |o| {
        match &o.super_class {
            Some(parent) => println!("{} extends {} (SDK {})", o.class, parent, o.sdk),
            None => println!("{} (SDK {})", o.class, o.sdk),
        }
        let mut table = TabWriter::new(&[
            ("ACCESS", Align::Left),
            ("RETURNS", Align::Left),
            ("METHOD", Align::Left),
        ])
        .indent("  ");
        for m in &o.methods {
            table.row(vec![
                m.access.clone(),
                m.return_type.clone(),
                format!("{}({})", m.name, m.params.join(", ")),
            ]);
        }
        table.print();
        println!("\n{} methods", o.count);
    })
}
