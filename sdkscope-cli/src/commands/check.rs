use std::path::Path;

use anyhow::{bail, Context};
use sdkscope::{DeclaredMethod, Diagnostic, SdkRange, Validator};
use serde::{Deserialize, Serialize};

use crate::{
    app::GlobalOptions,
    commands::common::load_registry,
    output::{print_output, Align, TabWriter},
};

/// Top level of a declaration manifest.
#[derive(Debug, Deserialize)]
struct Manifest {
    methods: Vec<ManifestMethod>,
}

/// One declared method. Bounds of `-1` or absent mean unbounded.
#[derive(Debug, Deserialize)]
struct ManifestMethod {
    class: String,
    name: String,
    #[serde(default)]
    params: Vec<String>,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default = "void")]
    returns: String,
    #[serde(default = "unset")]
    min_sdk: i32,
    #[serde(default = "unset")]
    max_sdk: i32,
    #[serde(default = "unset")]
    class_min_sdk: i32,
    #[serde(default = "unset")]
    class_max_sdk: i32,
}

fn void() -> String {
    "void".to_string()
}

fn unset() -> i32 {
    -1
}

impl From<ManifestMethod> for DeclaredMethod {
    fn from(entry: ManifestMethod) -> Self {
        DeclaredMethod::new(entry.class, entry.name)
            .with_params(entry.params)
            .with_static(entry.is_static)
            .returning(entry.returns)
            .with_sdk_range(SdkRange::from_sentinels(entry.min_sdk, entry.max_sdk))
            .with_class_sdk_range(SdkRange::from_sentinels(
                entry.class_min_sdk,
                entry.class_max_sdk,
            ))
    }
}

#[derive(Debug, Serialize)]
struct DiagnosticEntry {
    kind: &'static str,
    severity: String,
    version: u32,
    class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    message: String,
}

impl From<&Diagnostic> for DiagnosticEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        DiagnosticEntry {
            kind: diagnostic.kind(),
            severity: diagnostic.severity().to_string(),
            version: diagnostic.version(),
            class: diagnostic.class_name().to_string(),
            method: diagnostic.method_name().map(str::to_string),
            message: diagnostic.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckResult {
    manifest: String,
    methods: usize,
    passed: usize,
    diagnostics: Vec<DiagnosticEntry>,
}

fn parse_manifest(text: &str) -> anyhow::Result<Vec<DeclaredMethod>> {
    let manifest: Manifest = serde_json::from_str(text)?;
    Ok(manifest.methods.into_iter().map(DeclaredMethod::from).collect())
}

fn evaluate(sdks: &Path, manifest: &Path) -> anyhow::Result<CheckResult> {
    let registry = load_registry(sdks)?;
    let text = std::fs::read_to_string(manifest)
        .with_context(|| format!("failed to read manifest: {}", manifest.display()))?;
    let methods = parse_manifest(&text)
        .with_context(|| format!("invalid manifest: {}", manifest.display()))?;

    let results = Validator::new(&registry)
        .validate_all(&methods)
        .context("validation aborted")?;

    Ok(CheckResult {
        manifest: manifest.display().to_string(),
        methods: methods.len(),
        passed: results.iter().filter(|found| found.is_empty()).count(),
        diagnostics: results.iter().flatten().map(DiagnosticEntry::from).collect(),
    })
}

pub fn run(sdks: &Path, manifest: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let result = evaluate(sdks, manifest)?;

    print_output(&result, opts, |r| {
        let status = if r.diagnostics.is_empty() { "PASS" } else { "FAIL" };
        println!(
            "{status}  {manifest}  ({passed}/{total} methods clean)",
            manifest = r.manifest,
            passed = r.passed,
            total = r.methods
        );

        let mut table = TabWriter::new(&[
            ("SDK", Align::Right),
            ("KIND", Align::Left),
            ("MESSAGE", Align::Left),
        ])
        .indent("  ");
        for d in &r.diagnostics {
            table.row(vec![d.version.to_string(), d.kind.to_string(), d.message.clone()]);
        }
        if !table.is_empty() {
            table.print();
        }
    })?;

    if !result.diagnostics.is_empty() {
        bail!(
            "{} problem(s) in {} of {} method(s)",
            result.diagnostics.len(),
            result.methods - result.passed,
            result.methods
        );
    }
    Ok(())
}
