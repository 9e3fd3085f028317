use std::path::Path;

use sdkscope::SdkRange;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_registry,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct VersionRow {
    version: u32,
    path: String,
    exists: bool,
}

fn collect(sdks: &Path, min: Option<u32>, max: Option<u32>) -> anyhow::Result<Vec<VersionRow>> {
    let registry = load_registry(sdks)?;
    Ok(registry
        .matching_versions(SdkRange::new(min, max))
        .into_iter()
        .map(|archive| VersionRow {
            version: archive.version(),
            path: archive.path().display().to_string(),
            exists: archive.path().is_file(),
        })
        .collect())
}

pub fn run(
    sdks: &Path,
    min: Option<u32>,
    max: Option<u32>,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let rows = collect(sdks, min, max)?;

    print_output(&rows, opts, |rows| {
        let mut table = TabWriter::new(&[
            ("SDK", Align::Right),
            ("ARCHIVE", Align::Left),
            ("", Align::Left),
        ]);
        for row in rows {
            let missing = if row.exists { "" } else { "(missing)" };
            table.row(vec![row.version.to_string(), row.path.clone(), missing.to_string()]);
        }
        table.print();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{json, write_sdks, VIEW};

    #[test]
    fn range_and_missing_archives() {
        let dir = tempfile::tempdir().unwrap();
        let sdks = write_sdks(
            dir.path(),
            &[(16, Some(VIEW)), (19, None), (21, Some(VIEW)), (28, Some(VIEW))],
        );

        let rows = collect(&sdks, Some(17), Some(21)).unwrap();
        let summary: Vec<(u32, bool)> = rows.iter().map(|r| (r.version, r.exists)).collect();
        assert_eq!(summary, vec![(19, false), (21, true)]);
        assert!(rows[1].path.ends_with("android-all-21.jar"));

        assert_eq!(collect(&sdks, None, None).unwrap().len(), 4);
        assert!(collect(&sdks, Some(30), None).unwrap().is_empty());
        run(&sdks, None, Some(19), &json()).unwrap();
    }

    #[test]
    fn unreadable_table() {
        let dir = tempfile::tempdir().unwrap();
        let error = collect(&dir.path().join("sdks.properties"), None, None).unwrap_err();
        assert!(error.to_string().contains("failed to load SDK table"));

        let bad = dir.path().join("bad.properties");
        std::fs::write(&bad, "lollipop=android-all-21.jar\n").unwrap();
        let error = collect(&bad, None, None).unwrap_err();
        assert!(format!("{error:#}").contains("lollipop"));
    }
}
