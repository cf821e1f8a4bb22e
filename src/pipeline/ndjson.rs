//! Line-delimited JSON events on stdin.
//!
//! ```text
//! {"type":"changed","files":["src/contentA/index.ts"]}
//! {"type":"done","units":[{"id":"contentA","hash":"9f2c","files":["src/contentA/index.ts"]}]}
//! ```
//!
//! A `done` line may also carry `changed` files and, per unit, `outputs`
//! to hash when `hash` is absent. Malformed lines are logged and skipped.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{BuildReport, PipelineError, PipelineEvent, make_unit, resolve_all};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Line {
    Changed {
        files: Vec<PathBuf>,
    },
    Done {
        #[serde(default)]
        changed: Vec<PathBuf>,
        #[serde(default)]
        units: Vec<RawUnit>,
    },
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    id: String,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    outputs: Vec<PathBuf>,
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line: &str, root: &Path) -> Result<Option<PipelineEvent>, PipelineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let event = match serde_json::from_str::<Line>(line)? {
        Line::Changed { files } => PipelineEvent::FilesChanged(resolve_all(files, root)),
        Line::Done { changed, units } => {
            let units = units
                .into_iter()
                .map(|u| {
                    let outputs = resolve_all(u.outputs, root);
                    make_unit(u.id, u.hash, u.files, &outputs, root)
                })
                .collect();
            PipelineEvent::BuildCompleted(BuildReport {
                changed_files: resolve_all(changed, root),
                units,
            })
        }
    };
    Ok(Some(event))
}

/// Read events until EOF or until `emit` returns `false`.
pub fn read_events<R: BufRead>(reader: R, root: &Path, mut emit: impl FnMut(PipelineEvent) -> bool) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                crate::log!("pipeline"; "stdin read failed: {}", e);
                return;
            }
        };

        match parse_line(&line, root) {
            Ok(Some(event)) => {
                if !emit(event) {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => crate::log!("pipeline"; "skipping line: {}", e),
        }
    }
    crate::debug!("pipeline"; "stdin closed");
}
