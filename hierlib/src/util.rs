use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

/// The directory holding sample configs, traces, and expected outputs
pub fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../testdata")
}

pub struct TestCasePaths {
    pub config: PathBuf,
    pub trace: PathBuf,
    pub output: PathBuf,
}

/// Discovers sample cases from the testdata directory
///
/// Every `output-<trace>-<config>.json` file names one case: the trace is
/// `<trace>.trace`, the configuration `<config>.json`, and the file itself
/// holds the expected report
pub fn get_cases() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let dir = testdata_dir();
    let output_pattern = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut names = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&name) {
            names.push(name);
        }
    }
    names.sort();
    let mut out = Vec::new();
    for name in names {
        let tokens = output_pattern
            .captures(&name)
            .ok_or_else(|| "Couldn't parse the file name".to_string())?;
        let trace = tokens
            .name("trace")
            .ok_or_else(|| "Couldn't get the trace file from the output file name".to_string())?
            .as_str();
        let config = tokens
            .name("config")
            .ok_or_else(|| "Couldn't get the config file from the output file name".to_string())?
            .as_str();
        out.push(TestCasePaths {
            config: dir.join(format!("{config}.json")),
            trace: dir.join(format!("{trace}.trace")),
            output: dir.join(&name),
        });
    }
    Ok(out)
}
