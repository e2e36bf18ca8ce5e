//! Batch runner for both output stages
//!
//! A file that fails to read or parse is skipped and reported; the rest of
//! the batch carries on.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::config::DocConfig;
use crate::discover::discover;
use crate::error::{DocError, Result};
use crate::parse_tree::file_to_element;
use crate::store::{DocumentSet, EntityKey};

/// An input path and the output group its documents are filed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub group: PathBuf,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            group: group.into(),
        }
    }
}

/// Parses `PATH=GROUP`
impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((path, group)) if !path.is_empty() && !group.is_empty() => {
                Ok(Source::new(path, group))
            }
            _ => Err(format!("expected PATH=GROUP, got `{}`", s)),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files parsed successfully
    pub processed: usize,
    /// Inputs that could not be read or parsed
    pub skipped: Vec<(PathBuf, DocError)>,
    /// Documents written
    pub written: usize,
    /// Entities rejected because another kind already held their key
    pub rejected: Vec<DocError>,
    /// Documents that could not be combined or written
    pub failed: Vec<(EntityKey, DocError)>,
}

impl BatchReport {
    /// Nothing was skipped, rejected or failed
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.rejected.is_empty() && self.failed.is_empty()
    }
}

fn read_and_parse(path: &Path) -> Result<midl::File> {
    let text = fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
    Ok(midl::parse(&text)?)
}

/// Stage-1 document path: next to the input, or inside `out_dir`
fn parse_tree_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    match (out_dir, input.file_name()) {
        (Some(dir), Some(name)) => dir.join(format!("{}.xml", name.to_string_lossy())),
        _ => PathBuf::from(format!("{}.xml", input.display())),
    }
}

fn write_parse_tree(input: &Path, out_dir: Option<&Path>) -> Result<PathBuf> {
    let file = read_and_parse(input)?;
    let xml = file_to_element(&file).to_xml()?;

    let output = parse_tree_path(input, out_dir);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DocError::io(parent, e))?;
    }
    fs::write(&output, xml).map_err(|e| DocError::io(&output, e))?;
    Ok(output)
}

/// Stage 1: write each input's syntax tree as `{file}.xml`
pub fn parse_files(paths: &[PathBuf], out_dir: Option<&Path>, extension: &str) -> BatchReport {
    let mut report = BatchReport::default();

    for path in paths {
        let files = match discover(path, extension) {
            Ok(files) => files,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping input");
                report.skipped.push((path.clone(), err));
                continue;
            }
        };

        for file in files {
            match write_parse_tree(&file, out_dir) {
                Ok(output) => {
                    debug!(input = %file.display(), output = %output.display(), "wrote parse tree");
                    report.processed += 1;
                    report.written += 1;
                }
                Err(err) => {
                    warn!(path = %file.display(), %err, "skipping file");
                    report.skipped.push((file, err));
                }
            }
        }
    }

    info!(
        processed = report.processed,
        skipped = report.skipped.len(),
        "parse stage finished"
    );
    report
}

/// Stage 2: parse every source, accumulate entities and persist them once
pub fn document_sources(sources: &[Source], config: &DocConfig) -> BatchReport {
    let mut report = BatchReport::default();
    let mut set = DocumentSet::new(config.clone());

    for source in sources {
        let files = match discover(&source.path, &config.extension) {
            Ok(files) => files,
            Err(err) => {
                warn!(path = %source.path.display(), %err, "skipping source");
                report.skipped.push((source.path.clone(), err));
                continue;
            }
        };

        for file in files {
            match read_and_parse(&file) {
                Ok(ast) => {
                    debug!(path = %file.display(), group = %source.group.display(), "parsed");
                    report.processed += 1;
                    report.rejected.extend(set.add_file(&source.group, &ast));
                }
                Err(err) => {
                    warn!(path = %file.display(), %err, "skipping file");
                    report.skipped.push((file, err));
                }
            }
        }
    }

    let persisted = set.persist();
    report.written = persisted.written.len();
    report.failed = persisted.failed;

    info!(
        processed = report.processed,
        skipped = report.skipped.len(),
        written = report.written,
        "document stage finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            "idl/cwcom=CWCom/Interfaces".parse::<Source>().unwrap(),
            Source::new("idl/cwcom", "CWCom/Interfaces")
        );
        assert!("no-group".parse::<Source>().is_err());
        assert!("path=".parse::<Source>().is_err());
    }

    #[test]
    fn test_parse_tree_path() {
        assert_eq!(
            parse_tree_path(Path::new("src/lib.idl"), None),
            PathBuf::from("src/lib.idl.xml")
        );
        assert_eq!(
            parse_tree_path(Path::new("src/lib.idl"), Some(Path::new("trees"))),
            PathBuf::from("trees/lib.idl.xml")
        );
    }

    #[test]
    fn test_parse_files_skips_bad_input_and_continues() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.idl"), "interface IA { void Go(); }").unwrap();
        fs::write(dir.path().join("bad.idl"), "interface { }").unwrap();
        let out = dir.path().join("trees");

        let report = parse_files(&[dir.path().to_path_buf()], Some(&out), "idl");
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("bad.idl"));
        assert!(matches!(report.skipped[0].1, DocError::Midl(_)));
        assert!(out.join("good.idl.xml").is_file());
        assert!(!report.is_clean());
    }
}
