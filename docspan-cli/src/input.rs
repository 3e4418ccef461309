//! Reading documents, statement lists and diffs from disk
//!
//! Statement and diff files are JSON unless their extension is `.yaml` or `.yml`. A
//! statement file is either a bare list or an object with a `statements` list.

use crate::error::CliError;
use docspan_core::align::{DocumentContent, Fragment, ScanDiff};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum StatementFile {
    List(Vec<Fragment>),
    Wrapped { statements: Vec<Fragment> },
}

pub fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a document, as markup when `markup` is set or the extension says HTML.
pub fn load_document(path: &Path, markup: bool) -> Result<DocumentContent, CliError> {
    let text = read_text(path)?;
    let is_html = markup
        || path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    Ok(if is_html {
        DocumentContent::Markup(text)
    } else {
        DocumentContent::Flat(text)
    })
}

pub fn load_statements(path: &Path) -> Result<Vec<Fragment>, CliError> {
    Ok(match parse::<StatementFile>(path)? {
        StatementFile::List(statements) | StatementFile::Wrapped { statements } => statements,
    })
}

pub fn load_diff(path: &Path) -> Result<ScanDiff, CliError> {
    parse(path)
}

fn parse<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = read_text(path)?;
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"));
    let parsed = if yaml {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| CliError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
