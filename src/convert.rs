//! Batch conversion of a source directory into a directory of tree dumps.
//!
//! Every entry of the input directory is read, parsed, dumped and written
//! under a suffix-substituted name. The first failure stops the batch.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::diagnostic::Diagnostic;
use crate::dump::{render, DumpFormat};
use crate::frontend::SourceParser;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot create output directory '{}': {source}", path.display())]
    CreateOutputDir { path: PathBuf, source: io::Error },

    #[error("cannot read input directory '{}': {source}", path.display())]
    ReadInputDir { path: PathBuf, source: io::Error },

    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse '{}': {}", path.display(), first_message(diagnostics))]
    Parse {
        path: PathBuf,
        source_text: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .first()
        .map(|d| d.message.as_str())
        .unwrap_or("syntax error")
}

/// Files converted by one run, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertReport {
    pub converted: Vec<(PathBuf, PathBuf)>,
}

/// Convert every entry of `config.input_dir` into `config.output_dir`.
pub fn convert_dir<P: SourceParser>(
    config: &ConvertConfig,
    parser: &P,
) -> Result<ConvertReport, ConvertError> {
    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        parser = parser.name(),
        "converting directory"
    );

    ensure_output_dir(&config.output_dir)?;
    let names = list_inputs(&config.input_dir)?;

    let mut report = ConvertReport::default();
    for name in names {
        let input = config.input_dir.join(&name);
        let output = config.output_dir.join(output_os_name(
            &name,
            &config.source_suffix,
            &config.target_suffix,
        ));
        convert_file(parser, config.format, &input, &output)?;
        println!(
            "compile {} to {} is finished.",
            input.display(),
            output.display()
        );
        report.converted.push((input, output));
    }

    info!(files = report.converted.len(), "conversion finished");
    Ok(report)
}

/// Create `dir` and any missing parents. An existing directory is fine.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ConvertError> {
    fs::create_dir_all(dir).map_err(|source| ConvertError::CreateOutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Every entry name in `dir`, sorted. Nothing is filtered out.
pub fn list_inputs(dir: &Path) -> Result<Vec<OsString>, ConvertError> {
    let read_dir_error = |source| ConvertError::ReadInputDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = fs::read_dir(dir)
        .map_err(read_dir_error)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir_error)?;
    names.sort();
    debug!(dir = %dir.display(), count = names.len(), "listed inputs");
    Ok(names)
}

/// Replace a trailing `source_suffix` with `target_suffix`; any other name
/// is returned unchanged.
pub fn output_name(file_name: &str, source_suffix: &str, target_suffix: &str) -> String {
    match file_name.strip_suffix(source_suffix) {
        Some(stem) if !source_suffix.is_empty() => format!("{}{}", stem, target_suffix),
        _ => file_name.to_string(),
    }
}

/// Names that are not valid UTF-8 cannot carry a textual suffix and pass
/// through untouched.
fn output_os_name(file_name: &OsStr, source_suffix: &str, target_suffix: &str) -> OsString {
    match file_name.to_str() {
        Some(name) => output_name(name, source_suffix, target_suffix).into(),
        None => file_name.to_os_string(),
    }
}

/// Read and parse one file.
pub fn parse_file<P: SourceParser>(parser: &P, input: &Path) -> Result<P::Tree, ConvertError> {
    let source = fs::read_to_string(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(path = %input.display(), bytes = source.len(), "read source");

    parser
        .parse(&source, &input.to_string_lossy())
        .map_err(|diagnostics| ConvertError::Parse {
            path: input.to_path_buf(),
            source_text: source,
            diagnostics,
        })
}

/// Parse `input` and write its dump to `output`. Nothing is written when
/// reading or parsing fails.
pub fn convert_file<P: SourceParser>(
    parser: &P,
    format: DumpFormat,
    input: &Path,
    output: &Path,
) -> Result<(), ConvertError> {
    let tree = parse_file(parser, input)?;
    let write_error = |source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    };
    let text = render(&tree, format).map_err(|e| write_error(io::Error::from(e)))?;
    fs::write(output, text).map_err(write_error)?;
    debug!(path = %output.display(), %format, "wrote dump");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::PythonParser;

    fn config_for(root: &Path, source_suffix: &str) -> ConvertConfig {
        ConvertConfig {
            input_dir: root.join("in"),
            output_dir: root.join("out"),
            source_suffix: source_suffix.to_string(),
            target_suffix: ".ast".to_string(),
            format: DumpFormat::Text,
        }
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("a.py", ".py", ".ast"), "a.ast");
        assert_eq!(output_name("model.py", ".py", ".ast"), "model.ast");
        assert_eq!(output_name("notes.txt", ".py", ".ast"), "notes.txt");
        assert_eq!(output_name(".py", ".py", ".ast"), ".ast");
        assert_eq!(output_name("a.py.bak", ".py", ".ast"), "a.py.bak");
        assert_eq!(output_name("x.py.py", ".py", ".ast"), "x.py.ast");
        assert_eq!(output_name("a.py", "", ".ast"), "a.py");
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_list_inputs_is_sorted_and_unfiltered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.py", "a.py", "README"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names = list_inputs(dir.path()).unwrap();
        assert_eq!(names, vec!["README", "a.py", "b.py"]);
    }

    #[test]
    fn test_list_inputs_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_inputs(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ConvertError::ReadInputDir { .. }));
    }

    #[test]
    fn test_convert_dir_writes_one_output_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".py");
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("a.py"), "x = 1\n").unwrap();
        fs::write(config.input_dir.join("notes.txt"), "pass\n").unwrap();

        let report = convert_dir(&config, &PythonParser).unwrap();
        assert_eq!(
            report.converted,
            vec![
                (config.input_dir.join("a.py"), config.output_dir.join("a.ast")),
                (
                    config.input_dir.join("notes.txt"),
                    config.output_dir.join("notes.txt")
                ),
            ]
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a.ast")).unwrap(),
            "Module(body=[Assign(targets=[Name(id='x', ctx=Store())], value=Constant(value=1))], type_ignores=[])"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("notes.txt")).unwrap(),
            "Module(body=[Pass()], type_ignores=[])"
        );
    }

    #[test]
    fn test_convert_dir_rerun_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".py");
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("m.py"), "def f(x):\n    return x\n").unwrap();

        convert_dir(&config, &PythonParser).unwrap();
        let first = fs::read(config.output_dir.join("m.ast")).unwrap();
        convert_dir(&config, &PythonParser).unwrap();
        let second = fs::read(config.output_dir.join("m.ast")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_convert_dir_empty_input_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".py");
        fs::create_dir(&config.input_dir).unwrap();

        let report = convert_dir(&config, &PythonParser).unwrap();
        assert!(report.converted.is_empty());
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_convert_dir_stops_at_first_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".src");
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("a.src"), "ok = True\n").unwrap();
        fs::write(config.input_dir.join("b.src"), "def (\n").unwrap();
        fs::write(config.input_dir.join("c.src"), "ok = False\n").unwrap();

        let err = convert_dir(&config, &PythonParser).unwrap_err();
        match &err {
            ConvertError::Parse {
                path,
                source_text,
                diagnostics,
            } => {
                assert_eq!(path, &config.input_dir.join("b.src"));
                assert_eq!(source_text, "def (\n");
                assert!(!diagnostics.is_empty());
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("cannot parse"));
        assert!(config.output_dir.join("a.ast").is_file());
        assert!(!config.output_dir.join("b.ast").exists());
        assert!(!config.output_dir.join("c.ast").exists());
    }

    #[test]
    fn test_convert_dir_directory_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".py");
        fs::create_dir_all(config.input_dir.join("sub.py")).unwrap();

        let err = convert_dir(&config, &PythonParser).unwrap_err();
        assert!(matches!(err, ConvertError::Read { .. }), "{}", err);
    }

    #[test]
    fn test_convert_dir_rejects_non_utf8_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), ".py");
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("bin.py"), [0xff, 0xfe, 0x00]).unwrap();

        let err = convert_dir(&config, &PythonParser).unwrap_err();
        assert!(matches!(err, ConvertError::Read { .. }));
        assert!(!config.output_dir.join("bin.ast").exists());
    }

    #[test]
    fn test_convert_dir_json_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path(), ".py");
        config.target_suffix = ".json".to_string();
        config.format = DumpFormat::Json;
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("a.py"), "pass\n").unwrap();

        convert_dir(&config, &PythonParser).unwrap();
        let json = fs::read_to_string(config.output_dir.join("a.json")).unwrap();
        assert_eq!(json, r#"{"body":["Pass"]}"#);
    }
}
