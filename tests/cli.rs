use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_astgen<I, S>(cwd: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_astgen"))
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap_or_else(|err| panic!("failed to execute astgen binary: {err}"))
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn finished_line(input: &Path, output: &Path) -> String {
    format!(
        "compile {} to {} is finished.\n",
        input.display(),
        output.display()
    )
}

#[test]
fn convert_prints_one_line_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scripts");
    let output = dir.path().join("fixtures");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("b.py"), "import torch\n").unwrap();
    fs::write(input.join("a.py"), "x = 1\n").unwrap();

    let result = run_astgen(
        dir.path(),
        [
            OsStr::new("convert"),
            OsStr::new("--input"),
            input.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
        ],
    );

    assert_eq!(result.status.code(), Some(0), "stderr:\n{}", stderr_of(&result));
    let expected = finished_line(&input.join("a.py"), &output.join("a.ast"))
        + &finished_line(&input.join("b.py"), &output.join("b.ast"));
    assert_eq!(stdout_of(&result), expected);
    assert_eq!(
        fs::read_to_string(output.join("a.ast")).unwrap(),
        "Module(body=[Assign(targets=[Name(id='x', ctx=Store())], value=Constant(value=1))], \
         type_ignores=[])"
    );
}

#[test]
fn convert_stops_at_first_failure_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.src"), "x = 1\n").unwrap();
    fs::write(input.join("b.src"), "x = = 1\n").unwrap();

    let result = run_astgen(
        dir.path(),
        [
            OsStr::new("convert"),
            OsStr::new("--input"),
            input.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
            OsStr::new("--source-suffix"),
            OsStr::new(".src"),
        ],
    );

    assert_eq!(result.status.code(), Some(1));
    assert_eq!(
        stdout_of(&result),
        finished_line(&input.join("a.src"), &output.join("a.ast"))
    );
    assert!(stderr_of(&result).contains("expected expression"), "{}", stderr_of(&result));
    assert!(output.join("a.ast").exists());
    assert!(!output.join("b.ast").exists());
}

#[test]
fn convert_reports_missing_input_dir() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_astgen(
        dir.path(),
        [
            OsStr::new("convert"),
            OsStr::new("--input"),
            dir.path().join("missing").as_os_str(),
            OsStr::new("--output"),
            dir.path().join("out").as_os_str(),
        ],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(stdout_of(&result).is_empty());
    assert!(stderr_of(&result).starts_with("error: "), "{}", stderr_of(&result));
}

#[test]
fn dump_handles_deeply_nested_input() {
    let dir = tempfile::tempdir().unwrap();
    let brackets = dir.path().join("brackets.py");
    fs::write(
        &brackets,
        format!("x = {}1{}\n", "(".repeat(200), ")".repeat(200)),
    )
    .unwrap();
    let result = run_astgen(dir.path(), [OsStr::new("dump"), brackets.as_os_str()]);
    assert_eq!(result.status.code(), Some(0), "stderr:\n{}", stderr_of(&result));
    assert_eq!(
        stdout_of(&result),
        "Module(body=[Assign(targets=[Name(id='x', ctx=Store())], value=Constant(value=1))], \
         type_ignores=[])\n"
    );

    for (name, source) in [
        ("power.py", format!("x = {}2\n", "2 ** ".repeat(20_000))),
        ("attrs.py", format!("x{}\n", ".b".repeat(200_000))),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        let result = run_astgen(dir.path(), [OsStr::new("dump"), path.as_os_str()]);
        assert_eq!(result.status.code(), Some(1), "{}", name);
        assert!(
            stderr_of(&result).contains("nesting depth exceeded"),
            "{}: {}",
            name,
            stderr_of(&result)
        );
    }
}
