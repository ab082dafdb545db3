//! Integration tests for the luaform pipeline.
//!
//! These tests run the full producer/worker/writer pipeline against real
//! temporary directories:
//! - end-to-end generation for direct and deferred returns
//! - worker-count invariance of the produced output set
//! - override-merge resolution through required modules
//! - dry-run and failure behavior

use luaform::config::GeneratorConfig;
use luaform::format::{Format, Formatter};
use luaform::fs::{FileProcessor, LocalFileProcessor};
use luaform::pipeline::{self, output_dir, output_stem};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a script into `dir` and returns its path.
fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write script");
    path
}

/// Runs the pipeline over `files` and returns the output root.
fn run_pipeline(files: Vec<PathBuf>, config: GeneratorConfig) -> Result<(), pipeline::PipelineError> {
    let processor = LocalFileProcessor::new();
    let formatter = Formatter::new(config.parsed_format(), config.suffix.as_deref());
    pipeline::run(files, &processor, &formatter, &config)
}

/// The output path the pipeline will use for `source` under `root`.
fn expected_output(root: &Path, source: &Path, suffix: &str) -> PathBuf {
    output_dir(root, source).join(format!("{}.{}", output_stem(source), suffix))
}

/// Two scripts, one returning a table directly and one through a thunk,
/// serialized as JSON.
#[test]
fn end_to_end_json_generation() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let direct = write_script(scripts.path(), "direct.lua", "return { a = 1 }");
    let deferred = write_script(
        scripts.path(),
        "deferred.lua",
        "return function() return { b = 2 } end",
    );

    let config = GeneratorConfig::new()
        .with_format("json")
        .with_output_root(out.path());
    run_pipeline(vec![direct.clone(), deferred.clone()], config).unwrap();

    let direct_out = expected_output(out.path(), &direct, "json");
    let deferred_out = expected_output(out.path(), &deferred, "json");
    assert_eq!(fs::read_to_string(direct_out).unwrap(), r#"{"a":1}"#);
    assert_eq!(fs::read_to_string(deferred_out).unwrap(), r#"{"b":2}"#);
}

/// YAML is the default format and the canonical suffix is used.
#[test]
fn end_to_end_yaml_generation() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(
        scripts.path(),
        "site.lua",
        "return { name = 'web', replicas = 3 }",
    );

    let config = GeneratorConfig::new().with_output_root(out.path());
    run_pipeline(vec![script.clone()], config).unwrap();

    let written = fs::read_to_string(expected_output(out.path(), &script, "yaml")).unwrap();
    assert_eq!(written, "name: web\nreplicas: 3\n");
}

/// A configured suffix overrides the formatter's canonical one.
#[test]
fn suffix_override_changes_output_names() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(scripts.path(), "site.lua", "return { a = 1 }");

    let config = GeneratorConfig::new()
        .with_suffix("yml")
        .with_output_root(out.path());
    run_pipeline(vec![script.clone()], config).unwrap();

    assert!(expected_output(out.path(), &script, "yml").is_file());
}

/// Worker counts 1, 2, and 8 produce the same set of output files with
/// byte-identical content.
#[test]
fn output_is_invariant_over_worker_count() {
    let scripts = TempDir::new().unwrap();
    let mut files = Vec::new();
    for i in 0..6 {
        files.push(write_script(
            scripts.path(),
            &format!("job{}.lua", i),
            &format!(
                "return {{ index = {}, nested = {{ doubled = {} }}, tags = {{ 'x', 'y' }} }}",
                i,
                i * 2
            ),
        ));
    }

    let mut snapshots: Vec<BTreeMap<PathBuf, Vec<u8>>> = Vec::new();
    for workers in [1, 2, 8] {
        let out = TempDir::new().unwrap();
        let config = GeneratorConfig::new()
            .with_format("json")
            .with_workers(workers)
            .with_output_root(out.path());
        run_pipeline(files.clone(), config).unwrap();

        let mut snapshot = BTreeMap::new();
        for file in &files {
            let path = expected_output(out.path(), file, "json");
            let relative = path.strip_prefix(out.path()).unwrap().to_path_buf();
            snapshot.insert(relative, fs::read(&path).unwrap());
        }
        snapshots.push(snapshot);
    }

    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[1], snapshots[2]);
}

/// Dry-run mode performs no writes; the output root stays untouched.
#[test]
fn dry_run_writes_nothing() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(scripts.path(), "site.lua", "return { a = 1 }");

    let config = GeneratorConfig::new()
        .with_dry_run(true)
        .with_output_root(out.path());
    run_pipeline(vec![script], config).unwrap();

    let entries: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert!(entries.is_empty(), "dry run must not create output files");
}

/// Override modules merge over their base module during require.
#[test]
fn override_suffix_merges_required_modules() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    fs::write(
        scripts.path().join("site.lua"),
        "return { a = 1, nested = { x = 1, y = 2 } }",
    )
    .unwrap();
    fs::write(
        scripts.path().join("site-prod.lua"),
        "return { nested = { y = 9, z = 3 } }",
    )
    .unwrap();
    let entry = write_script(scripts.path(), "entry.lua", "return require('site')");

    let config = GeneratorConfig::new()
        .with_format("json")
        .with_override_suffix("prod")
        .with_output_root(out.path());
    run_pipeline(vec![entry.clone()], config).unwrap();

    let written = fs::read_to_string(expected_output(out.path(), &entry, "json")).unwrap();
    assert_eq!(written, r#"{"a":1,"nested":{"x":1,"y":9,"z":3}}"#);
}

/// Relative module references abort the run when override resolution is
/// active.
#[test]
fn relative_import_aborts_the_run() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(scripts.path(), "bad.lua", "return require('./sibling')");

    let config = GeneratorConfig::new()
        .with_override_suffix("prod")
        .with_output_root(out.path());
    let err = run_pipeline(vec![script], config).unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("not allowed"));
}

/// A script resolving to a scalar is an invalid return value and aborts
/// the run.
#[test]
fn scalar_return_aborts_the_run() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(scripts.path(), "scalar.lua", "return 42");

    let config = GeneratorConfig::new().with_output_root(out.path());
    let err = run_pipeline(vec![script], config).unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("must return a table"));
}

/// A failing script aborts the whole batch rather than being skipped.
#[test]
fn one_bad_script_fails_the_batch() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let good = write_script(scripts.path(), "good.lua", "return { ok = true }");
    let bad = write_script(scripts.path(), "bad.lua", "error('kaput')");

    let config = GeneratorConfig::new()
        .with_workers(1)
        .with_output_root(out.path());
    let err = run_pipeline(vec![bad, good], config).unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("kaput"));
}

/// Bundled helper modules and the host `add` function are available to
/// every script.
#[test]
fn scripts_use_builtins_and_host_functions() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let script = write_script(
        scripts.path(),
        "helpers.lua",
        "return { sum = add(20, 22), word = strutil.trim('  ok  ') }",
    );

    let config = GeneratorConfig::new()
        .with_format("json")
        .with_output_root(out.path());
    run_pipeline(vec![script.clone()], config).unwrap();

    let written = fs::read_to_string(expected_output(out.path(), &script, "json")).unwrap();
    assert_eq!(written, r#"{"sum":42,"word":"ok"}"#);
}

/// Scripts in nested directories land in mirrored output directories.
#[test]
fn nested_sources_mirror_into_output_root() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let nested = scripts.path().join("app").join("web");
    fs::create_dir_all(&nested).unwrap();
    let script = write_script(&nested, "site.lua", "return { a = 1 }");

    let config = GeneratorConfig::new()
        .with_format("json")
        .with_output_root(out.path());
    run_pipeline(vec![script.clone()], config).unwrap();

    let expected = expected_output(out.path(), &script, "json");
    assert!(expected.starts_with(out.path()));
    assert!(expected.ends_with("app/web/site.json"));
    assert!(expected.is_file());
}

/// Glob discovery through the local processor feeds the pipeline.
#[test]
fn glob_discovery_feeds_the_pipeline() {
    let scripts = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    write_script(scripts.path(), "one.lua", "return { n = 1 }");
    write_script(scripts.path(), "two.lua", "return { n = 2 }");

    let processor = LocalFileProcessor::new();
    let pattern = format!("{}/*.lua", scripts.path().display());
    let files = processor.find_files(&[pattern]).unwrap();
    assert_eq!(files.len(), 2);

    let config = GeneratorConfig::new()
        .with_format("json")
        .with_output_root(out.path());
    let formatter = Formatter::new(Format::Json, None);
    pipeline::run(files.clone(), &processor, &formatter, &config).unwrap();

    for file in &files {
        assert!(expected_output(out.path(), file, "json").is_file());
    }
}
