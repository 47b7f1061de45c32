use std::path::{Path, PathBuf};
use xdebug_calltree::commands::{
    build_merged_tree, execute_graph, function_summary, split_file, validate_args,
    validate_profile_file, AggregateMode, GraphArgs, OutputFormat,
};
use xdebug_calltree::output::read_profile;
use xdebug_calltree::parser::NameTable;
use xdebug_calltree::utils::config::run_separator;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/single_run.cg")
}

#[test]
fn test_validate_args_valid() {
    let args = GraphArgs {
        inputs: vec![fixture_path()],
        ..Default::default()
    };
    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_negative_threshold() {
    let args = GraphArgs {
        inputs: vec![fixture_path()],
        threshold: -1.0,
        ..Default::default()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_merge_modes() {
    let mut names = NameTable::new();
    let aggregated = build_merged_tree(
        &GraphArgs {
            inputs: vec![fixture_path(), fixture_path()],
            ..Default::default()
        },
        &mut names,
    )
    .unwrap();
    assert_eq!(aggregated.tree.node_count(), 12);
    assert_eq!(aggregated.commands.len(), 2);

    let raw = build_merged_tree(
        &GraphArgs {
            inputs: vec![fixture_path(), fixture_path()],
            aggregate: AggregateMode::Disabled,
            ..Default::default()
        },
        &mut names,
    )
    .unwrap();
    assert_eq!(raw.tree.node_count(), 45);
    assert_eq!(raw.tree.total_call_count(), 44);
}

#[test]
fn test_broken_file_is_skipped_with_ignore() {
    let temp_dir = tempfile::tempdir().unwrap();
    let broken = temp_dir.path().join("broken.cg");
    std::fs::write(&broken, "version: 0.9.6\ncmd: /a.php\n").unwrap();

    let mut args = GraphArgs {
        inputs: vec![broken, fixture_path()],
        ..Default::default()
    };
    let mut names = NameTable::new();
    assert!(build_merged_tree(&args, &mut names).is_err());

    args.ignore_errors = true;
    let merged = build_merged_tree(&args, &mut names).unwrap();
    assert_eq!(merged.skipped, 1);
    assert_eq!(merged.tree.total_time(), 401402);
}

#[test]
fn test_graph_writes_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("profile.json");

    execute_graph(GraphArgs {
        inputs: vec![fixture_path()],
        format: OutputFormat::Json,
        output: Some(output.clone()),
        ..Default::default()
    })
    .unwrap();

    let profile = read_profile(&output).unwrap();
    assert_eq!(profile.total_call_count, 22);
    assert_eq!(profile.commands, ["/var/www/a.php"]);

    assert_eq!(profile.functions.len(), 11);
    let bar = profile.functions.iter().find(|f| f.function == "bar").unwrap();
    assert_eq!(bar.file.as_deref(), Some("/lib.php"));
    assert_eq!(bar.invocation_count, 4);
    assert_eq!(bar.called_from.len(), 4);
    assert_eq!(bar.sub_calls[0].function, "baz");
    assert_eq!(bar.sub_calls[0].call_count, 4);
}

#[test]
fn test_function_table_spans_merged_runs() {
    let args = GraphArgs {
        inputs: vec![fixture_path(), fixture_path()],
        ..Default::default()
    };
    let mut names = NameTable::new();
    let merged = build_merged_tree(&args, &mut names).unwrap();

    let bar = merged.functions.get(names.intern_function("bar")).unwrap();
    assert_eq!(bar.invocation_count, 8);
    assert_eq!(bar.sub_calls[0].call_count, 8);
    assert_eq!(bar.called_from.len(), 4);

    let summary = function_summary(&merged.functions, &names, 2);
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Top 2 functions by self time:");
    assert!(lines[2].trim_start().starts_with("heavy"));
    assert!(lines[2].contains("400436"));
    assert!(lines[3].trim_start().starts_with("{main}"));
}

#[test]
fn test_graph_writes_dot() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("calls.dot");

    execute_graph(GraphArgs {
        inputs: vec![fixture_path()],
        threshold: 0.0,
        output: Some(output.clone()),
        ..Default::default()
    })
    .unwrap();

    let dot = std::fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph G {"));
    assert_eq!(dot.matches(" -> ").count(), 11);
}

#[test]
fn test_split_command() {
    let fixture = std::fs::read_to_string(fixture_path()).unwrap();
    let separator = run_separator();
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("cachegrind.out.7");
    std::fs::write(
        &input,
        format!("\n{separator}\n{fixture}{separator}\n{fixture}"),
    )
    .unwrap();

    let written = split_file(&input).unwrap();

    assert_eq!(
        written,
        [
            temp_dir.path().join("cachegrind.out.0.7"),
            temp_dir.path().join("cachegrind.out.1.7"),
        ]
    );
    for path in &written {
        assert_eq!(std::fs::read_to_string(path).unwrap(), fixture);
    }
}

#[test]
fn test_split_leaves_single_run_alone() {
    assert!(split_file(&fixture_path()).unwrap().is_empty());
}

#[test]
fn test_validate_command() {
    assert!(validate_profile_file(&fixture_path()).is_ok());

    let temp_dir = tempfile::tempdir().unwrap();
    let broken = temp_dir.path().join("broken.cg");
    std::fs::write(&broken, "version: 0.9.7\n").unwrap();
    assert!(validate_profile_file(&broken).is_err());
}
