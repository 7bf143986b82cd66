use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pipesh::exec::ExitOutcome;
use pipesh::sequence::SubCommandOutcome;
use pipesh::{LineReport, run_line};

fn run_in(dir: &Path, line: &str) -> LineReport {
    // Relative paths would depend on the test process cwd; substitute the
    // scratch directory for `@`.
    run_line(&line.replace('@', &dir.display().to_string()))
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

macro_rules! status_test {
    ($name:ident, $line:expr, $status:expr) => {
        #[test]
        fn $name() {
            assert_eq!(run_line($line).status(), $status, "line: {}", $line);
        }
    };
}

// ── Status of the last sub-command ──

status_test!(status_true, "true", 0);
status_test!(status_false, "false", 1);
status_test!(status_sequence_last_wins, "false; true", 0);
status_test!(status_sequence_last_fails, "true; false", 1);
status_test!(status_pipeline_last_stage, "true | false", 1);
status_test!(status_pipeline_first_fails, "false | true", 0);
status_test!(status_not_found, "pipesh-definitely-missing-cmd", 127);
status_test!(status_empty_line, "", 0);
status_test!(status_only_delimiters, " ; & ;; ", 0);
status_test!(status_leading_pipe_forgiven, "| true", 0);
status_test!(status_trailing_pipe_forgiven, "false |", 1);

// ── Process and pipe accounting ──

#[test]
fn one_process_per_subcommand_without_pipes() {
    let report = run_line("true; true; false; true");
    assert_eq!(report.subcommands.len(), 4);
    assert_eq!(report.processes_spawned(), 4);
    for sub in &report.subcommands {
        let SubCommandOutcome::Ran(run) = &sub.outcome else {
            panic!("sub-command did not run: {:?}", sub.subcommand);
        };
        assert_eq!(run.pipes_closed, 0);
    }
}

#[test]
fn k_pipes_spawn_k_plus_one_processes() {
    for k in 1..=4 {
        let line = vec!["true"; k + 1].join(" | ");
        let report = run_line(&line);
        let SubCommandOutcome::Ran(run) = &report.subcommands[0].outcome else {
            panic!("pipeline did not run: {line}");
        };
        assert_eq!(run.reaped.len(), k + 1, "line: {line}");
        assert_eq!(run.pipes_closed, k, "line: {line}");
        assert!(run.launch_failures.is_empty());
    }
}

// ── Pipes ──

#[test]
fn two_stage_pipe_matches_plain_cat() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in"), "a\n").unwrap();
    run_in(dir.path(), "echo a | cat > @/piped");
    run_in(dir.path(), "cat < @/in > @/plain");
    assert_eq!(read(dir.path(), "piped"), "a\n");
    assert_eq!(read(dir.path(), "piped"), read(dir.path(), "plain"));
}

#[test]
fn three_stage_pipe_does_not_hang() {
    let dir = tempfile::tempdir().unwrap();
    let line = format!("yes | head -n1 | cat > {}/out", dir.path().display());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let status = run_line(&line).status();
        let _ = tx.send(status);
    });
    let status = rx
        .recv_timeout(Duration::from_secs(20))
        .expect("pipeline hung: a pipe descriptor leaked");
    assert_eq!(status, 0);
    assert_eq!(read(dir.path(), "out"), "y\n");
}

#[test]
fn pipe_chain_transforms_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("words"), "b\na\nb\nc\n").unwrap();
    run_in(dir.path(), "cat @/words | sort | uniq > @/out");
    assert_eq!(read(dir.path(), "out"), "a\nb\nc\n");
}

#[test]
fn input_redirect_on_first_stage() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in"), "one\ntwo\n").unwrap();
    run_in(dir.path(), "cat < @/in | wc -l > @/count");
    assert_eq!(read(dir.path(), "count").trim(), "2");
}

#[test]
fn output_redirect_on_inner_stage_has_no_effect() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "echo hi > @/inner | cat > @/out");
    assert!(!dir.path().join("inner").exists());
    assert_eq!(read(dir.path(), "out"), "hi\n");
}

// ── Redirection ──

#[test]
fn truncate_keeps_only_last_run() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "echo first > @/f");
    run_in(dir.path(), "echo second > @/f");
    assert_eq!(read(dir.path(), "f"), "second\n");
}

#[test]
fn append_concatenates_runs() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "echo first >> @/f");
    run_in(dir.path(), "echo second >> @/f");
    assert_eq!(read(dir.path(), "f"), "first\nsecond\n");
}

#[test]
fn last_output_operator_wins() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "echo x > @/a > @/b");
    assert!(!dir.path().join("a").exists());
    assert_eq!(read(dir.path(), "b"), "x\n");
}

#[test]
fn created_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "echo x > @/private");
    let mode = fs::metadata(dir.path().join("private"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o077, 0);
}

#[test]
fn missing_input_file_fails_child_not_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_in(dir.path(), "cat < @/missing; echo ok > @/after");
    assert_eq!(report.subcommands.len(), 2);
    assert_eq!(report.subcommands[0].status(), Some(1));
    assert_eq!(read(dir.path(), "after"), "ok\n");
}

#[test]
fn unavailable_input_does_not_stop_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_in(dir.path(), "cat < @/missing | echo sibling > @/out");
    let SubCommandOutcome::Ran(run) = &report.subcommands[0].outcome else {
        panic!("pipeline did not run");
    };
    assert_eq!(run.reaped.len(), 2);
    let first = run.reaped.iter().find(|r| r.child.index == 0).unwrap();
    assert_eq!(first.outcome, Ok(ExitOutcome::Exited(1)));
    assert_eq!(read(dir.path(), "out"), "sibling\n");
}

// ── Short-circuit ──

#[test]
fn failure_before_ampersand_stops_line() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_in(dir.path(), "false & echo hi > @/out");
    assert!(report.short_circuited());
    assert_eq!(report.processes_spawned(), 1);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn success_before_ampersand_continues() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_in(dir.path(), "true & echo hi > @/out");
    assert!(!report.short_circuited());
    assert_eq!(report.processes_spawned(), 2);
    assert_eq!(read(dir.path(), "out"), "hi\n");
}

#[test]
fn failure_before_semicolon_continues() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "false ; echo hi > @/out");
    assert_eq!(read(dir.path(), "out"), "hi\n");
}

#[test]
fn double_ampersand_behaves_like_single() {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), "false && echo hi > @/out");
    assert!(!dir.path().join("out").exists());
}

// ── Malformed directives ──

#[test]
fn missing_target_spawns_nothing() {
    let report = run_line("cat >");
    assert_eq!(report.subcommands.len(), 1);
    assert!(matches!(
        report.subcommands[0].outcome,
        SubCommandOutcome::Skipped(_)
    ));
    assert_eq!(report.processes_spawned(), 0);

    // interpreter is still usable afterwards
    assert_eq!(run_line("true").status(), 0);
}

#[test]
fn malformed_subcommand_does_not_block_rest_of_line() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_in(dir.path(), "cat < & echo next > @/out");
    assert_eq!(report.processes_spawned(), 1);
    assert_eq!(read(dir.path(), "out"), "next\n");
}
