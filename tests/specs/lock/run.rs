//! `ddlock run` specs
//!
//! Verify commands run under the lock and the lock is released afterwards.

use crate::prelude::*;

#[test]
fn run_exports_fencing_token_to_child() {
    Project::fail_open()
        .ddlock()
        .args(&["run", "L1", "--", "sh", "-c", "echo token=$DDLOCK_FENCING_TOKEN"])
        .passes()
        .stdout_eq("token=1\n")
        .stderr_has("Acquired lock L1 (fencing token 1)")
        .stderr_has("Released lock L1");
}

#[test]
fn fencing_token_increases_across_runs() {
    let project = Project::fail_open();
    project
        .ddlock()
        .args(&["run", "L1", "--", "true"])
        .passes();

    project
        .ddlock()
        .args(&["run", "L1", "--", "sh", "-c", "echo token=$DDLOCK_FENCING_TOKEN"])
        .passes()
        .stdout_has("token=2");
}

#[test]
fn run_exits_with_child_exit_code() {
    let project = Project::fail_closed();
    project
        .ddlock()
        .args(&["run", "L1", "--", "sh", "-c", "exit 3"])
        .exits_with(3)
        .stderr_has("Released lock L1");

    // Released even though the child failed
    project
        .ddlock()
        .args(&["show", "L1"])
        .passes()
        .stdout_has("Lock not held: L1");
}

#[test]
fn fail_closed_run_fails_while_lock_is_held() {
    let project = Project::fail_closed();
    project.held_by_other("L1");

    project
        .ddlock()
        .args(&["run", "L1", "--", "echo", "should not run"])
        .fails()
        .stderr_has("failed to acquire lock")
        .stderr_has("conditional check failed");
}

#[test]
fn fail_closed_run_has_no_fencing_token() {
    Project::fail_closed()
        .ddlock()
        .args(&["run", "L1", "--", "sh", "-c", "echo token=${DDLOCK_FENCING_TOKEN:-none}"])
        .passes()
        .stdout_has("token=none")
        .stderr_lacks("fencing token");
}

#[test]
fn run_with_sort_key_locks_composite_id() {
    let project = Project::empty();
    project.file("ddlock.toml", SORTED_CONFIG);

    project
        .ddlock()
        .args(&["run", "L1", "--sort", "a", "--", "true"])
        .passes()
        .stderr_has("Acquired lock L1/a");
}

#[test]
fn missing_program_still_releases_lock() {
    let project = Project::fail_closed();
    project
        .ddlock()
        .args(&["run", "L1", "--", "ddlock-no-such-program"])
        .fails()
        .stderr_has("failed to start ddlock-no-such-program");

    project
        .ddlock()
        .args(&["show", "L1"])
        .passes()
        .stdout_has("Lock not held: L1");
}
