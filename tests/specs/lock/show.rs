//! `ddlock show` specs

use crate::prelude::*;

#[test]
fn show_missing_lock() {
    Project::fail_open()
        .ddlock()
        .args(&["show", "L1"])
        .passes()
        .stdout_eq("Lock not held: L1\n");
}

#[test]
fn show_released_fail_open_lock_keeps_record() {
    let project = Project::fail_open();
    project
        .ddlock()
        .args(&["run", "L1", "--", "true"])
        .passes();

    project
        .ddlock()
        .args(&["show", "L1"])
        .passes()
        .stdout_has("Lock: L1")
        .stdout_has("Owner: spec-runner")
        .stdout_has("Fencing token: 1")
        .stdout_has("Lease: 1ms");
}

#[test]
fn show_json_format() {
    let project = Project::fail_open();
    project
        .ddlock()
        .args(&["run", "L1", "--", "true"])
        .passes();

    project
        .ddlock()
        .args(&["show", "L1", "--format", "json"])
        .passes()
        .stdout_has("\"fencing_token\": 1")
        .stdout_has("\"lease_duration_ms\": 1");
}

#[test]
fn show_record_held_by_other() {
    let project = Project::fail_closed();
    project.held_by_other("L1");

    project
        .ddlock()
        .args(&["show", "L1"])
        .passes()
        .stdout_eq("Lock: L1\n  Owner: other\n  Identity token: theirs\n");
}

#[test]
fn show_missing_lock_as_json() {
    Project::fail_open()
        .ddlock()
        .args(&["show", "L1", "--format", "json"])
        .passes()
        .stdout_has("\"lock\": \"L1\"")
        .stdout_has("\"held\": false");
}
