//! `ddlock clear` specs
//!
//! Fail-closed records never expire; clear is the recovery path.

use crate::prelude::*;

#[test]
fn clear_removes_stuck_record() {
    let project = Project::fail_closed();
    project.held_by_other("L1");

    project
        .ddlock()
        .args(&["clear", "L1"])
        .passes()
        .stdout_has("Cleared lock: L1 (was held by other)");

    project
        .ddlock()
        .args(&["run", "L1", "--", "true"])
        .passes()
        .stderr_has("Acquired lock L1");
}

#[test]
fn clear_missing_lock_is_not_an_error() {
    Project::fail_closed()
        .ddlock()
        .args(&["clear", "L1"])
        .passes()
        .stdout_has("Lock not held: L1");
}
