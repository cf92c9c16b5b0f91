//! CLI error specs

use crate::prelude::*;

#[test]
fn missing_config_is_reported() {
    Project::empty()
        .ddlock()
        .args(&["show", "L1"])
        .fails()
        .stderr_has("failed to read config");
}

#[test]
fn config_without_mode_is_rejected() {
    let project = Project::empty();
    project.file(
        "ddlock.toml",
        "[table]\nname = \"locks\"\npartition_key = \"id\"\n",
    );

    project
        .ddlock()
        .args(&["show", "L1"])
        .fails()
        .stderr_has("one of [fail_closed] or [fail_open] is required");
}

#[test]
fn reserved_key_name_is_rejected() {
    let project = Project::empty();
    project.file(
        "ddlock.toml",
        "[table]\nname = \"locks\"\npartition_key = \"owner\"\n\
         [fail_closed]\nacquire_period = \"10ms\"\n",
    );

    project
        .ddlock()
        .args(&["show", "L1"])
        .fails()
        .stderr_has("collides with a lock record attribute");
}

#[test]
fn missing_sort_key_is_a_validation_error() {
    let project = Project::empty();
    project.file("ddlock.toml", SORTED_CONFIG);

    project
        .ddlock()
        .args(&["run", "L1", "--", "true"])
        .fails()
        .stderr_has("missing required sort key");
}

#[test]
fn run_requires_a_command() {
    Project::fail_closed()
        .ddlock()
        .args(&["run", "L1"])
        .fails()
        .stderr_has("required");
}

#[test]
fn unknown_command_fails() {
    Project::fail_closed()
        .ddlock()
        .args(&["steal", "L1"])
        .fails();
}
