//! CLI help specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    Project::empty()
        .ddlock()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("show")
        .stdout_has("clear");
}

#[test]
fn version_reports_package_version() {
    Project::empty()
        .ddlock()
        .args(&["--version"])
        .passes()
        .stdout_has("ddlock 0.1.0");
}

#[test]
fn run_help_shows_trailing_command() {
    Project::empty()
        .ddlock()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--sort")
        .stdout_has("<COMMAND>...");
}
