use assert_cmd::Command;
use std::path::Path;

/// `trellis --input <listing> <args>` with paging, colours and env config off
pub fn run_trellis_command(listing: &Path, args: &[&str]) -> Command {
    let mut cmd = run_trellis_without_input(args);
    cmd.arg("--input").arg(listing);
    cmd
}

pub fn run_trellis_without_input(args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("trellis").expect("Failed to find trellis binary");
    cmd.env_remove("TRELLIS_INPUT")
        .env_remove("TRELLIS_LOG")
        .envs(vec![("TRELLIS_PAGER", "never"), ("NO_COLOR", "1")]);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
