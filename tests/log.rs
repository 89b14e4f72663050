mod common;

use common::command::run_trellis_command;
use common::listing::{ListingFile, converging_branches, disjoint_branches};
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn log_defaults_to_the_current_branch(converging_branches: ListingFile) {
    run_trellis_command(converging_branches.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "* a2 (HEAD -> main) Second on main\n\
             * a1 First on main\n\
             * r0 (tag: v0.1) Initial commit\n",
        ));
}

#[rstest]
fn log_merges_branches_into_lanes(converging_branches: ListingFile) {
    run_trellis_command(
        converging_branches.path(),
        &["log", "--branch", "main", "--branch", "feature"],
    )
    .assert()
    .success()
    .stdout(predicate::eq(
        "* | a2 (HEAD -> main) Second on main\n\
         * | a1 First on main\n\
         | * b2 (feature) Second on feature\n\
         | * b1 First on feature\n\
         * * r0 (tag: v0.1) Initial commit\n",
    ));
}

#[rstest]
fn log_oneline_omits_lanes(converging_branches: ListingFile) {
    run_trellis_command(
        converging_branches.path(),
        &["log", "--oneline", "--branch", "feature", "--commit", "a1"],
    )
    .assert()
    .success()
    .stdout(predicate::eq(
        "b2 (feature) Second on feature\n\
         b1 First on feature\n\
         a1 First on main\n\
         r0 (tag: v0.1) Initial commit\n",
    ));
}

#[rstest]
fn log_shows_disjoint_histories_separately(disjoint_branches: ListingFile) {
    run_trellis_command(
        disjoint_branches.path(),
        &["log", "--branch", "main", "--branch", "pages"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("* | x1 (HEAD -> main) Main work"))
    .stdout(predicate::str::contains("  * y1 (origin/pages) Pages work"))
    .stdout(predicate::str::contains("  * y0 Pages root"))
    .stderr(predicate::str::contains("histories are disjoint"));
}

#[rstest]
fn log_rejects_unknown_branches(converging_branches: ListingFile) {
    run_trellis_command(converging_branches.path(), &["log", "--branch", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown branch: ghost"));
}
