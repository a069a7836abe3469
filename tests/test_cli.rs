use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::Builder;

#[test]
fn consulting_a_file_then_asking_a_goal_prints_an_answer() {
    let mut file = Builder::new().suffix(".pl").tempfile().expect("could not create temp file");
    writeln!(file, "parent(john, mary).\nparent(john, alice).\n").expect("could not write temp file");
    let path = file.path();

    let mut cmd = Command::cargo_bin("sldc").expect("could not find sldc binary");
    cmd.arg(path)
        .write_stdin("parent(john, X).\nquit\n")
        .assert()
        .stdout(predicate::str::contains(format!("Consulted {}.", path.display())))
        .stdout(predicate::str::contains("X = mary"));
}

#[test]
fn a_goal_with_no_solutions_prints_false() {
    let mut file = Builder::new().suffix(".pl").tempfile().expect("could not create temp file");
    writeln!(file, "parent(john, mary).\n").expect("could not write temp file");
    let path = file.path();

    let mut cmd = Command::cargo_bin("sldc").expect("could not find sldc binary");
    cmd.arg(path)
        .write_stdin("parent(sue, X).\nquit\n")
        .assert()
        .stdout(predicate::str::contains("false."));
}

#[test]
fn a_malformed_goal_reports_an_error_instead_of_crashing() {
    let mut file = Builder::new().suffix(".pl").tempfile().expect("could not create temp file");
    writeln!(file, "p(1).\n").expect("could not write temp file");
    let path = file.path();

    let mut cmd = Command::cargo_bin("sldc").expect("could not find sldc binary");
    cmd.arg(path)
        .write_stdin("p(.\nquit\n")
        .assert()
        .stdout(predicate::str::contains("Error"));
}
