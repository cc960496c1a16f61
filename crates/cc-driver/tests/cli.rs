//! End-to-end CLI tests driving the four binaries together, the way a
//! user would: `cc0` a source file, `cc1` its tokens, `cc1t` to inspect
//! the result. Grounded on the teacher's `e2e/cli_tests.rs` style.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bin(name: &str) -> Command {
    Command::cargo_bin(name).unwrap()
}

#[test]
fn cc0_help_mentions_its_name() {
    bin("cc0")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cc0"));
}

#[test]
fn cc0_lexes_a_source_file_into_stores() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("main.c");
    std::fs::write(&src, "int main() { return 42; }").unwrap();
    let sstore = dir.path().join("s.sstore");
    let tstore = dir.path().join("t.tstore");

    bin("cc0")
        .arg(&src)
        .arg(&sstore)
        .arg(&tstore)
        .assert()
        .success();

    assert!(sstore.exists());
    assert!(tstore.exists());
    assert!(std::fs::metadata(&tstore).unwrap().len() > 0);
}

#[test]
fn full_pipeline_lex_parse_dump_round_trips_a_small_function() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("main.c");
    std::fs::write(&src, "int main() { return 1 + 2; }").unwrap();
    let sstore = dir.path().join("s.sstore");
    let tstore = dir.path().join("t.tstore");
    let astore = dir.path().join("a.astore");
    let symtab = dir.path().join("s.symtab");

    bin("cc0").arg(&src).arg(&sstore).arg(&tstore).assert().success();
    bin("cc1")
        .arg(&sstore)
        .arg(&tstore)
        .arg(&astore)
        .arg(&symtab)
        .assert()
        .success();

    assert!(astore.exists());
    assert!(std::fs::metadata(&astore).unwrap().len() > 0);

    bin("cc1t")
        .arg(&sstore)
        .arg(&astore)
        .arg(&symtab)
        .assert()
        .success()
        .stdout(predicate::str::contains("Program"));

    bin("cc1t")
        .arg(&sstore)
        .arg(&astore)
        .arg(&symtab)
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("total_nodes"));
}

#[test]
fn cc1t_rejects_an_empty_astore() {
    let dir = TempDir::new().unwrap();
    let sstore = dir.path().join("s.sstore");
    let astore = dir.path().join("a.astore");
    let symtab = dir.path().join("s.symtab");
    cc_store::SStore::init(&sstore).unwrap().close().unwrap();
    cc_store::AStore::init(&astore).unwrap().close().unwrap();
    cc_store::SymTab::init(&symtab).unwrap().close().unwrap();

    bin("cc1t")
        .arg(&sstore)
        .arg(&astore)
        .arg(&symtab)
        .assert()
        .failure();
}

#[test]
fn cc2_runs_a_tac_program_to_completion() {
    let dir = TempDir::new().unwrap();
    let tacfile = dir.path().join("prog.tac");
    let mut stream = cc_tac::TacStream::init(&tacfile).unwrap();
    stream
        .append(cc_tac::Instruction::new(
            cc_tac::Opcode::Assign,
            cc_tac::Operand::temp(0),
            cc_tac::Operand::immediate(40),
            cc_tac::Operand::NONE,
        ))
        .unwrap();
    stream
        .append(cc_tac::Instruction::new(
            cc_tac::Opcode::Add,
            cc_tac::Operand::temp(1),
            cc_tac::Operand::temp(0),
            cc_tac::Operand::immediate(2),
        ))
        .unwrap();
    stream.close().unwrap();

    bin("cc2").arg(&tacfile).assert().success();
}

#[test]
fn cc2_reports_failure_on_division_by_zero() {
    let dir = TempDir::new().unwrap();
    let tacfile = dir.path().join("prog.tac");
    let mut stream = cc_tac::TacStream::init(&tacfile).unwrap();
    stream
        .append(cc_tac::Instruction::new(
            cc_tac::Opcode::Div,
            cc_tac::Operand::temp(0),
            cc_tac::Operand::immediate(1),
            cc_tac::Operand::immediate(0),
        ))
        .unwrap();
    stream.close().unwrap();

    bin("cc2").arg(&tacfile).assert().failure();
}
