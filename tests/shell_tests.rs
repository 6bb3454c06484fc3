//! Shell Tests
//!
//! Drives the interactive shell with scripted input and mock clients.

use std::io::Cursor;

use lazyresident::cli::shell::{Shell, ShellFlow};
use lazyresident::ingest::MockExtractor;
use lazyresident::model::{MockTranscriber, ModelClient};
use lazyresident::{MockModelClient, SectionKind, SectionMode, Session};
use pretty_assertions::assert_eq;

fn shell_with(client: MockModelClient) -> Shell {
    Shell::new(
        Session::new().with_structured_output(false),
        Box::new(client) as Box<dyn ModelClient>,
        Box::new(MockTranscriber::new("dictated text")),
        Box::new(MockExtractor::new("record text")),
    )
}

fn run(shell: &mut Shell, line: &str) -> String {
    let mut out = Vec::new();
    let flow = shell.execute(line, &mut out).unwrap();
    assert_eq!(flow, ShellFlow::Continue);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_notes_commands() {
    let mut shell = shell_with(MockModelClient::new());
    run(&mut shell, "append Headache for 3 days.");
    run(&mut shell, "append  No fever.");
    assert_eq!(shell.session().notes().read(), "Headache for 3 days. No fever.");
    run(&mut shell, "append \tBP 150/90 ");
    assert_eq!(
        shell.session().notes().read(),
        "Headache for 3 days. No fever.\tBP 150/90 "
    );

    run(&mut shell, "replace Chest pain since this morning.");
    let out = run(&mut shell, "notes");
    assert_eq!(out, "Chest pain since this morning.\n");

    run(&mut shell, "clear");
    assert_eq!(run(&mut shell, "notes"), "(no notes)\n");
}

#[test]
fn test_generate_edit_and_copy() {
    let client = MockModelClient::new()
        .with_reply("54F with headache.")
        .with_reply("Headache for 3 days");
    let mut shell = shell_with(client);
    run(&mut shell, "append Patient reports headache for 3 days.");

    let out = run(&mut shell, "gen history");
    assert!(out.contains("## History\n54F with headache."));
    assert_eq!(shell.session().section(SectionKind::History).mode(), SectionMode::Copy);

    run(&mut shell, "open hx");
    run(&mut shell, "edit hx 54-year-old woman with a 3-day headache.");
    let out = run(&mut shell, "copy hx");
    assert!(out.contains("54-year-old woman with a 3-day headache."));
    assert_eq!(
        shell.session().content(SectionKind::History),
        "54-year-old woman with a 3-day headache."
    );

    run(&mut shell, "gen cc");
    let prompt = shell.session().prompt_for(SectionKind::TentativeDiagnosis);
    assert!(prompt.contains("History:\n54-year-old woman with a 3-day headache."));
    assert!(prompt.contains("Chief Complaint:\nHeadache for 3 days"));
}

#[test]
fn test_copy_twice_shows_content() {
    let mut shell = shell_with(MockModelClient::new());
    run(&mut shell, "open soap");
    run(&mut shell, "edit soap Start sumatriptan.");
    let first = run(&mut shell, "copy soap");
    let second = run(&mut shell, "copy soap");
    assert_eq!(first, "SOAP Note (copy view):\nStart sumatriptan.\n");
    assert_eq!(second, first);
    assert_eq!(shell.session().section(SectionKind::SoapPlan).mode(), SectionMode::Copy);
}

#[test]
fn test_blank_key_is_rejected() {
    let mut shell = Shell::from_config(lazyresident::Config::default());
    let out = run(&mut shell, "key   ");
    assert!(out.contains("Error [CONFIG_ERROR]"));
    assert!(!out.contains("API key set"));
}

#[test]
fn test_errors_are_reported_and_session_continues() {
    let mut shell = shell_with(MockModelClient::new());

    let out = run(&mut shell, "gen history");
    assert!(out.contains("Error [EMPTY_INPUT]"));
    assert!(out.contains("  - Type, dictate or paste notes first"));

    let out = run(&mut shell, "gen discharge");
    assert!(out.contains("Error [UNKNOWN_SECTION]"));

    run(&mut shell, "copy soap");
    let out = run(&mut shell, "edit soap new plan");
    assert!(out.contains("Error [SECTION_NOT_EDITABLE]"));

    let out = run(&mut shell, "frobnicate");
    assert!(out.contains("Unknown command 'frobnicate'"));
}

#[test]
fn test_model_selection() {
    let mut shell = shell_with(MockModelClient::new());
    assert_eq!(run(&mut shell, "model"), "Model: gemini-2.5-flash\n");
    assert_eq!(run(&mut shell, "model gemini-2.5-pro"), "Model: gemini-2.5-pro\n");
    assert_eq!(
        run(&mut shell, "model my-tuned-model"),
        "Model: my-tuned-model (not in the supported list)\n"
    );
    assert_eq!(run(&mut shell, "model default"), "Model: gemini-2.5-flash\n");

    let out = run(&mut shell, "models");
    assert!(out.lines().any(|l| l.starts_with("* gemini-2.5-flash")));
}

#[test]
fn test_style_and_status() {
    let mut shell = shell_with(MockModelClient::new());
    run(&mut shell, "style Keep the story to three sentences.");
    assert_eq!(
        shell.session().history_style(),
        Some("Keep the story to three sentences.")
    );
    run(&mut shell, "style reset");
    assert_eq!(shell.session().history_style(), None);

    let out = run(&mut shell, "status");
    assert!(out.contains("[ ] 1. History (edit)"));
    assert!(out.ends_with("Next: History\n"));
}

#[test]
fn test_unconfigured_shell_reports_missing_key() {
    let mut shell = Shell::from_config(lazyresident::Config::default());
    run(&mut shell, "append Headache.");
    let out = run(&mut shell, "gen history");
    assert!(out.contains("Error [AUTH_FAILURE]"));
    assert_eq!(shell.session().content(SectionKind::History), "");
}

#[test]
fn test_run_until_quit() {
    let mut shell = shell_with(MockModelClient::new().with_reply("draft"));
    let input = Cursor::new("append notes\ngen history\nquit\nappend ignored\n");
    let mut out = Vec::new();
    shell.run(input, &mut out).unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("LazyResident shell."));
    assert_eq!(shell.session().content(SectionKind::History), "draft");
    assert_eq!(shell.session().notes().read(), "notes");
}

#[test]
fn test_quit_flow() {
    let mut shell = shell_with(MockModelClient::new());
    let mut out = Vec::new();
    assert_eq!(shell.execute("exit", &mut out).unwrap(), ShellFlow::Quit);
}
