//! Session Tests
//!
//! Note buffer behaviour, record merging, dictation and section modes.

use std::io::Cursor;

use lazyresident::error::{ExtractionError, ModelClientError, SessionError, TranscriptionError};
use lazyresident::ingest::{AudioClip, ExtractionErrorKind, MockExtractor, PdfExtractor};
use lazyresident::model::MockTranscriber;
use lazyresident::session::MergeOutcome;
use lazyresident::{ResidentError, SectionKind, SectionMode, Session};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn wav(seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(16_000.0 * seconds) as usize {
            writer.write_sample(((i % 64) as i16 - 32) * 100).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

// === Note Buffer ===

#[test]
fn test_append_concatenates() {
    let mut session = Session::new();
    session.notes_mut().append("BP 150/90.");
    session.notes_mut().append(" HR 88.");
    assert_eq!(session.notes().read(), "BP 150/90. HR 88.");

    session.notes_mut().replace("fresh");
    assert_eq!(session.notes().read(), "fresh");
}

#[test]
fn test_editing_notes_never_touches_sections() {
    let mut session = Session::new();
    session.set_content(SectionKind::History, "hx");
    session.notes_mut().clear();
    session.notes_mut().append("new notes");
    assert_eq!(session.content(SectionKind::History), "hx");
}

// === Record Merging ===

#[test]
fn test_merge_appends_named_block() {
    let mut session = Session::new();
    session.notes_mut().append("Typed notes.");
    let extractor = MockExtractor::new("  Lab: Hb 12.1 g/dL  ");

    let outcome = session
        .merge_document(b"%PDF-lab", Some("labs.pdf"), &extractor)
        .unwrap();
    assert_eq!(outcome, MergeOutcome::Merged { chars: "Lab: Hb 12.1 g/dL".len() });
    assert_eq!(
        session.notes().read(),
        "Typed notes.\n\n=== labs.pdf ===\nLab: Hb 12.1 g/dL"
    );
}

#[test]
fn test_duplicate_upload_is_not_appended_twice() {
    let mut session = Session::new();
    let extractor = MockExtractor::new("Discharge summary");

    session.merge_document(b"same bytes", None, &extractor).unwrap();
    let once = session.notes().read().to_string();
    let outcome = session.merge_document(b"same bytes", None, &extractor).unwrap();

    assert_eq!(outcome, MergeOutcome::AlreadyMerged);
    assert_eq!(session.notes().read(), once);
    assert_eq!(extractor.call_count(), 1);
    assert_eq!(session.snapshot().merged_documents, 1);
}

#[test_case(ExtractionErrorKind::EmptyDocument ; "empty")]
#[test_case(ExtractionErrorKind::Encrypted ; "encrypted")]
#[test_case(ExtractionErrorKind::Corrupt ; "corrupt")]
#[test_case(ExtractionErrorKind::NoText ; "no text")]
fn test_failed_merge_leaves_notes_unchanged(kind: ExtractionErrorKind) {
    let mut session = Session::new();
    session.notes_mut().append("Typed notes.");
    let extractor = MockExtractor::failing(kind);

    assert!(session.merge_document(b"upload", Some("x.pdf"), &extractor).is_err());
    assert_eq!(session.notes().read(), "Typed notes.");

    // A failed upload can be retried once fixed
    let fixed = MockExtractor::new("now readable");
    assert!(matches!(
        session.merge_document(b"upload", Some("x.pdf"), &fixed),
        Ok(MergeOutcome::Merged { .. })
    ));
}

#[test]
fn test_whitespace_only_extraction_is_no_text() {
    let mut session = Session::new();
    let extractor = MockExtractor::new(" \n\t ");
    assert!(matches!(
        session.merge_document(b"scan", None, &extractor),
        Err(ExtractionError::NoText)
    ));
    assert!(session.notes().is_empty());
}

#[test]
fn test_real_extractor_rejects_garbage() {
    let mut session = Session::new();
    let err = session
        .merge_document(b"this is not a pdf", None, &PdfExtractor::new())
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Corrupt { .. }));

    let err = session
        .merge_document(b"", None, &PdfExtractor::new())
        .unwrap_err();
    assert!(matches!(err, ExtractionError::EmptyDocument));
}

#[test]
fn test_missing_pdf_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    assert!(matches!(
        PdfExtractor::new().extract_file(&missing),
        Err(ExtractionError::Io { .. })
    ));
}

// === Dictation ===

#[test]
fn test_transcript_is_appended_with_session_model() {
    let mut session = Session::new().with_model("gemini-2.5-pro");
    session.notes_mut().append("Typed notes.");
    let clip = AudioClip::from_wav_bytes(wav(1.0)).unwrap();
    let transcriber = MockTranscriber::new("  Patient dictated: no fever.  ");

    let chars = session.append_transcript(&clip, &transcriber).unwrap();
    assert_eq!(chars, "Patient dictated: no fever.".len());
    assert_eq!(
        session.notes().read(),
        "Typed notes.\n\nPatient dictated: no fever."
    );
    let calls = transcriber.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].as_str(), "gemini-2.5-pro");
}

#[test]
fn test_failed_transcription_leaves_notes_unchanged() {
    let mut session = Session::new();
    session.notes_mut().append("Typed notes.");
    let clip = AudioClip::from_wav_bytes(wav(0.5)).unwrap();

    let failing = MockTranscriber::failing(ModelClientError::network("timeout"));
    assert!(matches!(
        session.append_transcript(&clip, &failing),
        Err(TranscriptionError::Client(_))
    ));
    let silent = MockTranscriber::new("   ");
    assert!(matches!(
        session.append_transcript(&clip, &silent),
        Err(TranscriptionError::EmptyTranscript)
    ));
    assert_eq!(session.notes().read(), "Typed notes.");
}

#[test]
fn test_audio_clip_validation() {
    assert!(matches!(
        AudioClip::from_wav_bytes(Vec::new()),
        Err(TranscriptionError::EmptyAudio)
    ));
    assert!(matches!(
        AudioClip::from_wav_bytes(b"RIFF nonsense".to_vec()),
        Err(TranscriptionError::InvalidAudio { .. })
    ));
    assert!(matches!(
        AudioClip::from_wav_bytes(wav(0.01)),
        Err(TranscriptionError::InvalidAudio { .. })
    ));

    let clip = AudioClip::from_wav_bytes(wav(2.0)).unwrap();
    assert_eq!(clip.sample_rate(), 16_000);
    assert_eq!(clip.channels(), 1);
    assert!((clip.duration_secs() - 2.0).abs() < 1e-6);
    assert_eq!(clip.mime_type(), "audio/wav");
}

// === Section Modes ===

#[test]
fn test_edit_then_copy_commits_field_text() {
    let mut session = Session::new();
    session.set_content(SectionKind::TentativeDiagnosis, "generated");
    assert_eq!(session.section(SectionKind::TentativeDiagnosis).mode(), SectionMode::Edit);
    assert_eq!(session.section(SectionKind::TentativeDiagnosis).edit_field(), "generated");

    session
        .edit_section(SectionKind::TentativeDiagnosis, "[Active Problems]\n- Migraine")
        .unwrap();
    // Not committed yet
    assert_eq!(session.content(SectionKind::TentativeDiagnosis), "generated");

    session.set_mode(SectionKind::TentativeDiagnosis, SectionMode::Edit);
    session.commit_edit(SectionKind::TentativeDiagnosis).unwrap();
    assert_eq!(
        session.content(SectionKind::TentativeDiagnosis),
        "[Active Problems]\n- Migraine"
    );
    assert_eq!(session.section(SectionKind::TentativeDiagnosis).mode(), SectionMode::Copy);
}

#[test]
fn test_switching_to_copy_keeps_typed_text() {
    let mut session = Session::new();
    session.set_content(SectionKind::History, "generated");
    session.edit_section(SectionKind::History, "clinician typed").unwrap();

    session.set_mode(SectionKind::History, SectionMode::Copy);
    let section = session.section(SectionKind::History);
    assert_eq!(section.content(), "clinician typed");
    assert_eq!(section.mode(), SectionMode::Copy);
    assert_eq!(section.pending_edit(), None);
}

#[test]
fn test_switching_to_edit_leaves_content_unchanged() {
    let mut session = Session::new();
    session.set_content(SectionKind::SoapPlan, "plan");
    session.set_mode(SectionKind::SoapPlan, SectionMode::Copy);
    assert_eq!(session.content(SectionKind::SoapPlan), "plan");

    session.set_mode(SectionKind::SoapPlan, SectionMode::Edit);
    assert_eq!(session.content(SectionKind::SoapPlan), "plan");
    assert_eq!(session.section(SectionKind::SoapPlan).edit_field(), "plan");

    // Toggling back without typing keeps the content as it was
    session.set_mode(SectionKind::SoapPlan, SectionMode::Copy);
    assert_eq!(session.content(SectionKind::SoapPlan), "plan");
}

#[test]
fn test_copy_mode_rejects_edits() {
    let mut session = Session::new();
    session.set_mode(SectionKind::ReviewOfSystems, SectionMode::Copy);
    let err = session.edit_section(SectionKind::ReviewOfSystems, "x").unwrap_err();
    assert_eq!(
        err,
        SessionError::SectionNotEditable {
            section: SectionKind::ReviewOfSystems
        }
    );
    let err = ResidentError::from(err);
    assert_eq!(err.error_code(), "SECTION_NOT_EDITABLE");
    assert!(err.is_recoverable());
}

#[test]
fn test_snapshot_serializes_sections_in_order() {
    let mut session = Session::new();
    session.notes_mut().append("notes");
    session.set_content(SectionKind::History, "hx");
    let json = serde_json::to_value(session.snapshot()).unwrap();

    assert_eq!(json["notes"], "notes");
    assert_eq!(json["model"], "gemini-2.5-flash");
    let kinds: Vec<_> = json["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["history", "chief_complaint", "diagnosis", "ros", "physical_exam", "soap"]
    );
    assert_eq!(json["sections"][0]["content"], "hx");
    assert_eq!(json["sections"][0]["mode"], "edit");
}
