//! CLI Command Implementations
//!
//! One function per subcommand. Each builds a fresh [`Session`], so nothing
//! carries over between invocations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use super::shell::Shell;
use super::InputArgs;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::ingest::{AudioClip, PdfExtractor};
use crate::model::{GeminiClient, ModelRegistry, Transcriber, DEFAULT_MODEL};
use crate::pipeline::SectionKind;
use crate::session::{MergeOutcome, Session};

/// Empty session carrying the configured model and output options
pub fn session_from_config(config: &Config) -> Session {
    Session::new()
        .with_model(config.model.as_str())
        .with_structured_output(config.structured_output)
}

/// PDF files named directly, plus every `.pdf` under named directories
pub fn collect_pdfs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            found.extend(
                WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file() && is_pdf(entry.path()))
                    .map(|entry| entry.into_path()),
            );
        } else {
            found.push(path.clone());
        }
    }
    found
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn read_notes_file(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        Ok(io::read_to_string(io::stdin())?)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Fill the session's notes and prompt options from the command line.
///
/// Records that fail to extract are skipped with a warning; a dictation
/// that cannot be transcribed is an error.
pub fn load_input(
    session: &mut Session,
    input: &InputArgs,
    transcriber: Option<&dyn Transcriber>,
) -> Result<()> {
    if let Some(notes) = &input.notes {
        session.notes_mut().append(notes);
    }
    if let Some(path) = &input.notes_file {
        let text = read_notes_file(path)?;
        session.notes_mut().append_block(text.trim_end());
    }

    let extractor = PdfExtractor::new();
    for path in collect_pdfs(&input.pdfs) {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let merged: Result<MergeOutcome> = fs::read(&path)
            .map_err(Into::into)
            .and_then(|bytes| Ok(session.merge_document(&bytes, name.as_deref(), &extractor)?));
        match merged {
            Ok(MergeOutcome::Merged { chars }) => {
                info!(path = %path.display(), chars, "Merged record");
            }
            Ok(MergeOutcome::AlreadyMerged) => {
                info!(path = %path.display(), "Duplicate record skipped");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Record skipped");
                eprintln!("Skipped {}: {}", path.display(), err.friendly_message());
            }
        }
    }

    if let Some(path) = &input.audio {
        let transcriber = transcriber.ok_or(ConfigError::MissingApiKey)?;
        let clip = AudioClip::from_path(path)?;
        let chars = session.append_transcript(&clip, transcriber)?;
        info!(path = %path.display(), chars, "Dictation transcribed");
    }

    if let Some(path) = &input.history_style {
        session.set_history_style(Some(fs::read_to_string(path)?));
    }

    Ok(())
}

/// Generate sections and print them (or the whole session as JSON).
pub fn generate(config: &Config, input: &InputArgs, sections: &[SectionKind], json: bool) -> Result<()> {
    let client = GeminiClient::from_config(config)?;
    let mut session = session_from_config(config);
    load_input(&mut session, input, Some(&client))?;

    let kinds = if sections.is_empty() {
        SectionKind::ALL.to_vec()
    } else {
        sections.to_vec()
    };
    info!(model = %session.model(), sections = kinds.len(), "Generating");
    let run = session.generate_sections(&kinds, &client);

    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        for kind in &run.completed {
            println!("## {}", kind);
            println!("{}", session.content(*kind));
            println!();
        }
    }

    match run.failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Print the prompt a section would be generated from. Never calls the model
/// unless a dictation has to be transcribed first.
pub fn prompt(
    config: &Config,
    section: SectionKind,
    input: &InputArgs,
    prior: &[(SectionKind, PathBuf)],
) -> Result<()> {
    let transcriber = match input.audio {
        Some(_) => Some(GeminiClient::from_config(config)?),
        None => None,
    };
    let mut session = session_from_config(config);
    load_input(
        &mut session,
        input,
        transcriber.as_ref().map(|c| c as &dyn Transcriber),
    )?;
    for (kind, path) in prior {
        session.set_content(*kind, fs::read_to_string(path)?.trim());
    }

    print!("{}", session.prompt_for(section));
    Ok(())
}

/// Print the text extracted from a PDF, or from each PDF in a directory.
pub fn extract(path: &Path) -> Result<()> {
    let extractor = PdfExtractor::new();
    if !path.is_dir() {
        println!("{}", extractor.extract_file(path)?);
        return Ok(());
    }

    let files = collect_pdfs(&[path.to_path_buf()]);
    if files.is_empty() {
        println!("No PDF files under {}", path.display());
    }
    for file in files {
        match extractor.extract_file(&file) {
            Ok(text) => {
                println!("=== {} ===", file.display());
                println!("{}", text);
                println!();
            }
            Err(err) => {
                warn!(path = %file.display(), error = %err, "Extraction failed");
                eprintln!("Skipped {}: {}", file.display(), err);
            }
        }
    }
    Ok(())
}

/// Show the pipeline order and recommended prerequisites.
pub fn list_sections() -> Result<()> {
    println!("{:<3} {:<10} {:<28} Uses", "#", "Key", "Section");
    println!("{:-<60}", "");
    for kind in SectionKind::ALL {
        let uses: Vec<_> = kind.prerequisites().iter().map(|k| k.key()).collect();
        let uses = if uses.is_empty() {
            "notes".to_string()
        } else {
            format!("notes, {}", uses.join(", "))
        };
        println!("{:<3} {:<10} {:<28} {}", kind.position(), kind.key(), kind.label(), uses);
    }
    Ok(())
}

/// Show supported models, marking the configured one.
pub fn list_models(config: &Config) -> Result<()> {
    for model in ModelRegistry::all() {
        let marker = if model.id == config.model.as_str() { "*" } else { " " };
        let default = if model.id == DEFAULT_MODEL { " (default)" } else { "" };
        println!("{} {:<24} {}{}", marker, model.id, model.description, default);
    }
    if !ModelRegistry::is_known(&config.model) {
        println!("* {:<24} (custom)", config.model.as_str());
    }
    Ok(())
}

/// Confirm the configured key is accepted by the model API.
pub fn check_key(config: &Config) -> Result<()> {
    let client = GeminiClient::from_config(config)?;
    client.validate_api_key()?;
    println!("API key accepted by {}", client.base_url());
    Ok(())
}

/// Run the interactive shell on stdin/stdout.
pub fn shell(config: &Config) -> Result<()> {
    let mut shell = Shell::from_config(config.clone());
    shell.run(io::stdin().lock(), io::stdout())?;
    Ok(())
}
