//! Interactive shell
//!
//! A line-oriented front end over one [`Session`]. Each line is one command
//! and at most one state change; errors are printed with their suggestions
//! and the session carries on.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::{ConfigError, ModelClientError, ResidentError};
use crate::ingest::{AudioClip, PdfExtractor, TextExtractor};
use crate::model::{
    CompletionRequest, GeminiClient, ModelClient, ModelId, ModelRegistry, Transcriber,
};
use crate::pipeline::SectionKind;
use crate::session::{MergeOutcome, SectionMode, Session};

const HELP: &str = "\
Notes
  notes                    show the notes
  append <text>            append text to the notes as typed
  replace <text>           replace the notes
  clear                    empty the notes
  pdf <path>               merge a PDF record into the notes
  dictate <wav>            transcribe a recording into the notes
Sections
  gen <section|all>        generate a section (or every section in order)
  show [section]           print one section, or all of them
  open <section>           switch a section to edit view
  edit <section> <text>    set the edit field of a section in edit view
  copy <section>           commit the edit field and switch to copy view
  prompt <section>         print the prompt a generation would send
  status                   pipeline progress and recommended next step
Settings
  model [id|default]       show or select the model
  models                   list supported models
  style <text>|reset       replace or restore the present illness guidance
  key <api key>            set the API key for this session
  json                     print the session as JSON
  help | quit";

/// Stand-in client used until an API key is configured
struct UnconfiguredClient;

impl UnconfiguredClient {
    fn error() -> ModelClientError {
        ModelClientError::auth("No API key configured. Use `key <api key>` or set GEMINI_API_KEY")
    }
}

impl ModelClient for UnconfiguredClient {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn complete(&self, _request: &CompletionRequest) -> Result<String, ModelClientError> {
        Err(Self::error())
    }
}

impl Transcriber for UnconfiguredClient {
    fn transcribe(&self, _clip: &AudioClip, _model: &ModelId) -> Result<String, ModelClientError> {
        Err(Self::error())
    }
}

/// Whether the shell should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Quit,
}

pub struct Shell {
    session: Session,
    client: Box<dyn ModelClient>,
    transcriber: Box<dyn Transcriber>,
    extractor: Box<dyn TextExtractor>,
    config: Option<Config>,
}

impl Shell {
    /// Shell backed by the Gemini API, or an unconfigured client without a key
    pub fn from_config(config: Config) -> Self {
        let session = Session::new()
            .with_model(config.model.as_str())
            .with_structured_output(config.structured_output);
        let mut shell = Self::new(
            session,
            Box::new(UnconfiguredClient),
            Box::new(UnconfiguredClient),
            Box::new(PdfExtractor::new()),
        );
        if let Ok(client) = GeminiClient::from_config(&config) {
            shell.client = Box::new(client.clone());
            shell.transcriber = Box::new(client);
        }
        shell.config = Some(config);
        shell
    }

    pub fn new(
        session: Session,
        client: Box<dyn ModelClient>,
        transcriber: Box<dyn Transcriber>,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            session,
            client,
            transcriber,
            extractor,
            config: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "LazyResident shell. Type `help` for commands.")?;
        write!(out, "> ")?;
        out.flush()?;
        for line in input.lines() {
            if self.execute(&line?, &mut out)? == ShellFlow::Quit {
                break;
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Run one command line
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<ShellFlow> {
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        // `text` keeps everything after the single separator for note edits
        let (command, text) = match line.split_once(char::is_whitespace) {
            Some((command, text)) => (command, text),
            None => (line.trim_end(), ""),
        };
        let rest = text.trim();

        match command.to_lowercase().as_str() {
            "" => {}
            "help" | "?" => writeln!(out, "{}", HELP)?,
            "quit" | "exit" => return Ok(ShellFlow::Quit),

            "notes" => self.show_notes(out)?,
            "append" => {
                self.session.notes_mut().append(text);
                writeln!(out, "Notes: {} characters", self.session.notes().len())?;
            }
            "replace" => {
                self.session.notes_mut().replace(text);
                writeln!(out, "Notes: {} characters", self.session.notes().len())?;
            }
            "clear" => {
                self.session.notes_mut().clear();
                writeln!(out, "Notes cleared")?;
            }
            "pdf" => self.merge_pdf(rest, out)?,
            "dictate" => self.dictate(rest, out)?,

            "gen" | "generate" => self.generate(rest, out)?,
            "show" => self.show(rest, out)?,
            "open" => {
                if let Some(kind) = self.section_arg(rest, out)? {
                    self.session.set_mode(kind, SectionMode::Edit);
                    writeln!(out, "{} in edit view", kind)?;
                    writeln!(out, "{}", self.session.section(kind).edit_field())?;
                }
            }
            "edit" => {
                let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if let Some(kind) = self.section_arg(name, out)? {
                    match self.session.edit_section(kind, text.trim()) {
                        Ok(()) => writeln!(out, "{} edit field updated; `copy {}` to commit", kind, kind.key())?,
                        Err(e) => report(out, &e.into())?,
                    }
                }
            }
            "copy" => {
                if let Some(kind) = self.section_arg(rest, out)? {
                    let committed = match self.session.section(kind).mode() {
                        SectionMode::Copy => Ok(()),
                        SectionMode::Edit => self.session.commit_edit(kind),
                    };
                    match committed {
                        Ok(()) => {
                            writeln!(out, "{} (copy view):", kind)?;
                            writeln!(out, "{}", self.session.content(kind))?;
                        }
                        Err(e) => report(out, &e.into())?,
                    }
                }
            }
            "prompt" => {
                if let Some(kind) = self.section_arg(rest, out)? {
                    writeln!(out, "{}", self.session.prompt_for(kind))?;
                }
            }
            "status" => self.status(out)?,

            "model" => {
                if rest.eq_ignore_ascii_case("default") {
                    self.session.select_model("");
                } else if !rest.is_empty() {
                    self.session.select_model(rest);
                }
                let model = self.session.model();
                let note = if ModelRegistry::is_known(model) { "" } else { " (not in the supported list)" };
                writeln!(out, "Model: {}{}", model, note)?;
            }
            "models" => {
                for info in ModelRegistry::all() {
                    let marker = if info.id == self.session.model().as_str() { "*" } else { " " };
                    writeln!(out, "{} {:<24} {}", marker, info.id, info.description)?;
                }
            }
            "style" => {
                if rest.eq_ignore_ascii_case("reset") || rest.is_empty() {
                    self.session.set_history_style(None);
                    writeln!(out, "Present illness guidance restored")?;
                } else {
                    self.session.set_history_style(Some(rest.to_string()));
                    writeln!(out, "Present illness guidance replaced")?;
                }
            }
            "key" => self.set_key(rest, out)?,
            "json" => match serde_json::to_string_pretty(&self.session.snapshot()) {
                Ok(json) => writeln!(out, "{}", json)?,
                Err(e) => report(out, &e.into())?,
            },

            other => writeln!(out, "Unknown command '{}'. Type `help` for commands.", other)?,
        }
        Ok(ShellFlow::Continue)
    }

    fn section_arg<W: Write>(&self, raw: &str, out: &mut W) -> io::Result<Option<SectionKind>> {
        match raw.trim().parse::<SectionKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(e) => {
                report(out, &e.into())?;
                Ok(None)
            }
        }
    }

    fn show_notes<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.session.notes().is_blank() {
            writeln!(out, "(no notes)")
        } else {
            writeln!(out, "{}", self.session.notes().read())
        }
    }

    fn merge_pdf<W: Write>(&mut self, path: &str, out: &mut W) -> io::Result<()> {
        let path = Path::new(path);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return report(out, &e.into()),
        };
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        match self
            .session
            .merge_document(&bytes, name.as_deref(), self.extractor.as_ref())
        {
            Ok(MergeOutcome::Merged { chars }) => writeln!(out, "Merged {} characters into the notes", chars),
            Ok(MergeOutcome::AlreadyMerged) => writeln!(out, "Already merged; notes unchanged"),
            Err(e) => report(out, &e.into()),
        }
    }

    fn dictate<W: Write>(&mut self, path: &str, out: &mut W) -> io::Result<()> {
        let clip = match AudioClip::from_path(path) {
            Ok(clip) => clip,
            Err(e) => return report(out, &e.into()),
        };
        writeln!(out, "Transcribing {:.1}s of audio...", clip.duration_secs())?;
        match self.session.append_transcript(&clip, self.transcriber.as_ref()) {
            Ok(chars) => writeln!(out, "Appended {} characters to the notes", chars),
            Err(e) => report(out, &e.into()),
        }
    }

    fn generate<W: Write>(&mut self, target: &str, out: &mut W) -> io::Result<()> {
        if target.eq_ignore_ascii_case("all") {
            let run = self.session.generate_pipeline(self.client.as_ref());
            for kind in &run.completed {
                print_section(out, *kind, self.session.content(*kind))?;
            }
            if let Some(err) = run.failure {
                report(out, &err.into())?;
            }
            return Ok(());
        }

        let Some(kind) = self.section_arg(target, out)? else {
            return Ok(());
        };
        let state = self.session.pipeline_state();
        if let Some(readiness) = state.readiness(kind).filter(|r| !r.is_ready()) {
            let missing: Vec<_> = readiness.missing.iter().map(|k| k.label()).collect();
            writeln!(out, "Note: {} usually follows {}", kind, missing.join(", "))?;
        }
        writeln!(out, "Generating {} with {}...", kind, self.session.model())?;
        match self.session.generate(kind, self.client.as_ref()) {
            Ok(content) => {
                let content = content.to_string();
                print_section(out, kind, &content)
            }
            Err(e) => report(out, &e.into()),
        }
    }

    fn show<W: Write>(&self, target: &str, out: &mut W) -> io::Result<()> {
        if target.is_empty() {
            for kind in SectionKind::ALL {
                print_section(out, kind, self.session.content(kind))?;
            }
            return Ok(());
        }
        if let Some(kind) = self.section_arg(target, out)? {
            print_section(out, kind, self.session.content(kind))?;
        }
        Ok(())
    }

    fn status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let state = self.session.pipeline_state();
        writeln!(out, "Model: {}", self.session.model())?;
        writeln!(out, "Notes: {} characters", self.session.notes().len())?;
        for readiness in &state.sections {
            let mark = if readiness.has_content { "x" } else { " " };
            let mode = self.session.section(readiness.kind).mode().as_str();
            writeln!(out, "[{}] {}. {} ({})", mark, readiness.kind.position(), readiness.kind, mode)?;
        }
        match state.next {
            Some(next) => writeln!(out, "Next: {}", next),
            None => writeln!(out, "All sections generated"),
        }
    }

    fn set_key<W: Write>(&mut self, key: &str, out: &mut W) -> io::Result<()> {
        let Some(config) = self.config.clone() else {
            return writeln!(out, "This shell does not manage API keys");
        };
        if key.trim().is_empty() {
            let err = ConfigError::InvalidValue {
                key: "api key".to_string(),
                value: key.to_string(),
                expected: "a non-empty API key".to_string(),
            };
            return report(out, &err.into());
        }
        let config = config.with_api_key(Some(key.to_string()));
        match GeminiClient::from_config(&config) {
            Ok(client) => {
                self.client = Box::new(client.clone());
                self.transcriber = Box::new(client);
                self.config = Some(config);
                writeln!(out, "API key set for this session")
            }
            Err(e) => report(out, &e.into()),
        }
    }
}

fn print_section<W: Write>(out: &mut W, kind: SectionKind, content: &str) -> io::Result<()> {
    writeln!(out, "## {}", kind)?;
    if content.trim().is_empty() {
        writeln!(out, "(empty)")?;
    } else {
        writeln!(out, "{}", content)?;
    }
    writeln!(out)
}

/// Print an error the way the clinician should see it
pub fn report<W: Write>(out: &mut W, err: &ResidentError) -> io::Result<()> {
    writeln!(out, "Error [{}]: {}", err.error_code(), err.friendly_message())?;
    for suggestion in err.recovery_suggestions() {
        writeln!(out, "  - {}", suggestion)?;
    }
    Ok(())
}
