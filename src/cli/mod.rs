//! CLI Module
//!
//! Command-line front end: one-shot commands plus an interactive shell.

pub mod commands;
pub mod shell;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pipeline::SectionKind;

/// LazyResident - drafts admission-note sections from rough clinical notes
#[derive(Parser, Debug)]
#[command(name = "lazyresident")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Gemini API key (overrides GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model to generate with (overrides LAZYRESIDENT_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Request timeout in milliseconds (overrides LAZYRESIDENT_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Ask for plain text replies instead of schema-constrained JSON
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the notes come from
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Notes text
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Read notes from a file (`-` for stdin)
    #[arg(short = 'f', long)]
    pub notes_file: Option<PathBuf>,

    /// PDF record to merge into the notes; directories are searched for PDFs
    #[arg(long = "pdf")]
    pub pdfs: Vec<PathBuf>,

    /// WAV dictation to transcribe into the notes
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// File with replacement present illness writing guidance
    #[arg(long)]
    pub history_style: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate note sections
    #[command(name = "generate")]
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Sections to generate (default: all, in pipeline order)
        #[arg(short, long = "section")]
        sections: Vec<SectionKind>,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt a section would send, without calling the model
    #[command(name = "prompt")]
    Prompt {
        /// Section to build the prompt for
        section: SectionKind,

        #[command(flatten)]
        input: InputArgs,

        /// Earlier section content as SECTION=FILE, e.g. history=hx.txt
        #[arg(long = "prior", value_parser = parse_prior)]
        prior: Vec<(SectionKind, PathBuf)>,
    },

    /// Print the text extracted from PDF records
    #[command(name = "extract")]
    Extract {
        /// PDF file or directory of PDFs
        path: PathBuf,
    },

    /// List the sections in pipeline order
    #[command(name = "sections")]
    Sections,

    /// List supported models
    #[command(name = "models")]
    Models,

    /// Check the API key against the model API
    #[command(name = "check-key")]
    CheckKey,

    /// Interactive session
    #[command(name = "shell")]
    Shell,
}

fn parse_prior(raw: &str) -> Result<(SectionKind, PathBuf), String> {
    let (kind, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION=FILE, got '{}'", raw))?;
    let kind = kind.parse::<SectionKind>().map_err(|e| e.to_string())?;
    if path.trim().is_empty() {
        return Err(format!("missing file for {}", kind.key()));
    }
    Ok((kind, PathBuf::from(path.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prior() {
        assert_eq!(
            parse_prior("hx=history.txt"),
            Ok((SectionKind::History, PathBuf::from("history.txt")))
        );
        assert!(parse_prior("history").is_err());
        assert!(parse_prior("discharge=x.txt").is_err());
        assert!(parse_prior("cc=").is_err());
    }

    #[test]
    fn test_cli_parses_sections() {
        let cli = Cli::try_parse_from([
            "lazyresident",
            "generate",
            "--notes",
            "Patient reports headache for 3 days.",
            "-s",
            "history",
            "-s",
            "cc",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate { sections, input, .. }) => {
                assert_eq!(sections, vec![SectionKind::History, SectionKind::ChiefComplaint]);
                assert_eq!(input.notes.as_deref(), Some("Patient reports headache for 3 days."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
