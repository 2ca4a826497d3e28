use chatguard_core::LanguageCode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatguard")]
#[command(
    author,
    version,
    about = "Multilingual abuse detection for chat messages"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Engine configuration file
    #[arg(short, long, global = true, env = "CHATGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keyword list directory (overrides the configuration)
    #[arg(short, long, global = true, env = "CHATGUARD_LISTS")]
    pub lists: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a message and print the result as JSON
    Classify {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Only match these languages (comma-separated codes, e.g. eng,hin)
        #[arg(long, value_delimiter = ',', value_parser = parse_language)]
        languages: Option<Vec<LanguageCode>>,
    },

    /// Merge a language,word,meaning,severity dataset into the lists
    Import {
        /// CSV or TSV file
        dataset: PathBuf,
    },

    /// Keep each keyword only in its primary language
    Dedup {
        /// JSON map of keyword to language code
        primary_map: PathBuf,
    },

    /// Show per-language keyword counts and load status
    Summary {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSON-lines transcript through the moderation engine
    Replay {
        /// One message per line: {"sender", "to" | "group", "text", "at"?}
        transcript: PathBuf,

        /// JSON map of user to trusted contacts
        #[arg(long)]
        contacts: Option<PathBuf>,
    },
}

fn parse_language(s: &str) -> Result<LanguageCode, String> {
    let language: LanguageCode = s.trim().parse()?;
    if language.is_supported() {
        Ok(language)
    } else {
        Err(format!("unsupported language: {s}"))
    }
}
