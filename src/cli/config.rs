// CLI configuration
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// oxid3 - ID3v2 tag CLI tool
#[derive(Parser, Debug)]
#[command(name = "oxid3")]
#[command(about = "Read and edit ID3v2 tags in MP3 files", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read tags from MP3 file(s)
    Read {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Fields to display (comma-separated, e.g. "title,artist")
        #[arg(long)]
        fields: Option<String>,

        /// Include every frame, not just the summary
        #[arg(long)]
        frames: bool,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write fields to an MP3 file
    Write {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: String,

        /// JSON object of field names to values; null removes a field
        #[arg(short, long, required_unless_present = "from_file")]
        metadata: Option<String>,

        /// Read the JSON object from a file
        #[arg(long)]
        from_file: Option<String>,

        /// Tag version to save as (3 or 4)
        #[arg(long, value_parser = clap::value_parser!(u8).range(3..=4))]
        id3_version: Option<u8>,
    },

    /// Copy every frame from one file to others
    Copy {
        /// Source MP3 file
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Target MP3 file(s)
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },

    /// Batch process multiple files
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.mp3")
        #[arg(short, long, default_value = "*.mp3")]
        pattern: String,

        /// Operation to run on every file
        #[arg(value_enum)]
        operation: BatchOperation,

        /// Metadata JSON to write (required for write operation)
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Detect whether files carry an ID3v2 tag
    Detect {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Export cover art
    ExportCover {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output directory for cover images
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Cover index (for files with multiple pictures)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Set cover art
    SetCover {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Image file path
        #[arg(short, long)]
        image: String,

        /// MIME type (guessed from the extension if not specified)
        #[arg(short, long)]
        mime_type: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Remove cover art
    RemoveCover {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Remove the whole tag
    Strip {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Show file information
    Info {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// List every frame with its size
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Batch operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchOperation {
    Read,
    Write,
    Strip,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOperation::Read => write!(f, "read"),
            BatchOperation::Write => write!(f, "write"),
            BatchOperation::Strip => write!(f, "strip"),
        }
    }
}

impl Config {
    /// Split a comma-separated field list.
    pub fn parse_fields(fields: Option<&str>) -> Option<Vec<String>> {
        fields.map(|list| {
            list.split(',')
                .map(|field| field.trim().to_lowercase())
                .filter(|field| !field.is_empty())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_config_is_consistent() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_parse_read_command() {
        let config = Config::parse_from(["oxid3", "-f", "json", "read", "a.mp3", "--frames"]);
        assert_eq!(config.format, OutputFormat::Json);
        match config.command {
            Commands::Read { files, frames, .. } => {
                assert_eq!(files, vec!["a.mp3".to_string()]);
                assert!(frames);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_write_version_range() {
        assert!(Config::try_parse_from(["oxid3", "write", "a.mp3", "-m", "{}", "--id3-version", "2"]).is_err());
        assert!(Config::try_parse_from(["oxid3", "write", "a.mp3", "-m", "{}", "--id3-version", "3"]).is_ok());
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(
            Config::parse_fields(Some("Title, artist,,")),
            Some(vec!["title".to_string(), "artist".to_string()])
        );
        assert_eq!(Config::parse_fields(None), None);
    }
}
