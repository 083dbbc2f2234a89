use clap::Parser;

use crate::analysis::DisplayConfig;

#[derive(Parser, Debug)]
#[command(name = "pptx-weigh")]
#[command(version)]
#[command(about = "Show where the bytes go inside a PowerPoint (.pptx) file", long_about = None)]
#[command(after_help = "Examples:\n  \
  pptx-weigh talk.pptx                 largest images in talk.pptx\n  \
  pptx-weigh -a -n 100 talk.pptx       the 100 largest files of any kind\n  \
  pptx-weigh -p ppt/media/image3.png -o image3.png talk.pptx\n  \
  pptx-weigh https://example.com/deck.pptx   inspect a remote file via Range requests\n  \
  pptx-weigh                           interactive session")]
pub struct Cli {
    /// Presentation path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Number of files to list (1-500)
    #[arg(short = 'n', long = "limit", value_name = "N", default_value_t = DisplayConfig::DEFAULT_FILES as i64, allow_negative_numbers = true)]
    pub limit: i64,

    /// Hide images from the file list
    #[arg(long)]
    pub no_images: bool,

    /// Include slide XML in the file list
    #[arg(long)]
    pub slides: bool,

    /// Include every other category in the file list
    #[arg(long)]
    pub other: bool,

    /// Include all categories in the file list
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the content of one archive entry instead of a report
    #[arg(short = 'p', long, value_name = "ENTRY")]
    pub preview: Option<String>,

    /// Destination for --preview (default: stdout)
    #[arg(short = 'o', long, value_name = "OUT", requires = "preview")]
    pub output: Option<String>,

    /// Start an interactive session
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// More log output (-vv for debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn display_config(&self) -> DisplayConfig {
        let mut config = DisplayConfig {
            show_images: self.all || !self.no_images,
            show_slides: self.all || self.slides,
            show_other_categories: self.all || self.other,
            ..DisplayConfig::default()
        };
        config.set_limit(self.limit);
        config
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive || self.file.is_none()
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        }
    }
}
