use std::path::PathBuf;

use clap::{ArgAction, Parser};
use dynmenu::config::{ColorOverrides, Overrides};

#[derive(Parser, Debug)]
#[command(
    name = "dynmenu",
    about = "Filter lines from stdin interactively and print the chosen one",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version")]
    pub display_version: bool,

    /// Draw the menu at the bottom of the screen
    #[arg(short = 'b', long)]
    pub bottom: bool,

    /// Match items case-insensitively
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// List items vertically in the given number of rows
    #[arg(short = 'l', long, value_name = "LINES")]
    pub lines: Option<usize>,

    /// Prompt shown left of the input
    #[arg(short = 'p', long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Start with this query already typed
    #[arg(short = 'q', long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Characters that separate words for word-wise movement and deletion
    #[arg(long, value_name = "CHARS")]
    pub word_delimiters: Option<String>,

    /// Normal background color
    #[arg(long = "nb", value_name = "COLOR")]
    pub normal_bg: Option<String>,

    /// Normal foreground color
    #[arg(long = "nf", value_name = "COLOR")]
    pub normal_fg: Option<String>,

    /// Selected background color
    #[arg(long = "sb", value_name = "COLOR")]
    pub selected_bg: Option<String>,

    /// Selected foreground color
    #[arg(long = "sf", value_name = "COLOR")]
    pub selected_fg: Option<String>,

    /// Background of items already printed with Ctrl+Enter
    #[arg(long = "ob", value_name = "COLOR")]
    pub out_bg: Option<String>,

    /// Foreground of items already printed with Ctrl+Enter
    #[arg(long = "of", value_name = "COLOR")]
    pub out_fg: Option<String>,

    /// Load configuration from a specific file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Write logs to a file
    #[arg(long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (repeat for more detail)
    #[arg(long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            case_insensitive: self.ignore_case.then_some(true),
            lines: self.lines,
            prompt: self.prompt.clone(),
            bottom: self.bottom.then_some(true),
            initial_query: self.query.clone(),
            word_delimiters: self.word_delimiters.clone(),
            colors: ColorOverrides {
                normal_fg: self.normal_fg.clone(),
                normal_bg: self.normal_bg.clone(),
                selected_fg: self.selected_fg.clone(),
                selected_bg: self.selected_bg.clone(),
                out_fg: self.out_fg.clone(),
                out_bg: self.out_bg.clone(),
            },
        }
    }
}
