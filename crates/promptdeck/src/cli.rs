use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "promptdeck")]
#[command(author, version, about)]
#[command(long_about = "A card-swipe deck for conversation prompts and actions.\n\n\
    Questions come from a spreadsheet CSV export or a local CSV file and are dealt\n\
    so that no category repeats for long.\n\n\
    Examples:\n  \
    promptdeck                           Launch with the configured source\n  \
    promptdeck questions.csv --windowed  Launch a local file in a window\n  \
    promptdeck order --json              Print a balanced sequence as JSON\n  \
    promptdeck categories --pick         Choose the default categories")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Spreadsheet CSV URL or local CSV file (overrides config)
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start in questions-only mode
    #[arg(long, global = false)]
    pub questions_only: bool,

    /// Only show these categories (repeatable)
    #[arg(long = "category", value_name = "NAME", global = false)]
    pub categories: Vec<String>,

    /// Show the intro card first
    #[arg(long, global = false)]
    pub intro: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categories and their prompt counts
    Categories {
        /// Spreadsheet CSV URL or local CSV file
        source: Option<String>,

        /// Interactively choose the default category selection
        #[arg(long)]
        pick: bool,
    },

    /// Print a balanced prompt sequence without opening a window
    Order {
        /// Spreadsheet CSV URL or local CSV file
        source: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Questions only, no actions
    #[arg(long)]
    pub questions_only: bool,

    /// Only include these categories (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.source, defaults.mode, defaults.categories)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Filter used by tracing-subscriber unless RUST_LOG is set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Categories { source, pick }) => {
                crate::commands::categories::run(source.as_deref(), pick)
            }
            Some(Commands::Order {
                source,
                filter,
                json,
            }) => crate::commands::order::run(source.as_deref(), &filter, json),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::banner::print_banner_with_version();
                Ok(())
            }
            None => crate::app::run(crate::app::LaunchOptions {
                source: self.source,
                windowed: self.windowed,
                questions_only: self.questions_only,
                categories: self.categories,
                intro: self.intro,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_launch_flags() {
        let cli = Cli::parse_from([
            "promptdeck",
            "questions.csv",
            "--windowed",
            "--category",
            "A",
            "--category",
            "B",
        ]);
        assert_eq!(cli.source.as_deref(), Some("questions.csv"));
        assert!(cli.windowed);
        assert_eq!(cli.categories, vec!["A", "B"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_order_subcommand() {
        let cli = Cli::parse_from(["promptdeck", "order", "--json", "--questions-only", "-v"]);
        match cli.command {
            Some(Commands::Order { json, ref filter, .. }) => {
                assert!(json);
                assert!(filter.questions_only);
            }
            _ => panic!("expected order command"),
        }
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let cli = Cli::parse_from(["promptdeck", "-q", "-vv", "version"]);
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
