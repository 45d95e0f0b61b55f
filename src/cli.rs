use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fileshelf")]
#[command(author, version, about = "Telegram file distribution bot with a web admin panel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot listener and the web panel together (default)
    Run,

    /// Run only the bot listener
    Bot,

    /// Run only the web admin panel
    Web,

    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
