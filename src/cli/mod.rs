pub mod check;
pub mod completions;
pub mod inspect;
pub mod list;
pub mod render;

use clap::{ArgAction, Parser, Subcommand};

/// arlunio - Compose images from mask and colour definitions
#[derive(Parser, Debug)]
#[command(name = "arlunio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in definitions in dependency order
    List(list::ListArgs),

    /// Show the inputs and attributes of a definition
    Inspect(inspect::InspectArgs),

    /// Check the built-in definitions for problems
    Check(check::CheckArgs),

    /// Evaluate a mask definition and write it as a PNG
    Render(render::RenderArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
