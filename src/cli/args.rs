//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Ishikawa (fishbone) diagram editor: cause trees, spine layout, remote store
#[derive(Parser, Debug)]
#[command(name = "fishbone")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Diagram store base URL (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List diagrams with bone counts
    List {
        /// Case-insensitive title filter
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a diagram and its bone tree
    Show {
        /// Diagram id
        id: String,
    },

    /// Create an empty diagram
    Create {
        /// Diagram title
        title: String,
    },

    /// Delete a diagram
    Delete {
        /// Diagram id
        id: String,
    },

    /// Change a diagram title
    Title {
        /// Diagram id
        id: String,
        /// New title
        title: String,
    },

    /// Edit the bones of a diagram
    Bone {
        #[command(subcommand)]
        command: BoneCommands,
    },

    /// Render the diagram layout as SVG (or JSON geometry)
    Render {
        /// Diagram id
        id: String,
        /// Canvas width (default from config)
        #[arg(long)]
        width: Option<f64>,
        /// Canvas height (default from config)
        #[arg(long)]
        height: Option<f64>,
        /// Drag the view by DX DY
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_hyphen_values = true)]
        pan: Option<Vec<f64>>,
        /// Wheel notches, positive zooms in
        #[arg(long, allow_hyphen_values = true)]
        zoom: Option<i32>,
        /// Emit layout geometry as JSON instead of SVG
        #[arg(long)]
        json: bool,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoneCommands {
    /// Add a main bone, or a sub bone with --parent
    Add {
        /// Diagram id
        diagram: String,
        /// Parent bone id
        #[arg(short, long)]
        parent: Option<String>,
        /// Bone name (default from config)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Rename a bone
    Rename {
        /// Diagram id
        diagram: String,
        /// Bone id
        bone: String,
        /// New name
        name: String,
    },

    /// Delete a bone and everything below it
    Delete {
        /// Diagram id
        diagram: String,
        /// Bone id
        bone: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print config file locations
    Path,
}
