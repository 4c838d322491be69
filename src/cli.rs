use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "formfetch")]
#[command(about = "Issue authorized API requests and fill in forms against them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one request and print the resulting state
    Fetch {
        /// Path appended to the API base address
        #[arg(short, long)]
        path: String,

        /// HTTP method (get, post, put, patch, delete)
        #[arg(short, long, default_value = "get")]
        method: String,

        /// JSON object sent as the request body
        #[arg(short, long)]
        data: Option<String>,

        /// API base address (defaults to FORMFETCH_API_BASE)
        #[arg(long)]
        base: Option<String>,
    },

    /// Manage the persisted authorization token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Fill in a form in the terminal and submit it as a POST
    Form {
        /// Path the form is submitted to
        #[arg(short, long)]
        path: String,

        /// Field names, in display order
        #[arg(short, long = "field", default_values_t = vec!["name".to_string(), "email".to_string()])]
        fields: Vec<String>,

        /// Fields that must not be empty
        #[arg(short, long)]
        required: Vec<String>,

        /// API base address (defaults to FORMFETCH_API_BASE)
        #[arg(long)]
        base: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Store a token
    Set {
        token: String,
    },
    /// Print the stored token
    Show,
    /// Remove the stored token
    Clear,
}
