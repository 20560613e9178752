#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::implicit_clone,
    clippy::map_unwrap_or,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unnecessary_lazy_evaluations,
    clippy::unused_self
)]

use clap::Subcommand;
use serde::{Deserialize, Serialize};

pub mod agents;
pub mod config;
pub mod gateway;
pub mod memory;
pub mod model;
pub mod prompts;
pub mod routing;

pub use config::Config;

/// Memory management subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemoryCommands {
    /// List memory collections on disk
    List,
    /// Print every record in a collection as JSON
    Show {
        /// Collection name (file stem under the memory directory)
        name: String,
    },
    /// Append a record to a collection
    #[command(long_about = "\
Append a record to a memory collection.

Records are stored as JSON objects with a type tag and a text field. \
The collection file is created on first use.

Examples:
  policygen memory add laws 'PIPL requires separate consent for sensitive data'
  policygen memory add style 'Prefer short sentences' --kind guideline")]
    Add {
        /// Collection name
        name: String,
        /// Record text
        text: String,
        /// Record type tag
        #[arg(long, default_value = "note")]
        kind: String,
    },
    /// Search a collection for records containing the query text
    Search {
        /// Collection name
        name: String,
        /// Case-insensitive substring to look for
        query: String,
    },
    /// Reset a collection to the empty list
    Clear {
        /// Collection name
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
