use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ipts_types::{Codec, ContentId};

#[derive(Parser)]
#[command(
    name = "ipts",
    about = "Client for a content-addressed time-series database",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file; missing is fine, defaults apply.
    #[arg(long, global = true, default_value = "ipts.toml")]
    pub config: PathBuf,

    /// Store node API base URL, overriding the config file.
    #[arg(long, global = true)]
    pub api: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Put a document, stored as DAG-CBOR
    Put(PutArgs),
    /// Resolve <cid>[/field...] and print the node
    Get(GetArgs),
    /// Print the raw bytes of a block
    Block(BlockArgs),
    /// Decode the float vector at a path inside a block
    Floats(FloatsArgs),
    /// Put a DAG-JSON file and read its fields/values back as floats
    Pipeline(PipelineArgs),
    /// Build a one-record head record from a schema, optionally storing it
    HeadRecord(HeadRecordArgs),
    /// Create a table from a schema
    Create(CreateArgs),
    /// Insert one record and print the new root
    Insert(InsertArgs),
    /// Select rows from a table
    Select(SelectArgs),
}

#[derive(Args)]
pub struct PutArgs {
    /// Input file (stdin when omitted or "-")
    pub file: Option<PathBuf>,
    #[arg(long, default_value = "dag-json")]
    pub input_codec: Codec,
}

#[derive(Args)]
pub struct GetArgs {
    pub path: String,
}

#[derive(Args)]
pub struct BlockArgs {
    pub id: ContentId,
}

#[derive(Args)]
pub struct FloatsArgs {
    pub id: ContentId,
    #[arg(default_value = "fields/values")]
    pub path: String,
    /// Drop a trailing partial value instead of failing
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Args)]
pub struct PipelineArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Args)]
pub struct HeadRecordArgs {
    /// DAG-JSON schema file
    pub schema: PathBuf,
    /// DAG-JSON record (stdin when omitted or "-")
    pub record: Option<PathBuf>,
    /// Store the head record as a DAG-CBOR block
    #[arg(long)]
    pub put: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    /// DAG-JSON schema (stdin when omitted or "-")
    pub schema: Option<PathBuf>,
}

#[derive(Args)]
pub struct InsertArgs {
    pub root: ContentId,
    /// DAG-JSON record (stdin when omitted or "-")
    pub record: Option<PathBuf>,
}

#[derive(Args)]
pub struct SelectArgs {
    pub root: ContentId,
    /// Fields to select; all fields when none are given
    pub fields: Vec<String>,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
