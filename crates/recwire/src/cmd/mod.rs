use clap::{Args, Subcommand};
use std::path::PathBuf;

use recwire_codec::DEFAULT_CHUNK_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod version;

/// Length bound applied by the CLI unless `--max-len` says otherwise.
pub const DEFAULT_MAX_LEN: usize = 16 * 1024 * 1024;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one record from a JSON array of values.
    Encode(EncodeArgs),
    /// Decode one record from hex or a file.
    Decode(DecodeArgs),
    /// Bind a Unix socket and print every record received.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Comma-separated field types (bytes, u64, i64, f64, f32, bool, text).
    #[arg(long, short = 's', env = "RECWIRE_SCHEMA")]
    pub schema: String,
    /// Largest accepted length prefix for bytes and text fields.
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    pub max_len: usize,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// JSON array with one value per field.
    #[arg(long)]
    pub values: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Hex-encoded record.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the encoded record from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Exit after receiving N records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Bytes requested from the socket per read.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

impl SchemaArgs {
    pub fn registry(&self) -> recwire_codec::CodecRegistry {
        recwire_codec::CodecRegistry::with_config(recwire_codec::RegistryConfig {
            max_bytes_len: self.max_len,
            ..Default::default()
        })
    }
}
