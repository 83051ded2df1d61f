use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod pack;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the receiver pipe and save incoming messages.
    Listen(ListenArgs),
    /// Build the wire bytes for one transmission (for local testing).
    Pack(PackArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Pack(args) => pack::run(args),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Named pipe the receiver writes API data into.
    #[arg(default_value = "/tmp/skyfeed/api")]
    pub pipe: PathBuf,
    /// GnuPG home directory holding the local decryption identity.
    #[arg(long, short = 'g', default_value = ".gnupg")]
    pub gnupghome: PathBuf,
    /// Directory to save incoming messages into.
    #[arg(long, default_value = "downloads")]
    pub download_dir: PathBuf,
    /// Save decrypted data as-is, ignoring the application message header.
    #[arg(long, conflicts_with = "plaintext")]
    pub save_raw: bool,
    /// Treat every transmission as plaintext; skip decryption entirely.
    #[arg(long, conflicts_with = "save_raw")]
    pub plaintext: bool,
    /// Exit after saving N messages.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// File whose contents become the transmission payload.
    pub input: PathBuf,
    /// Where to write the framed wire bytes (file or pipe).
    #[arg(long, short = 'o')]
    pub output: PathBuf,
    /// Name carried in the message header. Default: the input file name.
    #[arg(long, conflicts_with = "raw")]
    pub name: Option<String>,
    /// Skip the message header; frame the payload bytes directly.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// GnuPG home directory to check.
    #[arg(long, short = 'g', default_value = ".gnupg")]
    pub gnupghome: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
