use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::info;

use crate::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_DIR_CAPACITY};
use crate::driver::file_drive::FileDrive;
use crate::driver::DeviceDriver;
use crate::ops::SimFS;
use crate::structure::superblock::Geometry;
use crate::util::error::{FsError, Result};

/// Simulated single-directory file system stored inside one host file.
///
/// Not safe for concurrent use: never run two commands against the same
/// container at the same time.
#[derive(Parser, Debug)]
#[command(name = "simfs", version, infer_subcommands = true)]
pub struct Cli {
    /// Container file holding the file system
    #[arg(short = 'f', long = "file", value_name = "CONTAINER")]
    pub file: PathBuf,

    /// More log output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Format the container. Destroys anything it already holds.
    #[command(name = "initfs")]
    InitFs {
        total_blocks: u32,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: u32,
        #[arg(long = "max-files", default_value_t = DEFAULT_DIR_CAPACITY)]
        max_files: u32,
    },
    #[command(flatten)]
    Mounted(MountedCommand),
}

/// Commands that run against an already formatted container.
#[derive(Subcommand, Debug, PartialEq)]
pub enum MountedCommand {
    /// List every file with its size and block count
    #[command(name = "printfs")]
    PrintFs,
    #[command(name = "createfile")]
    CreateFile { name: String },
    /// Print up to <LENGTH> bytes starting at <START>
    #[command(name = "readfile")]
    ReadFile {
        name: String,
        #[arg(allow_negative_numbers = true)]
        start: i64,
        length: u64,
    },
    /// Write <LENGTH> bytes read from stdin at <START>
    #[command(name = "writefile")]
    WriteFile {
        name: String,
        #[arg(allow_negative_numbers = true)]
        start: i64,
        length: usize,
    },
    #[command(name = "deletefile")]
    DeleteFile {
        name: String,
        /// Zero the file's blocks before releasing them
        #[arg(long)]
        scrub: bool,
    },
    /// Shrink or extend a file to exactly <SIZE> bytes
    #[command(name = "truncatefile")]
    TruncateFile { name: String, size: u64 },
    /// Show block and directory usage
    #[command(name = "info")]
    Info,
    /// Verify block ownership and free list consistency
    #[command(name = "check")]
    Check,
}

pub fn run<R: Read, W: Write>(cli: &Cli, input: &mut R, output: &mut W) -> Result<()> {
    match cli.command {
        Command::InitFs { total_blocks, block_size, max_files } => {
            let geometry = Geometry { block_size, total_blocks, dir_capacity: max_files };
            // validate first: creating the drive truncates the host file
            geometry.validate()?;
            SimFS::format(FileDrive::create(&cli.file)?, geometry)?;
            info!("Initialized {:?}", cli.file);
            Ok(())
        }
        Command::Mounted(ref command) => {
            let mut fs = SimFS::mount(FileDrive::open(&cli.file)?)?;
            execute(&mut fs, command, input, output)
        }
    }
}

/// Runs a command against an already mounted file system.
pub fn execute<A: DeviceDriver, R: Read, W: Write>(
    fs: &mut SimFS<A>,
    command: &MountedCommand,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    match command {
        MountedCommand::PrintFs => {
            for file in fs.list_files() {
                writeln!(output, "{}", file)?;
            }
        }
        MountedCommand::CreateFile { name } => fs.create_file(name)?,
        MountedCommand::ReadFile { name, start, length } => {
            let data = fs.read_file(name, *start, *length)?;
            output.write_all(&data)?;
            info!("Read {} bytes from {:?}", data.len(), name);
        }
        MountedCommand::WriteFile { name, start, length } => {
            // range is checked before stdin is read
            let size = fs.file_size(name)?;
            if *start < 0 || (*start as u64).saturating_add(*length as u64) > u32::MAX as u64 {
                return Err(FsError::InvalidRange { start: *start, size });
            }
            let mut data = Vec::new();
            input.take(*length as u64).read_to_end(&mut data)?;
            if data.len() < *length {
                return Err(FsError::ShortInput { expected: *length, got: data.len() });
            }
            fs.write_file(name, *start, &data)?;
        }
        MountedCommand::DeleteFile { name, scrub } => fs.delete_file(name, *scrub)?,
        MountedCommand::TruncateFile { name, size } => fs.truncate_file(name, *size)?,
        MountedCommand::Info => writeln!(output, "{}", fs.info())?,
        MountedCommand::Check => {
            let report = fs.check()?;
            writeln!(
                output,
                "ok: {} files, {} blocks in use, {} free",
                report.files, report.file_blocks, report.free_blocks
            )?;
        }
    }
    output.flush()?;
    Ok(())
}
