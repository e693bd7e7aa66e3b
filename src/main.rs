//! stegkit - hide messages in images, audio, frame sequences and text.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use stegkit::{Method, Stego, StegoConfig};

#[derive(Parser)]
#[command(name = "stegkit")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Hide and recover secret messages in carrier files",
    long_about = "Embeds messages in PNG/JPEG images (LSB, DCT, DWT), 16-bit mono WAV audio, PNG frame sequences and plain text (zero-width characters)."
)]
struct Cli {
    /// JSON configuration file overriding the transform settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct KeyArgs {
    /// Password or passphrase (prompted for when a method needs one)
    #[arg(long, conflicts_with = "key_hex")]
    password: Option<String>,

    /// Raw key material as hex
    #[arg(long, conflicts_with = "password")]
    key_hex: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many characters a carrier can hold
    Capacity {
        /// Carrier file or frame-sequence directory
        carrier: PathBuf,

        /// Embedding method (see `stegkit methods`)
        #[arg(long, short)]
        method: Method,

        /// Report the figure for a keyed (sealed) hide
        #[arg(long)]
        keyed: bool,
    },

    /// Hide a message in a carrier
    Hide {
        /// Carrier file or frame-sequence directory
        carrier: PathBuf,

        /// Embedding method
        #[arg(long, short)]
        method: Method,

        /// Message text
        #[arg(long, conflicts_with = "input")]
        message: Option<String>,

        /// Read the message from a file
        #[arg(long, conflicts_with = "message")]
        input: Option<PathBuf>,

        /// Output path (default: <output_root>/stego_<kind>/stego_<name>)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        key: KeyArgs,
    },

    /// Extract a hidden message
    Extract {
        /// Stego carrier
        carrier: PathBuf,

        /// Embedding method used to hide the message
        #[arg(long, short)]
        method: Method,

        /// Message length in characters, for unkeyed image/audio carriers
        #[arg(long)]
        length: Option<usize>,

        /// Write the message to a file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        key: KeyArgs,
    },

    /// List the available methods
    Methods,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => StegoConfig::load(path)?,
        None => StegoConfig::default(),
    };
    let stego = Stego::new(config)?;

    match cli.command {
        Commands::Capacity {
            carrier,
            method,
            keyed,
        } => cmd_capacity(&stego, &carrier, method, keyed),

        Commands::Hide {
            carrier,
            method,
            message,
            input,
            output,
            key,
        } => cmd_hide(&stego, &carrier, method, message, input, output, &key),

        Commands::Extract {
            carrier,
            method,
            length,
            output,
            key,
        } => cmd_extract(&stego, &carrier, method, length, output, &key),

        Commands::Methods => cmd_methods(),
    }
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            eprint!("{}", prompt);
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            Ok(password.trim().to_string())
        }
    }
}

/// Resolve key material, prompting only when `method` cannot run without it.
fn key_material(args: &KeyArgs, method: Method, confirm: bool) -> anyhow::Result<Option<Vec<u8>>> {
    if let Some(password) = &args.password {
        return Ok(Some(password.clone().into_bytes()));
    }
    if let Some(hex_key) = &args.key_hex {
        let key = hex::decode(hex_key.trim()).context("--key-hex is not valid hex")?;
        return Ok(Some(key));
    }
    if !method.requires_key() {
        return Ok(None);
    }

    let password = prompt_password("Password: ")?;
    if confirm && prompt_password("Confirm password: ")? != password {
        bail!("Passwords do not match");
    }
    if password.is_empty() {
        bail!("{} requires a non-empty password", method);
    }
    Ok(Some(password.into_bytes()))
}

fn cmd_capacity(stego: &Stego, carrier: &Path, method: Method, keyed: bool) -> anyhow::Result<()> {
    let capacity = stego.message_capacity(carrier, method, keyed)?;
    let unit = if keyed || method.requires_key() {
        "bytes"
    } else {
        "characters"
    };

    println!("Carrier:   {}", carrier.display());
    println!("Method:    {} ({})", method, method.kind());
    println!("Capacity:  {} {}", capacity, unit);

    Ok(())
}

fn cmd_hide(
    stego: &Stego,
    carrier: &Path,
    method: Method,
    message: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    key: &KeyArgs,
) -> anyhow::Result<()> {
    let message = match (message, input) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read message from {}", path.display()))?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (Some(_), Some(_)) => unreachable!(),
    };

    let key = key_material(key, method, true)?;
    let written = stego.hide(carrier, &message, output.as_deref(), method, key.as_deref())?;

    println!("Hid {} bytes with {}", message.len(), method);
    println!("Output: {}", written.display());

    Ok(())
}

fn cmd_extract(
    stego: &Stego,
    carrier: &Path,
    method: Method,
    length: Option<usize>,
    output: Option<PathBuf>,
    key: &KeyArgs,
) -> anyhow::Result<()> {
    let key = key_material(key, method, false)?;
    let message = stego.extract(carrier, method, key.as_deref(), length)?;

    if message.is_empty() {
        eprintln!("No hidden message found");
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &message)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {} bytes to {}", message.len(), path.display());
        }
        None => {
            println!("{}", message);
        }
    }

    Ok(())
}

fn cmd_methods() -> anyhow::Result<()> {
    println!("{:<10} {:<6} KEY", "METHOD", "KIND");
    for method in Method::ALL {
        let key = if method.requires_key() {
            "required"
        } else {
            "optional"
        };
        println!("{:<10} {:<6} {}", method.tag(), method.kind(), key);
    }
    Ok(())
}
