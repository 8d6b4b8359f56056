//! fprint - drive the imaging session core against a simulated sensor
//!
//! Subcommands:
//! - `fprint enroll --output <file>` - Enroll a synthetic finger and store the print
//! - `fprint verify --print <file>` - Verify a synthetic finger against a stored print
//! - `fprint identify --print <file>...` - Search stored prints for a synthetic finger
//! - `fprint capture` - Capture one standardized image

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fprint_biometric::PrintData;
use fprint_hardware::DriverConfig;
use tracing::info;

mod demo;

use demo::{Demo, Finger};

#[derive(Parser)]
#[command(name = "fprint")]
#[command(about = "Imaging fingerprint session demo on a mock sensor")]
#[command(version)]
struct Cli {
    /// JSON driver configuration (dimensions, threshold, enroll stages)
    #[arg(long, env = "FPRINT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `fprint_imgdev=trace`
    #[arg(long, env = "FPRINT_LOG", default_value = "info", global = true)]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct FingerArgs {
    /// Ridge segments on the synthetic finger (two minutiae each)
    #[arg(long, default_value = "6")]
    segments: usize,

    /// Finger variant; different variants do not match
    #[arg(long, default_value = "0")]
    variant: u32,
}

impl From<FingerArgs> for Finger {
    fn from(args: FingerArgs) -> Self {
        Finger {
            segments: args.segments,
            variant: args.variant,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a finger and write the print to a file
    Enroll {
        /// Where to store the enrolled print
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        finger: FingerArgs,
    },

    /// Verify a finger against a stored print
    Verify {
        /// Stored print to verify against
        #[arg(short, long)]
        print: PathBuf,

        #[command(flatten)]
        finger: FingerArgs,
    },

    /// Identify a finger among stored prints
    Identify {
        /// Stored prints forming the gallery
        #[arg(short, long, num_args = 1.., required = true)]
        print: Vec<PathBuf>,

        #[command(flatten)]
        finger: FingerArgs,
    },

    /// Capture one image and print its summary
    Capture {
        #[command(flatten)]
        finger: FingerArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .init();

    let config = load_config(cli.config.as_deref())?;
    let mut demo = Demo::open(config).await?;

    match cli.command {
        Commands::Enroll { output, finger } => {
            let print = demo.enroll(finger.into()).await?;
            fs::write(&output, print.to_bytes()?)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("enrolled {} fragments into {}", print.len(), output.display());
        }
        Commands::Verify { print, finger } => {
            let reference = load_print(&print)?;
            let matched = demo.verify(reference, finger.into()).await?;
            println!("{}", if matched { "match" } else { "no match" });
        }
        Commands::Identify { print, finger } => {
            let gallery = print
                .iter()
                .map(|path| load_print(path))
                .collect::<Result<Vec<_>>>()?;
            match demo.identify(gallery, finger.into()).await? {
                Some(index) => println!("match: {}", print[index].display()),
                None => println!("no match"),
            }
        }
        Commands::Capture { finger } => {
            let image = demo.capture(finger.into()).await?;
            let dark = image.data.iter().filter(|&&p| p < 128).count();
            println!(
                "captured {}x{} image, {} ridge pixels",
                image.width, image.height, dark
            );
        }
    }

    demo.close().await?;
    info!("device closed");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DriverConfig> {
    let Some(path) = path else {
        return Ok(DriverConfig::default());
    };

    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: DriverConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn load_print(path: &Path) -> Result<PrintData> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    PrintData::from_bytes(&bytes).with_context(|| format!("decoding print {}", path.display()))
}
