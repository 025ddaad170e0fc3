mod inspect;

use clap::{Parser, Subcommand};
use eyre_pretty::{Context, ContextCompat, Result, bail};
use nswfmt::{
    nacp::{Nacp, TitleSlots},
    nro::Nro,
};
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect a .nro file
    Inspect {
        /// Path to the input file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Edit the asset section of a .nro file
    ///
    /// Omitted fields keep their current value. A file without an asset section gets one.
    Edit {
        /// Path to the input file
        #[arg(short, long)]
        input: PathBuf,
        /// Path to the output file (defaults to editing in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// New application name
        #[arg(long)]
        name: Option<String>,
        /// New application author
        #[arg(long)]
        author: Option<String>,
        /// New display version
        #[arg(long)]
        version: Option<String>,
        /// File whose bytes replace the icon payload, stored verbatim
        #[arg(long)]
        icon: Option<PathBuf>,
    },
    /// Extract a payload from the asset section of a .nro file
    Extract {
        /// Payload to extract: icon, nacp or romfs
        #[arg(short, long)]
        target: String,
        /// Path to the input file
        #[arg(short, long)]
        input: PathBuf,
        /// Path to the output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// A CLI to inspect and manipulate Switch homebrew .nro files.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Action to take
    #[command(subcommand)]
    command: Command,
}

fn edit(
    input: PathBuf,
    output: Option<PathBuf>,
    name: Option<String>,
    author: Option<String>,
    version: Option<String>,
    icon: Option<PathBuf>,
) -> Result<()> {
    let mut nro = Nro::open(&input).context("opening input file")?;
    let mut asset = nro.asset.take().unwrap_or_default();

    if name.is_some() || author.is_some() || version.is_some() {
        let mut record = Nacp::new(std::mem::take(&mut asset.nacp));

        let name = match name {
            Some(name) => name,
            None => record.name().context("reading current name")?.to_owned(),
        };
        let author = match author {
            Some(author) => author,
            None => record.author().context("reading current author")?.to_owned(),
        };

        record.set_title(&name, &author, TitleSlots::default())?;
        if let Some(version) = &version {
            record.set_version(version)?;
        }

        tracing::info!("updated control record (name: {name:?}, author: {author:?})");
        asset.nacp = record.into_bytes();
    }

    if let Some(icon) = icon {
        asset.icon = std::fs::read(&icon).context("reading icon file")?;
        tracing::info!("replaced icon payload ({} bytes)", asset.icon.len());
    }

    nro.asset = Some(asset);

    let output = output.unwrap_or(input);
    nro.save(&output).context("writing output file")?;
    tracing::info!("wrote {}", output.display());

    Ok(())
}

fn extract(target: String, input: PathBuf, output: PathBuf) -> Result<()> {
    let nro = Nro::open(&input).context("opening input file")?;
    let asset = nro.asset.context("file has no asset section")?;

    let payload = match &*target {
        "icon" => asset.icon,
        "nacp" => asset.nacp,
        "romfs" => asset.romfs,
        _ => bail!("unknown payload (expected icon, nacp or romfs)"),
    };

    if payload.is_empty() {
        bail!("file has no {target} payload");
    }

    tracing::debug!("extracting {} bytes", payload.len());
    std::fs::write(&output, payload).context("writing output file")?;

    Ok(())
}

fn setup_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("nrotool=info,nswfmt=info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).without_time();

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    eyre_pretty::install().unwrap();
    setup_tracing();

    let config = Args::parse();
    match config.command {
        Command::Inspect { input } => inspect::inspect_nro(input),
        Command::Edit {
            input,
            output,
            name,
            author,
            version,
            icon,
        } => edit(input, output, name, author, version, icon),
        Command::Extract {
            target,
            input,
            output,
        } => extract(target, input, output),
    }
}
