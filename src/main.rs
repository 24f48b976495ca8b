// src/main.rs

//! Command-line entry point for `palette-lut`.
//!
//! Each invocation performs exactly one run: build (or verify) the dense
//! lookup table, print the constant table, or look colors up in an existing
//! table. Any failure is logged and returned from `main`, which exits nonzero.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use palette_lut::{
    config::Config,
    lut::{self, BuildOptions},
    palette,
    render::{self, VectorStyle},
    source,
    table_io::{self, CheckOutcome},
    Rgb,
};

#[derive(Parser, Debug)]
#[command(
    name = "palette-lut",
    version,
    about = "Precompute nearest-palette-variant lookup tables for 24-bit RGB."
)]
struct Cli {
    /// JSON configuration file; command-line flags override its values
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PaletteArgs {
    /// Base palette file (`.json` array, otherwise one color per line)
    #[arg(long, value_name = "PATH")]
    palette: PathBuf,

    /// Brightness multipliers in index order, comma separated
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    multipliers: Option<Vec<f32>>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the dense 16 MiB nearest-variant table and write it to disk
    Table {
        #[command(flatten)]
        palette: PaletteArgs,

        /// Output table path
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Number of leading variants to exclude from matching
        #[arg(long, value_name = "N")]
        exclude: Option<usize>,

        /// Worker threads (1 = sequential scan)
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Verify the existing output matches instead of writing it
        #[arg(long, action = clap::ArgAction::SetTrue)]
        check: bool,
    },
    /// Print the normalized variants as a Rust constant table on stdout
    Render {
        #[command(flatten)]
        palette: PaletteArgs,

        /// Name of the generated constant
        #[arg(long, value_name = "NAME")]
        const_name: Option<String>,

        /// Element style of the generated vectors
        #[arg(long, value_enum)]
        style: Option<VectorStyle>,
    },
    /// Print the variant index stored for each color in an existing table
    Lookup {
        /// Table file produced by the `table` command
        #[arg(long, value_name = "PATH")]
        table: PathBuf,

        /// Colors as `#RRGGBB`, `0xRRGGBB` or decimal
        #[arg(required = true, value_name = "COLOR")]
        colors: Vec<String>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path),
        None => {
            info!("No config file given, using defaults.");
            Ok(Config::default())
        }
    }
}

fn load_base_colors(args: &PaletteArgs) -> anyhow::Result<Vec<Rgb>> {
    let colors = source::load(&args.palette)
        .with_context(|| format!("Failed to load base palette {}", args.palette.display()))?;
    if colors.is_empty() {
        bail!("base palette {} contains no colors", args.palette.display());
    }
    Ok(colors)
}

fn run_table(config: &Config, palette_args: &PaletteArgs, check: bool) -> anyhow::Result<()> {
    let base = load_base_colors(palette_args)?;
    let variants = palette::expand(&base, &config.palette.multipliers);

    let options =
        BuildOptions::new(config.table.exclude_count).with_strategy(config.table.strategy());
    let table = lut::build(&variants, &options).context("Failed to build lookup table")?;

    let used = table.histogram().iter().filter(|&&n| n > 0).count();
    info!(
        "{} of {} variants are nearest to at least one color",
        used,
        variants.len()
    );

    let output = &config.table.output;
    if check {
        match table_io::check_table(output, &table)
            .with_context(|| format!("Failed to read {}", output.display()))?
        {
            CheckOutcome::Matches => {
                info!("{} is up to date", output.display());
                Ok(())
            }
            CheckOutcome::Differs {
                existing_len,
                first_difference,
            } => {
                bail!(
                    "{} does not match the generated table ({} bytes on disk, first difference at {:?})",
                    output.display(),
                    existing_len,
                    first_difference
                )
            }
            CheckOutcome::Missing => bail!("{} does not exist", output.display()),
        }
    } else {
        table_io::write_table(output, &table)
            .with_context(|| format!("Failed to write lookup table {}", output.display()))
    }
}

fn run_render(config: &Config, palette_args: &PaletteArgs) -> anyhow::Result<()> {
    let base = load_base_colors(palette_args)?;
    let variants = palette::expand(&base, &config.palette.multipliers);
    let text = render::render(&variants, &config.render.options());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .context("Failed to write constant table to stdout")
}

fn run_lookup(table_path: &Path, colors: &[String]) -> anyhow::Result<()> {
    let table = table_io::read_table(table_path)
        .with_context(|| format!("Failed to load lookup table {}", table_path.display()))?;
    for text in colors {
        let color: Rgb = text
            .parse()
            .with_context(|| format!("Invalid color argument '{}'", text))?;
        println!("{} {}", color, table.lookup(color));
    }
    Ok(())
}

fn validate_palette_config(config: &Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;
    if config.palette.multipliers.len() != palette::DEFAULT_MULTIPLIERS.len() {
        warn!(
            "Using {} multipliers; variant indices will not match the standard 4-level layout",
            config.palette.multipliers.len()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    // Command-line overrides.
    match &cli.command {
        Command::Table {
            palette,
            output,
            exclude,
            threads,
            ..
        } => {
            if let Some(multipliers) = &palette.multipliers {
                config.palette.multipliers = multipliers.clone();
            }
            if let Some(output) = output {
                config.table.output = output.clone();
            }
            if let Some(exclude) = exclude {
                config.table.exclude_count = *exclude;
            }
            if threads.is_some() {
                config.table.threads = *threads;
            }
        }
        Command::Render {
            palette,
            const_name,
            style,
        } => {
            if let Some(multipliers) = &palette.multipliers {
                config.palette.multipliers = multipliers.clone();
            }
            if let Some(name) = const_name {
                config.render.const_name = name.clone();
            }
            if let Some(style) = style {
                config.render.style = *style;
            }
        }
        Command::Lookup { .. } => {}
    }

    match &cli.command {
        Command::Table { palette, check, .. } => {
            validate_palette_config(&config)?;
            run_table(&config, palette, *check)
        }
        Command::Render { palette, .. } => {
            validate_palette_config(&config)?;
            run_render(&config, palette)
        }
        // Only reads an existing table; palette and render settings do not apply.
        Command::Lookup { table, colors } => run_lookup(table, colors),
    }
}

/// Main entry point for `palette-lut`.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for `render` and `lookup` output.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
