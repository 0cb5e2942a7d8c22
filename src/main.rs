use clap::{Parser, Subcommand};
use clocktower_icons::cache::RemovalCache;
use clocktower_icons::imaging::{RustSurface, TextureLoader};
use clocktower_icons::process::Pipeline;
use clocktower_icons::removal::{CachedRemover, CommandRemover};
use clocktower_icons::types::{ColorOption, ContrastMode, ProcessingOptions};
use clocktower_icons::{config, generate, output, scan};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clocktower-icons")]
#[command(about = "Turn artwork into textured character icons")]
#[command(long_about = "\
Turn artwork into textured character icons

Each input image is reduced to greyscale, binarized, optionally outlined,
and painted with a parchment texture and a team-coloured texture. Icons are
written as <name>-<variant>.png.

Texture assets live in the directory named by [textures] dir in config.toml:

  textures/
  ├── background-white.webp        # Parchment, shared by every variant
  ├── background-red.webp          # One per colour variant
  ├── background-blue.webp
  ├── ...
  └── background-traveller.png     # Traveller family prefers PNG

Run 'clocktower-icons gen-config' to generate a documented config.toml.
Run 'clocktower-icons variants' to list the colour variants.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Per-run overrides of the `[defaults]` config section.
#[derive(clap::Args, Clone)]
struct OptionArgs {
    /// Colour variant
    #[arg(long, value_enum)]
    variant: Option<ColorOption>,

    /// Draw a white border of this many pixels (0 disables)
    #[arg(long, value_name = "PX")]
    border: Option<u32>,

    /// Invert the artwork before texturing
    #[arg(long, overrides_with = "no_invert")]
    invert: bool,

    /// Do not invert, even if config.toml says so
    #[arg(long, overrides_with = "invert")]
    no_invert: bool,

    /// Crop to content, even if config.toml turns it off
    #[arg(long, overrides_with = "no_crop")]
    crop: bool,

    /// Keep the full canvas instead of cropping to content
    #[arg(long, overrides_with = "crop")]
    no_crop: bool,

    /// Pick one texture per pixel instead of blending
    #[arg(long, overrides_with = "blend")]
    threshold: bool,

    /// Blend the two textures by intensity
    #[arg(long, overrides_with = "threshold")]
    blend: bool,

    /// Contrast handling
    #[arg(long, value_enum)]
    contrast: Option<ContrastMode>,

    /// Remove the background with the configured command first
    #[arg(long, overrides_with = "no_remove_background")]
    remove_background: bool,

    /// Skip background removal, even if config.toml enables it
    #[arg(long, overrides_with = "remove_background")]
    no_remove_background: bool,

    /// Add aspect-aware transparent padding
    #[arg(long, overrides_with = "no_padding")]
    padding: bool,

    /// No aspect padding, even if config.toml enables it
    #[arg(long, overrides_with = "padding")]
    no_padding: bool,

    /// Working square size in pixels
    #[arg(long, value_name = "PX")]
    size: Option<u32>,

    /// Add a soft drop shadow
    #[arg(long, overrides_with = "no_shadow")]
    shadow: bool,

    /// No drop shadow, even if config.toml enables it
    #[arg(long, overrides_with = "shadow")]
    no_shadow: bool,

    /// Horizontal shift for traveller variants (negative pads left)
    #[arg(long, value_name = "PX", allow_hyphen_values = true)]
    shift: Option<i32>,
}

/// `Some(true)` for `--flag`, `Some(false)` for `--no-flag`, `None` when
/// neither was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl OptionArgs {
    /// Apply the flags that were given on top of the configured defaults.
    fn apply(&self, mut options: ProcessingOptions) -> ProcessingOptions {
        if let Some(variant) = self.variant {
            options.variant = variant;
        }
        if let Some(px) = self.border {
            options.border = px > 0;
            options.border_size = px;
        }
        if let Some(mode) = self.contrast {
            options.contrast = mode;
        }
        if self.size.is_some() {
            options.output_size = self.size;
        }
        if let Some(px) = self.shift {
            options.horizontal_adjustment = px;
        }

        let switches = [
            (&mut options.invert, switch(self.invert, self.no_invert)),
            (&mut options.crop, switch(self.crop, self.no_crop)),
            (&mut options.smooth_blend, switch(self.blend, self.threshold)),
            (
                &mut options.remove_background,
                switch(self.remove_background, self.no_remove_background),
            ),
            (&mut options.padding, switch(self.padding, self.no_padding)),
            (&mut options.drop_shadow, switch(self.shadow, self.no_shadow)),
        ];
        for (field, value) in switches {
            if let Some(value) = value {
                *field = value;
            }
        }
        options
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate icons from image files or directories of images
    Generate {
        /// Input images or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(long, short, default_value = "icons")]
        output: PathBuf,

        /// Print a JSON report instead of progress lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: OptionArgs,
    },
    /// List colour variants with their labels and swatches
    Variants,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            inputs,
            output: output_dir,
            json,
            options,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let options = options.apply(config.defaults.clone());
            options
                .check_ranges()
                .map_err(|msg| format!("invalid option: {msg}"))?;
            let inputs = scan::collect_inputs(&inputs)?;
            init_thread_pool(&config.processing);

            let surface = RustSurface::new();
            let textures = TextureLoader::new(config.texture_dir(&cli.config_dir));
            let cache = Arc::new(RemovalCache::new());
            let remover = config
                .background_removal
                .command
                .as_deref()
                .and_then(CommandRemover::from_command_line)
                .map(|inner| CachedRemover::new(inner, Arc::clone(&cache)));
            let mut pipeline = Pipeline::new(&surface, &textures);
            if let Some(remover) = &remover {
                pipeline = pipeline.with_remover(remover);
            }

            let verbose = cli.verbose > 0;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if !json {
                        output::print_generate_event(&event, verbose);
                    }
                }
            });
            let report = generate::generate(&pipeline, &inputs, &output_dir, &options, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let stats = remover.as_ref().map(|r| r.cache().stats());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_summary(&report, stats.as_ref());
            }
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Command::Variants => {
            output::print_variants();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
