use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera::color::{PaletteOptions, distribution, extract_palette};
use tessera::report::PaletteReport;
use tessera::superpixel::{
    ClusteringVariant, SizeClass, SlicOptions, boundary_color, boundary_mask, overlay_boundaries,
    recolor, segment_detailed,
};
use tessera::sweep::{
    GridCell, GridOptions, SlicSweep, SweepAxis, SweepPoint, build_grid, render_point,
    select_varying,
};
use tessera::transform::{ResizeOptions, resize_with_options};
use tessera::{Color, RgbImage};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Superpixel segmentation and palette analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment an image into superpixels and write the mean-recolored result
    Segment {
        #[command(flatten)]
        io: InOut,

        #[command(flatten)]
        slic: SlicArgs,

        /// Draw segment boundaries in green
        #[arg(long)]
        boundaries: bool,
    },
    /// Extract a dominant color palette and its pixel coverage
    Palette {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,

        /// Write the quantized image here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of palette colors
        #[arg(short = 'k', long, default_value_t = tessera::color::palette::DEFAULT_PALETTE_SIZE)]
        colors: u32,

        /// Seed for k-means++ initialisation
        #[arg(long, default_value_t = tessera::color::palette::DEFAULT_RANDOM_SEED)]
        seed: u64,

        /// Per-channel tolerance for coverage counting
        #[arg(short, long, default_value_t = tessera::color::distribution::DEFAULT_TOLERANCE)]
        tolerance: u32,

        /// Number of colors to report
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the parameter sweep experiment and write one grid per axis
    Sweep {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the grid images
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Also render every point into one tiled grid
        #[arg(long)]
        full: bool,

        /// Columns of the full grid
        #[arg(long, default_value_t = 5)]
        columns: u32,
    },
    /// Compare region sizes with the presets for the image's size class
    Focus {
        #[command(flatten)]
        io: InOut,

        /// Smallest region size
        #[arg(long, default_value_t = 20)]
        from: u32,

        /// Largest region size
        #[arg(long, default_value_t = 150)]
        to: u32,

        /// Region size increment
        #[arg(long, default_value_t = 10)]
        step: u32,
    },
    /// Fit an image into a fixed canvas, keeping its aspect ratio
    Resize {
        #[command(flatten)]
        io: InOut,

        /// Target width
        #[arg(long, default_value_t = tessera::transform::DEFAULT_TARGET_SIZE)]
        width: u32,

        /// Target height
        #[arg(long, default_value_t = tessera::transform::DEFAULT_TARGET_SIZE)]
        height: u32,

        /// Padding color as #RRGGBB
        #[arg(long, default_value = "#FFFFFF")]
        pad: String,
    },
}

#[derive(Args)]
struct InOut {
    /// Input image
    #[arg(short, long)]
    input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct SlicArgs {
    /// Seed grid spacing in pixels
    #[arg(short, long, default_value_t = tessera::superpixel::DEFAULT_REGION_SIZE)]
    region_size: u32,

    /// Spatial weight; defaults to the image's size-class preset
    #[arg(short, long)]
    compactness: Option<f32>,

    /// Iteration cap; defaults to the image's size-class preset
    #[arg(long)]
    iterations: Option<u32>,

    /// Clustering variant: slic, slico or mslic
    #[arg(long, default_value = "slico")]
    variant: ClusteringVariant,

    /// Keep adjacent segments with identical means apart
    #[arg(long)]
    no_merge: bool,

    /// Do not move seeds off edges
    #[arg(long)]
    no_perturb: bool,
}

impl SlicArgs {
    fn options_for(&self, image: &RgbImage) -> SlicOptions {
        let mut options = SlicOptions::for_image(image.width(), image.height())
            .with_region_size(self.region_size)
            .with_variant(self.variant)
            .with_perturb_seeds(!self.no_perturb);
        if let Some(c) = self.compactness {
            options = options.with_compactness(c);
        }
        if let Some(n) = self.iterations {
            options = options.with_max_iterations(n);
        }
        if self.no_merge {
            options = options.with_merge_threshold(None);
        }
        options
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Segment {
            io,
            slic,
            boundaries,
        } => run_segment(&io, &slic, boundaries),
        Commands::Palette {
            input,
            output,
            colors,
            seed,
            tolerance,
            top,
            json,
        } => run_palette(&input, output.as_deref(), colors, seed, tolerance, top, json),
        Commands::Sweep {
            input,
            output_dir,
            full,
            columns,
        } => run_sweep(&input, &output_dir, full, columns),
        Commands::Focus { io, from, to, step } => run_focus(&io, from, to, step),
        Commands::Resize {
            io,
            width,
            height,
            pad,
        } => run_resize(&io, width, height, &pad),
    }
}

fn load(path: &Path) -> anyhow::Result<RgbImage> {
    let image = tessera::io::read_image(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded image"
    );
    Ok(image)
}

fn save(image: &RgbImage, path: &Path) -> anyhow::Result<()> {
    tessera::io::write_image_auto(image, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}

fn run_segment(io: &InOut, slic: &SlicArgs, boundaries: bool) -> anyhow::Result<()> {
    let image = load(&io.input)?;
    let options = slic.options_for(&image);
    let result = segment_detailed(&image, &options).context("Segmentation failed")?;
    tracing::info!(
        variant = %options.variant,
        region_size = options.region_size,
        seeds = result.seed_count,
        segments = result.label_map.segment_count(),
        iterations = result.iterations,
        converged = result.converged,
        "segmented"
    );

    let mut out = recolor(&image, &result.label_map)?;
    if boundaries {
        let mask = boundary_mask(&result.label_map)?;
        out = overlay_boundaries(&out, &mask, boundary_color(out.order()))?;
    }
    save(&out, &io.output)
}

fn run_palette(
    input: &Path,
    output: Option<&Path>,
    colors: u32,
    seed: u64,
    tolerance: u32,
    top: usize,
    json: bool,
) -> anyhow::Result<()> {
    let image = load(input)?;
    let options = PaletteOptions::default()
        .with_palette_size(colors)
        .with_random_seed(seed);
    let extraction = extract_palette(&image, &options).context("Palette extraction failed")?;
    let counts = distribution(&image, &extraction.palette, tolerance)?;
    let report = PaletteReport::new(&extraction, &counts, tolerance, top);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Top {} colors ({}x{}):", report.colors.len(), report.width, report.height);
        for c in &report.colors {
            println!(
                "  {}  {:>8} px  {:>6.2}%",
                c.hex,
                c.band_pixels,
                c.share * 100.0
            );
        }
    }

    if let Some(path) = output {
        save(&extraction.quantized, path)?;
    }
    Ok(())
}

/// Reference values shared by every per-axis grid of the sweep.
fn sweep_reference() -> SlicOptions {
    SlicOptions::default()
        .with_region_size(60)
        .with_compactness(10.0)
        .with_max_iterations(10)
        .with_variant(ClusteringVariant::ZeroParameter)
}

fn title_for(axis: SweepAxis, reference: &SlicOptions) -> Vec<String> {
    let fixed: Vec<String> = SweepAxis::ALL
        .iter()
        .filter(|&&a| a != axis)
        .map(|a| format!("{}={}", a.name(), a.value_label(reference)))
        .collect();
    vec![format!("varying {}", axis.name()), fixed.join(" ")]
}

fn render_all(image: &RgbImage, points: &[SweepPoint]) -> anyhow::Result<Vec<GridCell>> {
    points
        .iter()
        .map(|p| {
            render_point(image, p).with_context(|| format!("Sweep point {} failed", p.label()))
        })
        .collect()
}

fn run_sweep(input: &Path, output_dir: &Path, full: bool, columns: u32) -> anyhow::Result<()> {
    let image = load(input)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let sweep = SlicSweep::experiment();
    sweep.validate()?;
    let points: Vec<SweepPoint> = sweep.iter()?.collect();
    let reference = sweep_reference();

    for axis in SweepAxis::ALL {
        let slice = select_varying(&points, &reference, axis);
        if slice.is_empty() {
            bail!("No sweep points vary along {axis}");
        }
        tracing::info!(axis = %axis, points = slice.len(), "rendering sweep axis");
        let cells = render_all(&image, &slice)?;
        let grid = build_grid(
            &cells,
            &GridOptions::linear().with_title(title_for(axis, &reference)),
        )?;
        save(&grid.image, &output_dir.join(format!("{stem}_{}.png", axis.name())))?;
    }

    if full {
        tracing::info!(points = points.len(), "rendering full sweep");
        let cells = render_all(&image, &points)?;
        let grid = build_grid(
            &cells,
            &GridOptions::tiled(columns).with_title([format!("{} settings", points.len())]),
        )?;
        save(&grid.image, &output_dir.join(format!("{stem}_all.png")))?;
    }
    Ok(())
}

fn run_focus(io: &InOut, from: u32, to: u32, step: u32) -> anyhow::Result<()> {
    if step == 0 || from == 0 || from > to {
        bail!("Invalid region size range {from}..={to} step {step}");
    }
    let image = load(&io.input)?;
    let class = SizeClass::of(image.width(), image.height());
    let base = SlicOptions::for_image(image.width(), image.height());
    let sizes: Vec<u32> = (from..=to).step_by(step as usize).collect();

    let sweep = SlicSweep::new(base.clone()).with_region_sizes(sizes);
    let points: Vec<SweepPoint> = sweep.iter()?.collect();
    let cells = render_all(&image, &points)?;
    let title = [
        format!("{class:?} image, {}", base.variant),
        format!(
            "ruler={} iter={} region {from}..={to}",
            base.compactness, base.max_iterations
        ),
    ];
    let grid = build_grid(&cells, &GridOptions::linear().with_title(title))?;
    save(&grid.image, &io.output)
}

fn parse_hex(s: &str) -> anyhow::Result<(u8, u8, u8)> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("Expected #RRGGBB, got {s:?}");
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).with_context(|| format!("Bad hex color {s:?}"))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

fn run_resize(io: &InOut, width: u32, height: u32, pad: &str) -> anyhow::Result<()> {
    let (r, g, b) = parse_hex(pad)?;
    let image = load(&io.input)?;
    let options = ResizeOptions::default()
        .with_size(width, height)
        .with_pad_color(Color::from_rgb(r, g, b, image.order()));
    let out = resize_with_options(&image, &options).context("Resize failed")?;
    save(&out, &io.output)
}
