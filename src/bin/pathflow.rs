use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pathflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a scatter plan and write it as JSON.
    Plan(PlanArgs),
    /// Evaluate object motion frame by frame and write CSV.
    Sample(SampleArgs),
    /// List the layers of a shape document and their paths.
    Describe(DescribeArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Input shape document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer to scatter along (defaults to the first layer).
    #[arg(long)]
    layer: Option<String>,

    /// Scatter config JSON.
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in parameter set: default, trent, leen-canal.
    #[arg(long)]
    preset: Option<String>,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Include host position and rotation expressions per object.
    #[arg(long, default_value_t = false)]
    expressions: bool,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Only this object (all objects when omitted).
    #[arg(long)]
    index: Option<u32>,

    /// Frame rate numerator.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Seconds to sample (one loop when omitted).
    #[arg(long)]
    seconds: Option<f64>,

    /// Evaluate objects on the rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Output CSV path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DescribeArgs {
    /// Input shape document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Parametric subdivisions per segment when measuring length.
    #[arg(long, default_value_t = pathflow::DEFAULT_OVERSAMPLE)]
    oversample: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Describe(args) => cmd_describe(args),
    }
}

struct Loaded {
    layer_name: String,
    plan: pathflow::ScatterPlan,
}

fn load(args: &SourceArgs) -> anyhow::Result<Loaded> {
    let doc = pathflow::ShapeDocument::from_path(&args.in_path)?;
    let layer = doc.layer(args.layer.as_deref())?;
    let source = layer.source()?;

    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => pathflow::ScatterConfig::from_path(path)?,
        (None, Some(name)) => pathflow::ScatterConfig::preset(name)?,
        (None, None) => pathflow::ScatterConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let plan = pathflow::ScatterPlan::build(&source, &config)
        .with_context(|| format!("scatter along layer '{}'", layer.name))?;
    Ok(Loaded {
        layer_name: layer.name.clone(),
        plan,
    })
}

fn open_out(out: Option<&Path>) -> anyhow::Result<Box<dyn std::io::Write>> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("create '{}'", path.display()))?;
            Ok(Box::new(std::io::BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let loaded = load(&args.source)?;
    let report = loaded
        .plan
        .report(args.expressions.then_some(loaded.layer_name.as_str()));

    let mut w = open_out(args.out.as_deref())?;
    serde_json::to_writer_pretty(&mut w, &report).context("serialize plan")?;
    writeln!(w)?;
    w.flush()?;

    let params = loaded.plan.params();
    eprintln!(
        "{} objects, {:.3}s loop{}",
        params.object_count,
        params.loop_duration_secs,
        if params.was_adjusted() { " (adjusted)" } else { "" }
    );
    if let Some(out) = &args.out {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let fps = pathflow::Fps::new(args.fps, 1)?;
    let loaded = load(&args.source)?;
    let plan = &loaded.plan;

    let objects = match args.index {
        Some(i) => {
            let obj = plan.objects().get(i as usize).copied().with_context(|| {
                format!("object {i} out of range (plan has {})", plan.objects().len())
            })?;
            vec![obj]
        }
        None => plan.objects().to_vec(),
    };

    let seconds = args
        .seconds
        .unwrap_or(plan.params().loop_duration_secs);
    let frames = fps.frames_in(seconds);
    let field = plan.field();

    let mut w = open_out(args.out.as_deref())?;
    writeln!(w, "frame,time,index,x,y,rotation_deg,fallback")?;
    for f in 0..frames {
        let t = fps.frame_to_secs(pathflow::FrameIndex(f));
        let samples = field.sample_all(&objects, t, args.parallel);
        for (obj, s) in objects.iter().zip(&samples) {
            let fallback = match s.fallback {
                Some(pathflow::MotionFallback::DegenerateTangent) => "degenerate_tangent",
                Some(pathflow::MotionFallback::NonFinite) => "non_finite",
                None => "",
            };
            writeln!(
                w,
                "{f},{t},{},{},{},{},{fallback}",
                obj.index, s.position.x, s.position.y, s.rotation_deg
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

fn cmd_describe(args: DescribeArgs) -> anyhow::Result<()> {
    let doc = pathflow::ShapeDocument::from_path(&args.in_path)?;
    let mut out = std::io::stdout().lock();
    for layer in &doc.layers {
        let summary = layer
            .source()
            .and_then(|s| pathflow::PathSummary::measure(&s, args.oversample));
        match summary {
            Ok(s) => writeln!(
                out,
                "{}: {} vertices, {} segments, {}, length {:.3}px",
                layer.name,
                s.vertex_count,
                s.segment_count,
                if s.closed { "closed" } else { "open" },
                s.arc_length_px
            )?,
            Err(e) => writeln!(out, "{}: {e}", layer.name)?,
        }
    }
    Ok(())
}
