use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    vertices: usize,
    length_px: f64,
    oversample: usize,
    points: usize,
    fps: u32,
    seconds: u32,
    warmup: u32,
    repeats: u32,
    parallel: bool,
    seed: u64,
    json: bool,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    sample_total: Duration,
    resample_total: Duration,
    plan_total: Duration,
    annotation_total: Duration,
    eval_total: Duration,
    wall_total: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.vertices < 2 {
        anyhow::bail!("--vertices must be >= 2");
    }
    if !args.length_px.is_finite() || args.length_px <= 0.0 {
        anyhow::bail!("--length-px must be > 0");
    }
    if args.oversample == 0 || args.points < 2 {
        anyhow::bail!("--oversample must be >= 1 and --points >= 2");
    }
    if args.fps == 0 || args.seconds == 0 {
        anyhow::bail!("--fps and --seconds must be > 0");
    }

    let source = build_river(args.vertices, args.length_px);
    let mut config = pathflow::ScatterConfig::default();
    config.sampling.oversample = args.oversample;
    config.sampling.point_count = args.points;
    config.seed = args.seed;

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for i in 0..args.warmup {
            let _ = run_once(&args, &source, &config, i, /*is_warmup=*/ true)?;
        }
    }

    let frames = u64::from(args.fps) * u64::from(args.seconds);
    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {vertices} vertices, K={k}, N={n}, {frames} frames/run ({seconds}s @ {fps} fps), mode={mode}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        vertices = args.vertices,
        k = args.oversample,
        n = args.points,
        frames = frames,
        seconds = args.seconds,
        fps = args.fps,
        mode = if args.parallel {
            "parallel"
        } else {
            "sequential"
        },
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    let mut digests = Vec::<String>::with_capacity(args.repeats as usize);
    for i in 0..args.repeats {
        let (m, digest) = run_once(&args, &source, &config, i, /*is_warmup=*/ false)?;
        runs.push(m);
        digests.push(digest);
    }

    match distinct_digests(digests).as_slice() {
        [] => {}
        [one] => eprintln!("output sha256: {one} (stable across runs)"),
        many => anyhow::bail!("output differs between runs: {} distinct digests", many.len()),
    }

    report_percentiles(&runs, args.json);
    Ok(())
}

/// A meandering open path of `vertices` points spanning roughly `length_px`.
fn build_river(vertices: usize, length_px: f64) -> pathflow::ShapePath {
    let step = length_px / (vertices - 1) as f64;
    let amp = step * 0.6;
    let handle = step / 3.0;

    let pts: Vec<pathflow::Point> = (0..vertices)
        .map(|i| {
            let x = i as f64 * step;
            let y = if i % 2 == 0 { -amp } else { amp };
            pathflow::Point::new(x, y)
        })
        .collect();
    pathflow::ShapePath {
        in_tangents: vec![pathflow::Vec2::new(-handle, 0.0); vertices],
        out_tangents: vec![pathflow::Vec2::new(handle, 0.0); vertices],
        vertices: pts,
        closed: false,
    }
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        vertices: 24,
        length_px: 5000.0,
        oversample: pathflow::DEFAULT_OVERSAMPLE,
        points: pathflow::DEFAULT_POINT_COUNT,
        fps: 30,
        seconds: 10,
        warmup: 1,
        repeats: 100,
        parallel: false,
        seed: 1,
        json: false,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--vertices" => out.vertices = parse_num(args.next(), "--vertices")?,
            "--length-px" => out.length_px = parse_num(args.next(), "--length-px")?,
            "--oversample" => out.oversample = parse_num(args.next(), "--oversample")?,
            "--points" => out.points = parse_num(args.next(), "--points")?,
            "--fps" => out.fps = parse_num(args.next(), "--fps")?,
            "--seconds" => out.seconds = parse_num(args.next(), "--seconds")?,
            "--warmup" => out.warmup = parse_num(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_num(args.next(), "--repeats")?,
            "--seed" => out.seed = parse_num(args.next(), "--seed")?,
            "--parallel" => out.parallel = true,
            "--json" => out.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"pathflow-bench

Samples, resamples and scatters along a synthetic river path, evaluates every
object for every frame, and reports p50/p90/p99 for each stage.

Usage:
  cargo run -q --release
  cargo run -q --release -- --repeats 50 --seconds 10 --fps 30
  cargo run -q --release -- --parallel --length-px 20000

Args:
  --vertices N     (default 24)
  --length-px X    (default 5000)
  --oversample N   (default 1000)
  --points N       (default 100)
  --fps N          (default 30)
  --seconds N      (default 10)
  --warmup N       (default 1)
  --repeats N      (default 100)
  --seed N         (default 1)
  --parallel       evaluate objects on the rayon pool
  --json           print the percentile table as JSON on stdout
"#
    );
}

fn parse_num<T>(v: Option<String>, flag: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<T>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn run_once(
    args: &BenchArgs,
    source: &pathflow::ShapePath,
    config: &pathflow::ScatterConfig,
    run_idx: u32,
    is_warmup: bool,
) -> anyhow::Result<(RunMetrics, String)> {
    let wall = Instant::now();
    let mut m = RunMetrics::default();

    let bezier = pathflow::BezierPath::from_source(source)?;
    let t0 = Instant::now();
    let polyline = pathflow::sample_path(&bezier, args.oversample)?;
    m.sample_total = t0.elapsed();

    let t1 = Instant::now();
    let _resampled = pathflow::resample(&polyline, args.points)?;
    m.resample_total = t1.elapsed();

    let t2 = Instant::now();
    let plan = pathflow::ScatterPlan::build(source, config)?;
    m.plan_total = t2.elapsed();

    let t3 = Instant::now();
    let annotation = pathflow::encode_annotation(plan.path());
    m.annotation_total = t3.elapsed();

    let fps = pathflow::Fps::new(args.fps, 1)?;
    let field = plan.field();
    let mut hasher = sha2::Sha256::new();
    hasher.update(annotation.as_bytes());

    let t4 = Instant::now();
    for f in 0..u64::from(args.fps) * u64::from(args.seconds) {
        let t = fps.frame_to_secs(pathflow::FrameIndex(f));
        for s in field.sample_all(plan.objects(), t, args.parallel) {
            hasher.update(s.position.x.to_le_bytes());
            hasher.update(s.position.y.to_le_bytes());
            hasher.update(s.rotation_deg.to_le_bytes());
        }
    }
    m.eval_total = t4.elapsed();

    m.wall_total = wall.elapsed();

    let digest = hex(&hasher.finalize());

    if !is_warmup {
        eprintln!(
            "run {run_idx:03}: wall={wall:.3}s sample={sa:.3}ms resample={re:.3}ms plan={pl:.3}ms annotation={an:.3}ms eval={ev:.3}s objects={objects}",
            wall = m.wall_total.as_secs_f64(),
            sa = m.sample_total.as_secs_f64() * 1000.0,
            re = m.resample_total.as_secs_f64() * 1000.0,
            pl = m.plan_total.as_secs_f64() * 1000.0,
            an = m.annotation_total.as_secs_f64() * 1000.0,
            ev = m.eval_total.as_secs_f64(),
            objects = plan.objects().len(),
        );
    }

    Ok((m, digest))
}

/// Unique digests in sorted order; run order does not matter.
fn distinct_digests(mut digests: Vec<String>) -> Vec<String> {
    digests.sort();
    digests.dedup();
    digests
}

fn hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn report_percentiles(runs: &[RunMetrics], as_json: bool) {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn collect(runs: &[RunMetrics], f: fn(&RunMetrics) -> Duration) -> Vec<Duration> {
        let mut v = runs.iter().map(f).collect::<Vec<_>>();
        v.sort_by_key(|d| d.as_nanos());
        v
    }

    fn p(v: &[Duration], p: f64) -> Duration {
        if v.is_empty() {
            return Duration::ZERO;
        }
        let n = v.len();
        let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
        v[rank - 1]
    }

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("sample_total", |m| m.sample_total),
        ("resample_total", |m| m.resample_total),
        ("plan_total", |m| m.plan_total),
        ("annotation_total", |m| m.annotation_total),
        ("eval_total", |m| m.eval_total),
        ("wall_total", |m| m.wall_total),
    ];

    let mut table = serde_json::Map::new();
    eprintln!("\npercentiles across runs (p50/p90/p99):");
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        let p50 = p(&v, 0.50);
        let p90 = p(&v, 0.90);
        let p99 = p(&v, 0.99);
        eprintln!(
            "  {name:18} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(p50),
            p90 = fmt_ms(p90),
            p99 = fmt_ms(p99)
        );
        table.insert(
            (*name).to_string(),
            json!({
                "p50_ms": p50.as_secs_f64() * 1000.0,
                "p90_ms": p90.as_secs_f64() * 1000.0,
                "p99_ms": p99.as_secs_f64() * 1000.0,
            }),
        );
    }

    if as_json {
        println!("{}", serde_json::Value::Object(table));
    }
}
