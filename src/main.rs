use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use hard_iron_rs::data_log::load_log;
use hard_iron_rs::pipeline::{analyze, CalibrationConfig, CalibrationReport};
use hard_iron_rs::plot::{PlotScene, PlotStyle, Visualizer};
use hard_iron_rs::rerun_logger::RerunLogger;
use hard_iron_rs::sync::IMU_SAMPLE_INTERVAL_S;
use hard_iron_rs::types::SOURCE_IMU;

#[derive(Parser, Debug)]
#[command(name = "hard_iron")]
#[command(about = "Hard iron offset estimation of data log file.", long_about = None)]
struct Args {
    /// Path to data log file (.json or .json.gz)
    path: PathBuf,

    /// Write a Rerun .rrd recording here instead of opening the viewer
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip rendering, only print the estimate
    #[arg(long, default_value_t = false)]
    no_plot: bool,

    /// Print the estimate as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Resampling interval in seconds
    #[arg(long, default_value_t = IMU_SAMPLE_INTERVAL_S)]
    sample_interval: f64,

    /// Signal source holding the IMU channels
    #[arg(long, default_value = SOURCE_IMU)]
    source: String,

    /// JSON plot style overriding the default colors and sizes
    #[arg(long)]
    style: Option<PathBuf>,
}

/// Where the calibration plot goes
#[derive(Debug, PartialEq)]
enum PlotTarget {
    /// Spawned Rerun viewer window
    Viewer,
    /// Saved .rrd recording
    File(PathBuf),
}

impl Args {
    fn plot_target(&self) -> PlotTarget {
        match &self.output {
            Some(path) => PlotTarget::File(path.clone()),
            None => PlotTarget::Viewer,
        }
    }
}

fn print_summary(report: &CalibrationReport) {
    let est = &report.estimate;
    println!("Hard iron offset [gauss]");
    println!("  V_x:      {:>9.4}", est.offset[0]);
    println!("  V_y:      {:>9.4}", est.offset[1]);
    println!("  V_z:      {:>9.4}", est.offset[2]);
    println!("  Radius:   {:>9.4}", est.radius);
    println!("  Residual: {:>9.2e} (rms)", est.rms_residual);
    println!("  Samples:  {} over {:.2}s", est.sample_count, report.duration_s);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !(args.sample_interval > 0.0) {
        anyhow::bail!("--sample-interval must be positive, got {}", args.sample_interval);
    }

    let config = CalibrationConfig {
        source: args.source.clone(),
        sample_interval_s: args.sample_interval,
        ..CalibrationConfig::default()
    };

    let data_log = load_log(&args.path)
        .with_context(|| format!("Failed to read data log {}", args.path.display()))?;
    let report = analyze(&data_log.signals, &config)
        .with_context(|| format!("Hard iron estimation failed for {}", args.path.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "log": args.path.display().to_string(),
                "offset": report.estimate.offset,
                "radius": report.estimate.radius,
                "rms_residual": report.estimate.rms_residual,
                "samples": report.estimate.sample_count,
                "duration_s": report.duration_s,
            }))?
        );
    } else {
        print_summary(&report);
    }

    if args.no_plot {
        return Ok(());
    }

    let style = match args.style.as_ref() {
        Some(path) => PlotStyle::from_file(path)
            .with_context(|| format!("Failed to read plot style {}", path.display()))?,
        None => PlotStyle::default(),
    };
    let scene = PlotScene::build(&report, &style);
    let target = args.plot_target();
    let mut plotter = match &target {
        PlotTarget::Viewer => RerunLogger::spawn(&style)?,
        PlotTarget::File(path) => RerunLogger::to_file(path, &style)?,
    };
    plotter.render(&scene).context("Failed to render calibration plot")?;

    if let PlotTarget::File(path) = target {
        log::info!("Open with: rerun {}", path.display());
    }
    Ok(())
}
