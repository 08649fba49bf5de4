use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facematch::{config, matcher, overlay, storage, video, Descriptor, Feature, Session};
use facematch_vision::{DetectorOptions, RecordedAnalyzer};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "facematch")]
#[command(
    version,
    about = "Compare face descriptors against a reference face and draw analysis overlays"
)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long = "config", global = true)]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the first reference face against every candidate face
    Compare {
        /// Recorded frame holding the reference face
        #[arg(short, long)]
        reference: PathBuf,
        /// Recorded frame holding the candidate faces
        #[arg(short, long)]
        candidates: PathBuf,
        /// Override the configured match threshold
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store the first face of a recorded frame as the reference
    Enroll {
        /// Recorded frame holding the reference face
        frame: PathBuf,
    },
    /// Remove the stored reference
    Clear,
    /// Run the detection cycle over a directory of recorded frames
    Replay {
        /// Directory of recorded frames
        dir: PathBuf,
        /// Features to enable (detection, landmarks, expressions, age-gender, face-match)
        #[arg(short, long = "enable", default_value = "face-match")]
        features: Vec<Feature>,
        /// Write rendered overlays as PNG files into this directory
        #[arg(long)]
        render: Option<PathBuf>,
        /// Wait the configured interval between frames
        #[arg(long)]
        realtime: bool,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config_path.as_deref())?;

    match cli.command {
        Commands::Compare {
            reference,
            candidates,
            threshold,
            json,
        } => compare(
            &cfg,
            &reference,
            &candidates,
            threshold.unwrap_or(cfg.threshold),
            json,
        ),
        Commands::Enroll { frame } => enroll(&cfg, &frame),
        Commands::Clear => clear(&cfg),
        Commands::Replay {
            dir,
            features,
            render,
            realtime,
        } => replay(&cfg, &dir, &features, render.as_deref(), realtime),
        Commands::Config => open_config(cli.config_path.as_deref()),
    }
}

fn descriptors(path: &Path, options: &DetectorOptions) -> Result<Vec<Descriptor>> {
    let faces = video::load_confident_faces(path, options)
        .with_context(|| format!("loading faces from {}", path.display()))?;
    Ok(faces.into_iter().map(|f| f.descriptor).collect())
}

fn compare(
    cfg: &config::Config,
    reference: &Path,
    candidates: &Path,
    threshold: f32,
    json: bool,
) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        anyhow::bail!("threshold must be a non-negative number, got {}", threshold);
    }

    let options = cfg.detector_options();
    let references = descriptors(reference, &options)?;
    let candidates = descriptors(candidates, &options)?;

    if references.is_empty() {
        warn!("No face found in reference {}", reference.display());
    }
    if candidates.is_empty() {
        warn!("No candidate faces found");
    }

    let results = matcher::compare_first(&references, &candidates, threshold)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}", result);
        }
    }

    Ok(())
}

fn enroll(cfg: &config::Config, frame: &Path) -> Result<()> {
    info!("Enrolling reference from: {}", frame.display());

    let faces = video::load_confident_faces(frame, &cfg.detector_options())
        .with_context(|| format!("loading faces from {}", frame.display()))?;

    let Some(face) = faces.first() else {
        anyhow::bail!("No face found in {}", frame.display());
    };
    if faces.len() > 1 {
        info!("{} faces found, using the first", faces.len());
    }

    let record = storage::ReferenceRecord::new(frame.display().to_string(), &face.descriptor);
    storage::save_reference(&cfg.store, &record).context("Failed to save reference")?;

    info!(
        "✓ Reference enrolled ({} dimensions, id {})",
        record.descriptor.len(),
        record.id
    );
    Ok(())
}

fn clear(cfg: &config::Config) -> Result<()> {
    if storage::clear_reference(&cfg.store).context("Failed to clear reference")? {
        info!("✓ Reference cleared");
    } else {
        info!("No reference enrolled");
    }
    Ok(())
}

fn replay(
    cfg: &config::Config,
    dir: &Path,
    features: &[Feature],
    render: Option<&Path>,
    realtime: bool,
) -> Result<()> {
    let mut session = Session::new(RecordedAnalyzer::new(), cfg);
    for &feature in features {
        if !session.mode().is_enabled(feature) {
            session.toggle(feature);
        }
    }

    if let Some(record) = storage::load_reference(&cfg.store)? {
        info!("Using reference from {}", record.source);
        session.set_reference_descriptor(record.descriptor());
    } else if session.mode().face_match {
        warn!("No reference enrolled. Run 'enroll' first to get match results.");
    }

    if let Some(out) = render {
        std::fs::create_dir_all(out)
            .with_context(|| format!("creating {}", out.display()))?;
    }

    let playback = video::Playback::open(dir)?;
    info!("Replaying {} frame(s) from {}", playback.remaining(), dir.display());

    let (width, height) = cfg.display_size();
    for frame in playback {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warn!("Skipping frame: {:#}", e);
                continue;
            }
        };

        session.analyzer_mut().push(frame.faces);
        let Some(cycle) = session.run_cycle(&frame.image) else {
            continue;
        };

        for text in cycle.overlays.iter().filter_map(|o| o.text()) {
            info!("{}: {}", frame.name, text);
        }
        if let Some(results) = &cycle.recognition {
            for result in results {
                info!("{}: {}", frame.name, result);
            }
        }

        if let Some(out) = render {
            let mut canvas = frame
                .image
                .resize_exact(width, height, image::imageops::FilterType::Triangle)
                .to_rgb8();
            overlay::render(&mut canvas, &cycle.overlays);
            let path = out.join(format!("{}.png", frame.name));
            canvas
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
        }

        if realtime {
            std::thread::sleep(session.interval());
        }
    }

    match session.recognition_results() {
        Some(results) => {
            info!("Recognition results:");
            for result in results {
                info!("  {}", result);
            }
        }
        None => info!("No recognition results"),
    }

    Ok(())
}

fn open_config(path: Option<&Path>) -> Result<()> {
    let config_path = path.unwrap_or(config::CONFIG_PATH.as_path());
    if !config_path.exists() {
        config::save_config(&config::Config::default(), Some(config_path))
            .context("Failed to write default config")?;
    }
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
