use anyhow::{Context, Result};
use clap::Parser;
use dashmap::DashMap;
use env_logger::Builder;
use galaxy_common::{Snapshot, Trace};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn, LevelFilter};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod render;
mod video;

use render::draw_figure;
use video::{rgba_to_yuv420, VideoWriter};

/// Renders a recorded galaxy session into an MP4 video.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input snapshot file path (.bin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path (.mp4)
    #[arg(short, long, default_value = "galaxy_video.mp4")]
    output: PathBuf,

    /// Also write every frame as a PNG into this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Width of the output video in pixels (defaults to the figure width)
    #[arg(long)]
    width: Option<u32>,

    /// Height of the output video in pixels (defaults to the figure height)
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Snapshots rendered per parallel work item
    #[arg(long, default_value_t = 10)]
    chunk_size: usize,

    /// Multiplier applied to marker sizes when drawing
    #[arg(long, default_value_t = 1.0)]
    point_scale: f32,
}

/// Reads the engine's bincode stream: a `u32` count followed by that many snapshots.
/// A truncated stream yields the snapshots read so far.
fn load_snapshots<R: Read>(mut reader: R) -> Result<Vec<Snapshot>> {
    let snapshot_count: u32 = bincode::deserialize_from(&mut reader)
        .context("Failed to read snapshot count from header")?;
    info!("Found {} snapshots in the file", snapshot_count);

    let mut snapshots = Vec::with_capacity(snapshot_count as usize);
    for i in 0..snapshot_count {
        match bincode::deserialize_from::<_, Snapshot>(&mut reader) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                error!("Error deserializing snapshot {}: {}", i, e);
                warn!("Only {} of {} snapshots could be read.", snapshots.len(), snapshot_count);
                break;
            }
        }
    }
    Ok(snapshots)
}

/// H.264 needs even frame dimensions.
fn even_dimension(value: u32) -> u32 {
    (value / 2 * 2).max(2)
}

fn progress_bar(len: u64, template: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

fn main() -> Result<()> {
    let args = Args::parse();
    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    Builder::from_default_env().filter(None, LevelFilter::Info).init();

    info!("Starting Galaxy Visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output video: {}", args.output.display());

    let input_file = File::open(&args.input)
        .with_context(|| format!("Failed to open input file: {}", args.input.display()))?;
    let snapshots = load_snapshots(BufReader::new(input_file))?;
    let Some(first) = snapshots.first() else {
        warn!("Input file contains no snapshots. Exiting.");
        return Ok(());
    };

    let requested_width = args.width.unwrap_or(first.figure.layout.width);
    let requested_height = args.height.unwrap_or(first.figure.layout.height);
    let width = even_dimension(requested_width);
    let height = even_dimension(requested_height);
    if (width, height) != (requested_width, requested_height) {
        warn!(
            "Frame size {}x{} adjusted to {}x{} for H.264.",
            requested_width, requested_height, width, height
        );
    }
    info!("Video dimensions: {}x{} at {} FPS", width, height, args.fps);
    info!("First snapshot: {}", describe_snapshot(first));

    if let Some(dir) = &args.frames_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create frames directory {}", dir.display()))?;
    }

    // --- Render frames in parallel ---
    let start_time = Instant::now();
    let chunk_size = args.chunk_size.max(1);
    let frames = DashMap::new();
    let render_progress = progress_bar(
        snapshots.len() as u64,
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]",
    )?;

    snapshots
        .par_chunks(chunk_size)
        .enumerate()
        .try_for_each(|(chunk_idx, chunk)| -> Result<()> {
            for (i, snapshot) in chunk.iter().enumerate() {
                let frame_index = chunk_idx * chunk_size + i;
                let image = draw_figure(&snapshot.figure, width, height, args.point_scale);
                if let Some(dir) = &args.frames_dir {
                    save_frame(&image, dir, frame_index)?;
                }
                frames.insert(frame_index, image);
            }
            render_progress.inc(chunk.len() as u64);
            Ok(())
        })?;
    render_progress.finish_with_message("Rendered all frames");

    // --- Encode in order ---
    info!("Encoding frames in sequence...");
    let mut writer = VideoWriter::new(width, height, args.fps)?;
    let encode_progress = progress_bar(
        frames.len() as u64,
        "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} encoded ({percent}%) [{eta}]",
    )?;

    const ENCODE_BATCH_SIZE: usize = 30;
    let mut sorted_keys: Vec<usize> = frames.iter().map(|entry| *entry.key()).collect();
    sorted_keys.sort_unstable();
    let mut failed_frames = Vec::new();

    for batch in sorted_keys.chunks(ENCODE_BATCH_SIZE) {
        let yuv_frames: Vec<_> = batch
            .par_iter()
            .filter_map(|key| frames.remove(key).map(|(key, image)| (key, rgba_to_yuv420(&image))))
            .collect();
        for (key, yuv) in yuv_frames {
            if let Err(e) = writer.encode(yuv) {
                error!("Error encoding frame {}: {}", key, e);
                failed_frames.push(key);
            }
            encode_progress.inc(1);
        }
    }
    encode_progress.finish_with_message("Encoded all frames");
    if let Some(message) = lost_frames_warning(&failed_frames, sorted_keys.len()) {
        warn!("{}", message);
    }

    let description = format!("Galaxy session - {} stars", first.figure.point_count());
    let frame_count = writer.finish(&args.output, &description)?;

    let duration = start_time.elapsed();
    info!(
        "Video generation completed in {:.2?} ({:.1} frames per second)",
        duration,
        frame_count as f64 / duration.as_secs_f64()
    );
    info!("Output saved to: {}", args.output.display());
    Ok(())
}

/// One-line summary of a snapshot: label, star count, colour scale and title.
fn describe_snapshot(snapshot: &Snapshot) -> String {
    let colorscale = snapshot.figure.data.first().map(|trace| match trace {
        Trace::Scatter3d(scatter) => scatter.marker.colorscale.name(),
    });
    format!(
        "'{}' with {} stars, colorscale {} ({})",
        snapshot.label,
        snapshot.figure.point_count(),
        colorscale.unwrap_or("none"),
        snapshot.figure.layout.title
    )
}

fn lost_frames_warning(failed: &[usize], total: usize) -> Option<String> {
    let first = failed.iter().min()?;
    Some(format!(
        "{} of {} frames failed to encode and are missing from the video (first lost frame: {}).",
        failed.len(),
        total,
        first
    ))
}

fn save_frame(image: &image::RgbaImage, dir: &Path, index: usize) -> Result<()> {
    let path = dir.join(format!("frame_{:05}.png", index));
    image
        .save(&path)
        .with_context(|| format!("Failed to save frame {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_common::{ColorScale, Figure, Marker, Mode, Scatter3d, SimulationParameters};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn snapshot(index: u32) -> Snapshot {
        Snapshot {
            index,
            label: format!("frame {}", index),
            parameters: SimulationParameters::default(),
            figure: Figure::new(),
        }
    }

    fn stream(snapshots: &[Snapshot], header: u32) -> Vec<u8> {
        let mut bytes = bincode::serialize(&header).unwrap();
        for s in snapshots {
            bytes.extend(bincode::serialize(s).unwrap());
        }
        bytes
    }

    #[test]
    fn test_load_snapshots_reads_count_header() {
        let bytes = stream(&[snapshot(0), snapshot(1), snapshot(2)], 3);
        let loaded = load_snapshots(Cursor::new(bytes)).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[2].label, "frame 2");
    }

    #[test]
    fn test_truncated_stream_keeps_readable_snapshots() {
        let bytes = stream(&[snapshot(0)], 4);
        let loaded = load_snapshots(Cursor::new(bytes)).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(load_snapshots(Cursor::new(Vec::new())).is_err());
    }

    #[test]
    fn test_even_dimension() {
        assert_eq!(even_dimension(900), 900);
        assert_eq!(even_dimension(701), 700);
        assert_eq!(even_dimension(1), 2);
    }

    #[test]
    fn test_describe_snapshot_names_colorscale() {
        let mut first = snapshot(0);
        assert!(describe_snapshot(&first).contains("colorscale none"));

        first.figure.add_trace(Trace::Scatter3d(Scatter3d {
            x: vec![0.0; 3],
            y: vec![0.0; 3],
            z: vec![0.0; 3],
            mode: Mode::Markers,
            marker: Marker {
                size: 1.5,
                color: vec![0.1, 0.5, 0.9],
                colorscale: ColorScale::Viridis,
                opacity: 0.8,
            },
        }));
        let summary = describe_snapshot(&first);
        assert!(summary.contains("3 stars"), "{}", summary);
        assert!(summary.contains(ColorScale::Viridis.name()), "{}", summary);
    }

    #[test]
    fn test_lost_frames_are_reported() {
        assert_eq!(lost_frames_warning(&[], 10), None);
        let message = lost_frames_warning(&[7, 3], 10).unwrap();
        assert!(message.starts_with("2 of 10 frames"), "{}", message);
        assert!(message.contains("first lost frame: 3"), "{}", message);
    }

    #[test]
    fn test_save_frame_writes_png() {
        let dir = tempdir().unwrap();
        let image = draw_figure(&Figure::new(), 16, 16, 1.0);
        save_frame(&image, dir.path(), 7).unwrap();
        let reloaded = image::open(dir.path().join("frame_00007.png")).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (16, 16));
    }
}
