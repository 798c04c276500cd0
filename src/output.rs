use anyhow::{Context, Result};
use galaxy_common::{OutputConfig, Snapshot, StarField};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Snapshot file encodings understood by the engine and the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    /// A `u32` snapshot count followed by each snapshot, as read by the visualizer.
    Bincode,
    MessagePack,
}

impl OutputFormat {
    /// Parses the `output.format` value. Unknown names fall back to JSON.
    pub fn from_config(format: Option<&str>) -> Self {
        match format.unwrap_or("json") {
            "json" => OutputFormat::Json,
            "bincode" => OutputFormat::Bincode,
            "messagepack" => OutputFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                OutputFormat::Json
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes `snapshots` next to `output.base_filename` and returns the file path.
pub fn save_snapshots(snapshots: &[Snapshot], output: &OutputConfig) -> Result<PathBuf> {
    let format = OutputFormat::from_config(output.format.as_deref());
    let filename = PathBuf::from(format!("{}_snapshots.{}", output.base_filename, format.extension()));
    let file = File::create(&filename)
        .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, snapshots).context("Error serializing snapshots to JSON")?;
        }
        OutputFormat::Bincode => {
            bincode::serialize_into(&mut writer, &(snapshots.len() as u32))
                .context("Error writing snapshot count header")?;
            for snapshot in snapshots {
                bincode::serialize_into(&mut writer, snapshot)
                    .with_context(|| format!("Error serializing snapshot {} to bincode", snapshot.index))?;
            }
        }
        OutputFormat::MessagePack => {
            rmp_serde::encode::write(&mut writer, snapshots)
                .context("Error serializing snapshots to MessagePack")?;
        }
    }
    writer.flush()?;

    info!("{} snapshots saved to {} ({:?} format)", snapshots.len(), filename.display(), format);
    Ok(filename)
}

/// Writes one `x,y,z,age` row per star.
pub fn save_positions_csv<P: AsRef<Path>>(field: &StarField, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["x", "y", "z", "age"])?;
    for ((x, y, z), age) in field.positions().zip(field.age.iter()) {
        writer.write_record(&[
            format!("{:.4}", x),
            format!("{:.4}", y),
            format!("{:.4}", z),
            format!("{:.4}", age),
        ])?;
    }
    writer.flush()?;
    info!("Final positions saved to {}", path.display());
    Ok(())
}
