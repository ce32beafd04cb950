use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use thiserror::Error;

use crate::inventory::load_inventory;
use crate::render::Renderer;
use crate::types::Device;
use crate::validate::{validate_devices, BatchPolicy};

const CONFIG_FILE_EXT: &str = "cfg";
const BANNER_WIDTH: usize = 60;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No device found with hostname '{0}'")]
    NoMatchingDevice(String),
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub inventory: PathBuf,
    pub templates_dir: PathBuf,
    /// Only render the device with this exact hostname.
    pub device: Option<String>,
    pub policy: BatchPolicy,
}

/// Destination for rendered configurations.
pub trait ConfigSink {
    /// Called once, after the inventory is validated and before the first device is rendered.
    fn prepare(&mut self) -> Result<(), anyhow::Error> {
        Ok(())
    }

    fn emit(&mut self, device: &Device, config: &str) -> Result<(), anyhow::Error>;
}

/// Writes each configuration behind a banner naming the device, without persisting anything.
pub struct PreviewSink<W: Write> {
    writer: W,
}

impl<W: Write> PreviewSink<W> {
    pub fn new(writer: W) -> Self {
        PreviewSink { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ConfigSink for PreviewSink<W> {
    fn emit(&mut self, device: &Device, config: &str) -> Result<(), anyhow::Error> {
        let separator = "=".repeat(BANNER_WIDTH);

        writeln!(self.writer, "\n{separator}")?;
        writeln!(
            self.writer,
            "  Device: {}  |  Type: {}",
            device.hostname, device.device_type
        )?;
        writeln!(self.writer, "{separator}")?;
        writeln!(self.writer, "{config}")?;

        Ok(())
    }
}

/// Stores each configuration as `<hostname>.cfg` in the output directory.
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        FileSink {
            output_dir: output_dir.into(),
        }
    }
}

impl ConfigSink for FileSink {
    fn prepare(&mut self) -> Result<(), anyhow::Error> {
        fs::create_dir_all(&self.output_dir).with_context(|| "Creating output dir")
    }

    fn emit(&mut self, device: &Device, config: &str) -> Result<(), anyhow::Error> {
        let path = write_config(&self.output_dir, &device.hostname, config)?;
        info!("[{}] Saved -> {path:?}", device.hostname);

        Ok(())
    }
}

fn write_config(
    output_dir: &Path,
    hostname: &str,
    config: &str,
) -> Result<PathBuf, anyhow::Error> {
    let path = output_dir.join(format!("{hostname}.{CONFIG_FILE_EXT}"));
    fs::write(&path, config).with_context(|| "Writing config file")?;

    Ok(path)
}

/// Load, validate and render the inventory, emitting every selected device to `sink`.
///
/// Returns the number of rendered devices. The first failure aborts the run.
pub(crate) fn generate(
    options: &GenerateOptions,
    sink: &mut dyn ConfigSink,
) -> Result<usize, anyhow::Error> {
    info!("Loading inventory from: {:?}", options.inventory);
    let records = load_inventory(&options.inventory)?;

    info!("Validating {} device(s)...", records.len());
    let devices = validate_devices(&records, options.policy)?;
    let devices = select_devices(devices, options.device.as_deref())?;

    let renderer = Renderer::new(&options.templates_dir)?;
    sink.prepare()?;

    let mut generated = 0;
    for device in &devices {
        info!(
            "[{}] Rendering config (type={})...",
            device.hostname, device.device_type
        );
        let config = renderer.render(device)?;
        sink.emit(device, &config)
            .with_context(|| format!("Emitting config for {}", device.hostname))?;

        generated += 1;
    }

    Ok(generated)
}

fn select_devices(
    devices: Vec<Device>,
    hostname: Option<&str>,
) -> Result<Vec<Device>, GenerateError> {
    let Some(hostname) = hostname else {
        return Ok(devices);
    };

    let selected: Vec<Device> = devices
        .into_iter()
        .filter(|d| d.hostname == hostname)
        .collect();

    if selected.is_empty() {
        return Err(GenerateError::NoMatchingDevice(hostname.to_string()));
    }

    Ok(selected)
}
