use std::path::Path;
use std::process::Command;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::{
    error::{RenditionError, Result},
    traits::{BackgroundRemover, GarmentClassifier},
    types::SourceImage,
};

/// Matting model run as an external program.
///
/// Invoked as `<program> <args..> --input <png> --output <png>`; the program
/// must write an RGBA PNG of the same size to the output path.
#[derive(Debug, Clone)]
pub struct CommandBackgroundRemover {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandBackgroundRemover {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl BackgroundRemover for CommandBackgroundRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let input = temp_png()?;
        let output = temp_png()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--input")
            .arg(input.path())
            .arg("--output")
            .arg(output.path());

        run(&mut cmd).map_err(RenditionError::Matting)?;

        let cutout = image::open(output.path())
            .map_err(|e| RenditionError::Matting(format!("unreadable cutout: {}", e)))?;
        Ok(cutout.to_rgba8())
    }
}

/// Garment classifier run as an external program.
///
/// Invoked as `<program> <args..> --input <image>`; the label is read from stdout.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn classify_file(&self, path: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg("--input").arg(path);

        let stdout = run(&mut cmd).map_err(RenditionError::Classification)?;
        let label = stdout.trim();
        if label.is_empty() {
            return Err(RenditionError::Classification(
                "classifier printed no label".to_string(),
            ));
        }
        Ok(label.to_string())
    }
}

impl GarmentClassifier for CommandClassifier {
    fn classify(&self, image: &SourceImage) -> Result<String> {
        if let Some(path) = image.path() {
            return self.classify_file(path);
        }

        let temp = temp_png()?;
        image.image.save_with_format(temp.path(), ImageFormat::Png)?;
        self.classify_file(temp.path())
    }
}

fn temp_png() -> Result<tempfile::NamedTempFile> {
    Ok(tempfile::Builder::new().suffix(".png").tempfile()?)
}

/// Run the command to completion, returning stdout or a message describing the failure
fn run(cmd: &mut Command) -> std::result::Result<String, String> {
    debug!(command = ?cmd, "running model command");

    let output = cmd
        .output()
        .map_err(|e| format!("failed to launch {:?}: {}", cmd.get_program(), e))?;

    if !output.status.success() {
        return Err(format!(
            "{:?} exited with {}: {}",
            cmd.get_program(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
