//! Result Rendering
//!
//! The seam between a closed poll and whatever draws it. The default
//! implementation writes the tally as a timestamped CSV data file; a
//! graphical renderer plugs in behind the same trait and adds an image
//! path to the artifact.

use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing a results artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Tally handed to a renderer when a poll closes.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Poll prompt, used as the artifact title.
    pub title: String,
    /// Answer text and vote count, in ballot order.
    pub counts: Vec<(String, u32)>,
}

/// Files produced by a renderer, passed through unmodified to the display
/// channel.
#[derive(Debug, Clone)]
pub struct RenderArtifact {
    /// Raw results data file.
    pub data_path: PathBuf,
    /// Optional graphical summary.
    pub image_path: Option<PathBuf>,
}

/// Renderer collaborator for closed-poll results.
pub trait TallyRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderArtifact, RenderError>;
}

/// Writes `<timestamp>-<slugged-title>.csv` into a target directory.
#[derive(Debug)]
pub struct CsvRenderer {
    out_dir: PathBuf,
}

impl CsvRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl TallyRenderer for CsvRenderer {
    fn render(&self, request: &RenderRequest) -> Result<RenderArtifact, RenderError> {
        fs::create_dir_all(&self.out_dir)?;
        let data_path = self
            .out_dir
            .join(format!("{}.csv", artifact_stem(&request.title)));

        let mut file = fs::File::create(&data_path)?;
        writeln!(file, "# {}", request.title)?;
        for (answer, count) in &request.counts {
            writeln!(file, "{answer},{count}")?;
        }

        Ok(RenderArtifact {
            data_path,
            image_path: None,
        })
    }
}

/// Timestamp plus the title with separators flattened, capped at 20 chars.
fn artifact_stem(title: &str) -> String {
    let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
    let slug: String = title
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .take(20)
        .collect();
    format!("{stamp}-{slug}")
}
