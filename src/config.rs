use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::analysis::AnalysisClientConfig;
use crate::capture::{CameraConstraints, CameraSource, FacingMode};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub inference: InferenceConfig,
    pub camera: CameraConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub base_url: String,
    /// Unset means requests wait indefinitely
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    /// `synthetic` or `file`
    pub source: String,
    /// Image file or directory for the `file` source
    pub path: Option<String>,
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    /// External text-to-speech program; console output when unset
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayConfig {
    /// Where the CLI saves the overlay after each detection
    pub output_path: Option<String>,
}

impl Config {
    /// Load from `path` (any format the `config` crate knows, extension optional),
    /// falling back to defaults, then apply `LIFELENS__SECTION__KEY` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "lifelens")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8085)?
            .set_default("inference.base_url", "http://127.0.0.1:5000")?
            .set_default("camera.source", "synthetic")?
            .set_default("camera.facing_mode", "environment")?
            .set_default("camera.width", 1280)?
            .set_default("camera.height", 720)?
            .set_default("camera.jpeg_quality", 85)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LIFELENS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn camera_source(&self) -> Result<CameraSource> {
        match self.camera.source.as_str() {
            "synthetic" => Ok(CameraSource::Synthetic),
            "file" => match &self.camera.path {
                Some(path) => Ok(CameraSource::File(PathBuf::from(path))),
                None => bail!("camera.source = \"file\" requires camera.path"),
            },
            other => bail!("Unknown camera source '{}' (expected synthetic or file)", other),
        }
    }

    pub fn camera_constraints(&self) -> CameraConstraints {
        CameraConstraints {
            facing_mode: self.camera.facing_mode,
            width: self.camera.width,
            height: self.camera.height,
        }
    }

    pub fn analysis_client(&self) -> AnalysisClientConfig {
        AnalysisClientConfig {
            base_url: self.inference.base_url.clone(),
            request_timeout: self.inference.request_timeout_secs.map(Duration::from_secs),
        }
    }
}
