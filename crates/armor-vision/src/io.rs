//! JSON configuration and report helpers for armor detection.

use std::{
    fs,
    path::{Path, PathBuf},
};

use armor_vision_core::{Armor, ArmorSize, DepthUnavailable, FrameHeader};
use armor_vision_detector::{DebugArmor, DebugLight};
use serde::{Deserialize, Serialize};

use crate::output::FrameOutput;
use crate::params::PipelineParams;

#[derive(thiserror::Error, Debug)]
pub enum ArmorIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for a single-image detection run, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorDetectConfig {
    pub image_path: String,
    /// 16-bit depth image in millimeters, aligned with the color image.
    #[serde(default)]
    pub depth_path: Option<String>,
    /// Row-major 3x3 camera matrix.
    #[serde(default)]
    pub camera_matrix: Option<[f64; 9]>,
    pub model_path: String,
    pub label_path: String,
    #[serde(default)]
    pub params: PipelineParams,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Where to write the binary mask and number montage when `debug` is on.
    #[serde(default)]
    pub debug_dir: Option<String>,
}

impl ArmorDetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ArmorIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ArmorIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("armor_detect_report.json"))
    }
}

/// One armor as written to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorRecord {
    pub center: [f32; 2],
    /// Left bottom, left top, right top, right bottom.
    pub corners: [[f32; 2]; 4],
    pub size: ArmorSize,
    pub label: Option<String>,
    pub confidence: f32,
    pub classification: String,
    /// Camera-frame position in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_unavailable: Option<DepthUnavailable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_center: Option<f32>,
}

impl From<&Armor> for ArmorRecord {
    fn from(a: &Armor) -> Self {
        let (position, depth_unavailable) = match a.position {
            Some(Ok(p)) => (Some([p.x, p.y, p.z]), None),
            Some(Err(reason)) => (None, Some(reason)),
            None => (None, None),
        };
        Self {
            center: [a.center.x, a.center.y],
            corners: a.corners().map(|p| [p.x, p.y]),
            size: a.size,
            label: a.label.clone(),
            confidence: a.confidence,
            classification: a.classification_result(),
            position,
            depth_unavailable,
            distance_to_center: a.distance_to_center,
        }
    }
}

/// Full report of a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorDetectReport {
    pub image_path: String,
    pub header: FrameHeader,
    /// Closest to the image center first.
    pub armors: Vec<ArmorRecord>,
    #[serde(default)]
    pub debug_lights: Vec<DebugLight>,
    #[serde(default)]
    pub debug_armors: Vec<DebugArmor>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

impl ArmorDetectReport {
    pub fn from_output(image_path: impl Into<String>, output: &FrameOutput) -> Self {
        let (debug_lights, debug_armors, latency_ms) = match &output.debug {
            Some(d) => (d.lights.clone(), d.armors.clone(), Some(d.latency_ms)),
            None => (Vec::new(), Vec::new(), None),
        };
        Self {
            image_path: image_path.into(),
            header: output.header.clone(),
            armors: output
                .prioritized()
                .into_iter()
                .map(ArmorRecord::from)
                .collect(),
            debug_lights,
            debug_armors,
            latency_ms,
        }
    }

    /// Load a JSON report from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ArmorIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ArmorIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
