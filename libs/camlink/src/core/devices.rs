// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    Back,
    External,
}

/// One capture format a device supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFormat {
    pub photo_width: u32,
    pub photo_height: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub min_fps: f64,
    pub max_fps: f64,
    pub supports_video_hdr: bool,
    pub supports_photo_hdr: bool,
}

/// Capability record for one camera device, as reported across the
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
    pub has_flash: bool,
    pub has_torch: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub neutral_zoom: f64,
    pub supports_focus: bool,
    pub supports_raw_capture: bool,
    pub is_multi_cam: bool,
    pub formats: Vec<DeviceFormat>,
}

/// Enumerates camera devices via the platform camera service.
///
/// Enumeration fails only when the underlying system service is
/// unavailable; an empty device list is a valid result.
pub trait DeviceEnumerator: Send + Sync {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>>;
}

/// Enumerator stand-in for hosts without a platform camera service wired
/// in. Reports no devices.
pub struct DefaultDeviceEnumerator;

impl DeviceEnumerator for DefaultDeviceEnumerator {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>> {
        tracing::debug!("[devices] no platform enumerator installed, reporting none");
        Ok(Vec::new())
    }
}
