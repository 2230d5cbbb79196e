//! Video device discovery through sysfs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

const SYSFS_VIDEO_ROOT: &str = "/sys/class/video4linux";
const DEV_ROOT: &str = "/dev";

/// A V4L2 capture node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    /// Device node, e.g. `/dev/video0`.
    pub path: PathBuf,
    /// Human readable name reported by the driver.
    pub name: String,
    /// The `N` of `videoN`.
    pub index: u32,
}

/// Which way a camera faces, as far as its name tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Pointing away from the user.
    Environment,
    /// Pointing at the user.
    User,
}

impl Facing {
    fn hints(self) -> &'static [&'static str] {
        match self {
            Self::Environment => &["back", "rear", "world", "environment"],
            Self::User => &["front", "user", "face"],
        }
    }

    /// Check if a device name suggests this facing.
    #[must_use]
    pub fn matches_name(self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.hints().iter().any(|hint| name.contains(hint))
    }
}

/// List capture nodes on this system, ordered by index.
///
/// # Errors
///
/// Returns an error if sysfs exists but cannot be read.
pub fn list_devices() -> io::Result<Vec<VideoDevice>> {
    list_devices_in(Path::new(SYSFS_VIDEO_ROOT), Path::new(DEV_ROOT))
}

/// List capture nodes described under `sysfs_root`, with device paths under
/// `dev_root`.
///
/// Nodes whose `index` attribute is not 0 are metadata companions of another
/// node and are skipped. A missing `sysfs_root` means no devices.
///
/// # Errors
///
/// Returns an error if `sysfs_root` exists but cannot be read.
pub fn list_devices_in(sysfs_root: &Path, dev_root: &Path) -> io::Result<Vec<VideoDevice>> {
    let entries = match fs::read_dir(sysfs_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %sysfs_root.display(), "No video4linux class directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry?;
        let node = entry.file_name();
        let node = node.to_string_lossy();

        let Some(index) = node
            .strip_prefix("video")
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };

        let attrs = entry.path();
        if let Ok(node_index) = fs::read_to_string(attrs.join("index")) {
            if node_index.trim() != "0" {
                trace!(node = %node, "Skipping secondary video node");
                continue;
            }
        }

        let name = fs::read_to_string(attrs.join("name"))
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|_| node.to_string());

        devices.push(VideoDevice {
            path: dev_root.join(node.as_ref()),
            name,
            index,
        });
    }

    devices.sort_by_key(|d| d.index);
    debug!(count = devices.len(), "Discovered video devices");
    Ok(devices)
}

/// Pick the device to use for `facing`: the first whose name suggests it,
/// otherwise the lowest-index one.
#[must_use]
pub fn select_device(devices: &[VideoDevice], facing: Facing) -> Option<&VideoDevice> {
    devices
        .iter()
        .filter(|d| facing.matches_name(&d.name))
        .min_by_key(|d| d.index)
        .or_else(|| devices.iter().min_by_key(|d| d.index))
}
