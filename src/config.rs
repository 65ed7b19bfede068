use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How to reach the viewer and what to show in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// `host:port` of the viewer server
    pub address: String,
    pub root_node_name: String,
    pub window_name: String,
    /// Create the window and load the robot right after connecting
    pub load_model: bool,
    /// Where the viewer finds meshes. Defaults to the directory of the URDF.
    pub mesh_dir: Option<String>,
    /// 0 waits forever
    pub connect_timeout_ms: u64,
    /// 0 waits forever
    pub read_timeout_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:12321".to_string(),
            root_node_name: "world/pinocchio".to_string(),
            window_name: "pinocchio".to_string(),
            load_model: false,
            mesh_dir: None,
            connect_timeout_ms: 1000,
            read_timeout_ms: 5000,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        timeout(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        timeout(self.read_timeout_ms)
    }
}

fn timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::util::test_utils::scratch_dir;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ViewerConfig::from_json_str(r#"{"load_model": true}"#).unwrap();

        assert!(config.load_model);
        assert_eq!(config.root_node_name, "world/pinocchio");
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn zero_timeouts_wait_forever() {
        let config =
            ViewerConfig::from_json_str(r#"{"connect_timeout_ms": 0, "read_timeout_ms": 0}"#)
                .unwrap();

        assert_eq!(config.connect_timeout(), None);
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn reads_file() {
        // Arrange
        let path = scratch_dir("viewer_config").join("viewer.json");
        fs::write(
            &path,
            r#"{"address": "10.0.0.2:4000", "window_name": "arm", "mesh_dir": "/opt/meshes/"}"#,
        )
        .unwrap();

        // Act
        let config = ViewerConfig::from_file(&path).unwrap();

        // Assert
        assert_eq!(config.address, "10.0.0.2:4000");
        assert_eq!(config.window_name, "arm");
        assert_eq!(config.mesh_dir.as_deref(), Some("/opt/meshes/"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = ViewerConfig::from_json_str("{ address = 1 }");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
