use serde::{Deserialize, Serialize};

/// Scanner settings from `qrscan.yaml`
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Which camera to open when a surface is attached
    #[serde(default)]
    pub camera: CameraKind,

    /// Trigger the camera's autofocus before every scan attempt, when supported
    #[serde(default = "default_autofocus")]
    pub autofocus: bool,

    /// What to do when a decode attempt fails with something other than "not found"
    #[serde(default)]
    pub decode_fault: FaultPolicy,

    /// Buffer size of the notification broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            camera: CameraKind::default(),
            autofocus: default_autofocus(),
            decode_fault: FaultPolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_autofocus() -> bool {
    true
}

fn default_event_capacity() -> usize {
    100
}

/// Physical camera to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraKind {
    #[default]
    Primary,
    FrontFacing,
}

/// Handling of unexpected decode faults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop scanning and release the camera and decoder, then report the fault
    #[default]
    Stop,

    /// Report the fault and keep scanning on the next turn
    Retry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_config_defaults() {
        let config = ScannerConfig::default();
        assert_eq!(config.camera, CameraKind::Primary);
        assert!(config.autofocus);
        assert_eq!(config.decode_fault, FaultPolicy::Stop);
        assert_eq!(config.event_capacity, 100);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ScannerConfig = serde_yaml_ng::from_str("autofocus: false\n").unwrap();
        assert!(!config.autofocus);
        assert_eq!(config.camera, CameraKind::Primary);
        assert_eq!(config.decode_fault, FaultPolicy::Stop);
    }

    #[test]
    fn test_enum_names_are_snake_case() {
        let yaml = "camera: front_facing\ndecode_fault: retry\n";
        let config: ScannerConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.camera, CameraKind::FrontFacing);
        assert_eq!(config.decode_fault, FaultPolicy::Retry);
    }
}
