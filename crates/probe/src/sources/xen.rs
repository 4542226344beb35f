use hostcaps_core::{CapabilityStringSource, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Guest capability string exported by the hypervisor through sysfs.
pub struct XenSysfsCapabilities {
    path: PathBuf,
}

impl XenSysfsCapabilities {
    pub fn new(sysfs_root: &Path) -> Self {
        Self {
            path: sysfs_root.join("hypervisor/properties/capabilities"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CapabilityStringSource for XenSysfsCapabilities {
    fn capabilities(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No hypervisor capabilities exported");
            return Ok(None);
        }

        let caps = fs::read_to_string(&self.path).map_err(|e| {
            Error::Query(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let caps = caps.trim();
        Ok((!caps.is_empty()).then(|| caps.to_string()))
    }
}

/// A fixed capability string, e.g. from configuration.
pub struct StaticCapabilities(pub String);

impl CapabilityStringSource for StaticCapabilities {
    fn capabilities(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_trimmed_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let source = XenSysfsCapabilities::new(dir.path());
        fs::create_dir_all(source.path().parent().unwrap()).unwrap();
        fs::write(source.path(), "xen-3.0-x86_64 hvm-3.0-x86_64\n").unwrap();

        assert_eq!(
            source.capabilities().unwrap().as_deref(),
            Some("xen-3.0-x86_64 hvm-3.0-x86_64")
        );
    }

    #[test]
    fn missing_file_is_no_string() {
        let dir = tempfile::tempdir().unwrap();
        let source = XenSysfsCapabilities::new(dir.path());
        assert!(source.capabilities().unwrap().is_none());
    }

    #[test]
    fn blank_file_is_no_string() {
        let dir = tempfile::tempdir().unwrap();
        let source = XenSysfsCapabilities::new(dir.path());
        fs::create_dir_all(source.path().parent().unwrap()).unwrap();
        fs::write(source.path(), "\n").unwrap();
        assert!(source.capabilities().unwrap().is_none());
    }

    #[test]
    fn static_source_returns_string() {
        let source = StaticCapabilities("xen-3.0-x86_64".to_string());
        assert_eq!(
            source.capabilities().unwrap().as_deref(),
            Some("xen-3.0-x86_64")
        );
    }
}
