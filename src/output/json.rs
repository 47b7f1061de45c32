//! JSON profile output writer.
//!
//! Writes Profile structs to JSON files with proper formatting.

use super::schema::Profile;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a profile to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_profile(profile: &Profile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing profile to: {}", output_path.display());

    validate_output_path(output_path)?;
    create_parent_dirs(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, profile)?;
    writer.flush()?;

    info!(
        "Profile written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a profile to a pretty-printed string
///
/// **Public** - used when the profile goes to stdout
pub fn profile_to_string(profile: &Profile) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(profile)?)
}

/// Read a profile from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_profile(input_path: impl AsRef<Path>) -> Result<Profile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile from: {}", input_path.display());

    let file = File::open(input_path)?;
    let profile: Profile = serde_json::from_reader(file)?;

    debug!(
        "Profile loaded: version {}, {} command(s)",
        profile.version,
        profile.commands.len()
    );

    Ok(profile)
}

/// Validate that output path is writable
///
/// **Crate** - shared by every file writer
pub(crate) fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create missing parent directories of an output file
pub(crate) fn create_parent_dirs(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::schema::{ProfileNode, TimeSummary};
    use tempfile::NamedTempFile;

    fn create_test_profile() -> Profile {
        let time = TimeSummary { min: 40, max: 40, sum: 40 };
        Profile {
            version: "1.0.0".to_string(),
            commands: vec!["/srv/index.php".to_string()],
            total_time: 40,
            max_self_time: 40,
            max_call_count: 1,
            total_call_count: 1,
            root: ProfileNode {
                label: "root".to_string(),
                file: None,
                function: None,
                call_count: 1,
                self_time: TimeSummary { min: 0, max: 0, sum: 0 },
                inclusive_time: time,
                children: vec![ProfileNode {
                    label: "{main}".to_string(),
                    file: Some("/srv/index.php".to_string()),
                    function: Some("{main}".to_string()),
                    call_count: 1,
                    self_time: time,
                    inclusive_time: time,
                    children: Vec::new(),
                }],
            },
            functions: Vec::new(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_profile() {
        let profile = create_test_profile();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_profile(&profile, path).unwrap();
        let loaded = read_profile(path).unwrap();

        assert_eq!(loaded.version, profile.version);
        assert_eq!(loaded.commands, profile.commands);
        assert_eq!(loaded.total_time, 40);
        assert_eq!(loaded.root.children[0].label, "{main}");
    }

    #[test]
    fn test_profile_to_string_omits_empty_fields() {
        let json = profile_to_string(&create_test_profile()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["root"].get("file").is_none());
        assert!(value.get("functions").is_none());
        assert!(value["root"]["children"][0].get("children").is_none());
        assert_eq!(value["root"]["children"][0]["self_time"]["sum"], 40);
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/profile.json");

        write_profile(&create_test_profile(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
