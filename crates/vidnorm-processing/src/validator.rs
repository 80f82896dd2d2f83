use std::path::Path;

use vidnorm_core::ContainerFormat;

/// Validation errors for uploaded video files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing file extension: {filename}")]
    MissingExtension { filename: String },

    #[error("Unsupported format: {extension} (allowed: {allowed:?})")]
    UnsupportedFormat {
        extension: String,
        allowed: &'static [&'static str],
    },

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },
}

/// Upload validator.
///
/// Runs before an identifier is allocated or any byte is persisted, so a
/// rejected request leaves zero filesystem trace.
pub struct FormatValidator {
    max_file_size: usize,
}

impl FormatValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Check the claimed filename: the substring after the final `.`,
    /// lowercased, must be in the container allow-list.
    pub fn validate_filename(&self, filename: &str) -> Result<ContainerFormat, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension {
                filename: filename.to_string(),
            })?;

        ContainerFormat::from_extension(&extension).ok_or(ValidationError::UnsupportedFormat {
            extension,
            allowed: ContainerFormat::ALLOWED_EXTENSIONS,
        })
    }

    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate size and filename together.
    pub fn validate(&self, filename: &str, size: usize) -> Result<ContainerFormat, ValidationError> {
        self.validate_size(size)?;
        self.validate_filename(filename)
    }
}
