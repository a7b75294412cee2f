//! crates/study_planner_core/src/attachments.rs
//!
//! Ingestion rules for the files a student drops onto the plan form.
//!
//! Each file may be at most 5 MB before encoding, and the base64 payloads of
//! all accepted files together may not exceed 15 MB. A rejected file never
//! disturbs the files accepted before it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::Attachment;

/// Per-file limit, measured on the raw bytes.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Cumulative limit, measured on the base64 text.
pub const MAX_TOTAL_ENCODED_BYTES: usize = 15 * 1024 * 1024;

/// Why a single file was turned away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("\"{file_name}\" is not an image or PDF ({mime_type}).")]
    UnsupportedType { file_name: String, mime_type: String },

    #[error("\"{file_name}\" is not valid base64.")]
    InvalidEncoding { file_name: String },

    #[error("\"{file_name}\" is too large (max 5MB).")]
    FileTooLarge { file_name: String, size: usize },

    #[error("Total upload limit reached (15MB). Remove some files to add more.")]
    TotalLimitExceeded { file_name: String },
}

impl AttachmentError {
    pub fn file_name(&self) -> &str {
        match self {
            AttachmentError::UnsupportedType { file_name, .. }
            | AttachmentError::InvalidEncoding { file_name }
            | AttachmentError::FileTooLarge { file_name, .. }
            | AttachmentError::TotalLimitExceeded { file_name } => file_name,
        }
    }
}

/// Images of any kind and PDFs are the only material the planner reads.
pub fn is_supported_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

/// A file straight from the picker, before encoding.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a multi-file drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<AttachmentError>,
}

/// The attachments accepted so far for one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
    encoded_total: usize,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn total_encoded_bytes(&self) -> usize {
        self.encoded_total
    }

    /// Adds an already-encoded attachment.
    pub fn accept(&mut self, attachment: Attachment) -> Result<(), AttachmentError> {
        check_file(&attachment)?;
        self.encoded_total = checked_total(self.encoded_total, &attachment)?;
        self.items.push(attachment);
        Ok(())
    }

    /// Encodes a raw file and adds it. Type and size are checked before
    /// any encoding work is done.
    pub fn accept_file(&mut self, file: RawFile) -> Result<(), AttachmentError> {
        if !is_supported_mime(&file.mime_type) {
            return Err(AttachmentError::UnsupportedType {
                file_name: file.file_name,
                mime_type: file.mime_type,
            });
        }
        if file.bytes.len() > MAX_FILE_BYTES {
            return Err(AttachmentError::FileTooLarge {
                file_name: file.file_name,
                size: file.bytes.len(),
            });
        }
        self.accept(Attachment {
            mime_type: file.mime_type,
            data: STANDARD.encode(&file.bytes),
            file_name: file.file_name,
        })
    }

    /// Accepts files in order. A file that is individually unacceptable is
    /// skipped; the first file that would cross the cumulative limit ends
    /// the batch and every remaining file is reported as rejected.
    pub fn accept_batch(&mut self, files: impl IntoIterator<Item = RawFile>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut files = files.into_iter();

        while let Some(file) = files.next() {
            let file_name = file.file_name.clone();
            match self.accept_file(file) {
                Ok(()) => report.accepted.push(file_name),
                Err(limit @ AttachmentError::TotalLimitExceeded { .. }) => {
                    report.rejected.push(limit);
                    report
                        .rejected
                        .extend(files.by_ref().map(|rest| AttachmentError::TotalLimitExceeded {
                            file_name: rest.file_name,
                        }));
                    break;
                }
                Err(other) => report.rejected.push(other),
            }
        }

        report
    }

    /// Removes the attachment at `index`, freeing its share of the budget.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.encoded_total -= removed.encoded_len();
        Some(removed)
    }
}

/// Checks a full list against the same rules `AttachmentSet` enforces,
/// without copying the payloads.
pub fn check_all(attachments: &[Attachment]) -> Result<(), AttachmentError> {
    let mut total = 0;
    for attachment in attachments {
        check_file(attachment)?;
        total = checked_total(total, attachment)?;
    }
    Ok(())
}

fn check_file(attachment: &Attachment) -> Result<(), AttachmentError> {
    if !is_supported_mime(&attachment.mime_type) {
        return Err(AttachmentError::UnsupportedType {
            file_name: attachment.file_name.clone(),
            mime_type: attachment.mime_type.clone(),
        });
    }
    let decoded = STANDARD
        .decode(attachment.data.trim_end())
        .map_err(|_| AttachmentError::InvalidEncoding {
            file_name: attachment.file_name.clone(),
        })?;
    if decoded.len() > MAX_FILE_BYTES {
        return Err(AttachmentError::FileTooLarge {
            file_name: attachment.file_name.clone(),
            size: decoded.len(),
        });
    }
    Ok(())
}

fn checked_total(current: usize, attachment: &Attachment) -> Result<usize, AttachmentError> {
    let total = current + attachment.encoded_len();
    if total > MAX_TOTAL_ENCODED_BYTES {
        return Err(AttachmentError::TotalLimitExceeded {
            file_name: attachment.file_name.clone(),
        });
    }
    Ok(total)
}
