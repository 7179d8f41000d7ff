//! Marker-delimited document patching.
//!
//! The region between the start and end marker is owned by the updater and is
//! replaced wholesale on every run, so patching the same block twice leaves the
//! document exactly as the first patch did.
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::PriceError;

/// Literal strings delimiting the replaceable region of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMarkers {
    /// Line opening the region.
    pub start: String,
    /// Line closing the region.
    pub end: String,
}

impl Default for DocumentMarkers {
    fn default() -> Self {
        DocumentMarkers {
            start: "<!-- CRYPTO-PRICES:START -->".to_string(),
            end: "<!-- CRYPTO-PRICES:END -->".to_string(),
        }
    }
}

impl DocumentMarkers {
    fn not_found(&self) -> PriceError {
        PriceError::MarkersNotFound {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// What to do with a document that carries neither marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MissingMarkerPolicy {
    /// Append a fresh section with its own markers at the end of the document.
    #[default]
    Append,
    /// Fail with `MarkersNotFound` and leave the document alone.
    Reject,
}

/// Replaces the text between the first start marker and the first end marker.
///
/// Fails with `MarkersNotFound` when either marker is missing or the end marker
/// does not follow the start marker.
pub fn patch_region(
    document: &str,
    block: &str,
    markers: &DocumentMarkers,
) -> Result<String, PriceError> {
    check_block(block, markers)?;
    let (start_idx, end_idx) = match (document.find(&markers.start), document.find(&markers.end)) {
        (Some(start_idx), Some(end_idx)) => (start_idx, end_idx),
        _ => return Err(markers.not_found()),
    };
    let region_start = start_idx + markers.start.len();
    if end_idx < region_start {
        return Err(markers.not_found());
    }

    debug!(
        "Replacing {} bytes between markers at {}..{}",
        end_idx - region_start,
        region_start,
        end_idx
    );
    let mut patched = String::with_capacity(document.len() + block.len());
    patched.push_str(&document[..region_start]);
    patched.push('\n');
    patched.push_str(block);
    patched.push('\n');
    patched.push_str(&document[end_idx..]);
    Ok(patched)
}

/// Builds a complete section, heading and markers included, for appending.
pub fn new_section(block: &str, markers: &DocumentMarkers, heading: &str) -> String {
    let mut section = String::new();
    if !heading.is_empty() {
        section.push_str(heading);
        section.push('\n');
    }
    section.push_str(&markers.start);
    section.push('\n');
    section.push_str(block);
    section.push('\n');
    section.push_str(&markers.end);
    section.push('\n');
    section
}

/// Patches `document` according to the configured markers and policy.
#[derive(Debug, Clone)]
pub struct DocumentPatcher {
    markers: DocumentMarkers,
    policy: MissingMarkerPolicy,
    heading: String,
}

impl DocumentPatcher {
    /// Creates a patcher; `heading` is only used when a section is appended.
    pub fn new(markers: DocumentMarkers, policy: MissingMarkerPolicy, heading: &str) -> Self {
        DocumentPatcher {
            markers,
            policy,
            heading: heading.to_string(),
        }
    }

    /// Returns the new document text for `block`.
    ///
    /// A document with only one of the markers is treated as malformed and
    /// rejected regardless of policy.
    pub fn patch(&self, document: &str, block: &str) -> Result<String, PriceError> {
        let has_start = document.contains(&self.markers.start);
        let has_end = document.contains(&self.markers.end);

        if has_start || has_end {
            return patch_region(document, block, &self.markers);
        }

        match self.policy {
            MissingMarkerPolicy::Reject => Err(self.markers.not_found()),
            MissingMarkerPolicy::Append => {
                check_block(block, &self.markers)?;
                info!("No price markers in document, appending a new section");
                let mut patched = document.to_string();
                if !patched.is_empty() {
                    if !patched.ends_with('\n') {
                        patched.push('\n');
                    }
                    patched.push('\n');
                }
                patched.push_str(&new_section(block, &self.markers, &self.heading));
                Ok(patched)
            }
        }
    }
}

/// A block containing a marker would shift the region on the next run.
fn check_block(block: &str, markers: &DocumentMarkers) -> Result<(), PriceError> {
    if block.contains(&markers.start) || block.contains(&markers.end) {
        return Err(PriceError::InvalidContent(
            "rendered block contains a document marker".to_string(),
        ));
    }
    Ok(())
}
