//! Batch orchestration: one uploaded roster in, one zip archive out.
//!
//! The batch is all-or-nothing: a failure on any row aborts the whole run
//! and the caller never sees a partial archive. Assembly happens in memory,
//! so abandoning a request at any point leaves nothing behind on disk.

use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::info;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    assets::{AssetError, TemplateStore},
    extract::{self, ExtractError, Record},
    registry, render, resolve,
};

pub const ARCHIVE_NAME: &str = "certificates.zip";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("unknown unit or certificate type: {0:?}")]
    UnknownSelector(String),
    #[error("no template configured for combination {0:?}")]
    UnsupportedCombination(String),
    #[error("template image for {0:?} is missing or unreadable")]
    TemplateAssetMissing(String),
    #[error("could not read the uploaded spreadsheet: {0}")]
    MalformedInput(String),
    #[error("certificate rendering failed: {0}")]
    Render(String),
    #[error("archive assembly failed: {0}")]
    Archive(String),
}

impl From<ExtractError> for BatchError {
    fn from(e: ExtractError) -> Self {
        BatchError::MalformedInput(e.to_string())
    }
}

/// Run the full pipeline for one upload. Selectors are the raw form fields;
/// `workbook` is the uploaded file body. Returns the finished zip bytes.
pub async fn generate_batch(
    store: &TemplateStore,
    workbook: &[u8],
    unit_text: &str,
    cert_type_text: &str,
) -> Result<Vec<u8>, BatchError> {
    let unit = resolve::resolve_unit_key(unit_text)
        .ok_or_else(|| BatchError::UnknownSelector(unit_text.trim().to_string()))?;
    let cert_type = resolve::resolve_cert_type_key(cert_type_text)
        .ok_or_else(|| BatchError::UnknownSelector(cert_type_text.trim().to_string()))?;
    let key = resolve::composite_key(unit, cert_type);

    let config = registry::lookup(unit, cert_type)
        .ok_or_else(|| BatchError::UnsupportedCombination(key.clone()))?;

    let template = store.load(&key).map_err(|e| match e {
        AssetError::TemplateMissing(_) | AssetError::TemplateCorrupt(..) => {
            BatchError::TemplateAssetMissing(key.clone())
        }
        other => BatchError::Render(other.to_string()),
    })?;
    let font = store.font().map_err(|e| BatchError::Render(e.to_string()))?;

    let range = extract::parse_workbook(workbook)?;

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    for record in extract::extract(&range, config.fields) {
        // Cancellation point: an abandoned request stops issuing render work.
        tokio::task::yield_now().await;

        let png = render::render(&template, &record, config, &font)
            .map_err(|e| BatchError::Render(format!("row {}: {e}", record.row)))?;
        archive
            .start_file(output_filename(&record), options)
            .map_err(|e| BatchError::Archive(e.to_string()))?;
        archive
            .write_all(&png)
            .map_err(|e| BatchError::Archive(e.to_string()))?;
        entries += 1;
    }

    let cursor = archive
        .finish()
        .map_err(|e| BatchError::Archive(e.to_string()))?;

    info!(key = %key, entries, "certificate batch assembled");
    Ok(cursor.into_inner())
}

/// `{name}-{row}.png`. The worksheet row number keeps entries distinct even
/// when two rows share a display name; path separators are stripped so every
/// entry stays a flat archive member.
fn output_filename(record: &Record) -> String {
    let name = record
        .get("name")
        .map(|v| v.display())
        .unwrap_or_default();
    let name = name.trim().replace(['/', '\\'], "_");
    format!("{}-{}.png", name, record.row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ROSTER_FIELDS;
    use calamine::{Data, Range};

    fn record_with_name(name: &str, sheet_row: u32) -> Record {
        let mut range = Range::new((0, 0), (sheet_row.saturating_sub(1), 8));
        range.set_value((0, 1), Data::String("Name".to_string()));
        range.set_value((sheet_row - 1, 1), Data::String(name.to_string()));
        extract::extract(&range, ROSTER_FIELDS).last().unwrap()
    }

    #[test]
    fn filenames_embed_the_worksheet_row() {
        let a = record_with_name("A Sharma", 2);
        let b = record_with_name("A Sharma", 3);
        assert_eq!(output_filename(&a), "A Sharma-2.png");
        assert_eq!(output_filename(&b), "A Sharma-3.png");
    }

    #[test]
    fn filename_name_fragment_is_flattened() {
        let r = record_with_name("a/b\\c", 2);
        assert_eq!(output_filename(&r), "a_b_c-2.png");
    }

    #[test]
    fn blank_name_still_yields_a_unique_entry() {
        let r = record_with_name("", 4);
        assert_eq!(output_filename(&r), "-4.png");
    }
}
