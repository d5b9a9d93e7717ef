//! Artifact naming and PNG writing

use crate::error::Result;
use chrono::NaiveDate;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Build the artifact file name for an identifier minted on `date`.
///
/// Label codes are named `{ddMMyyyy}_{id}.png`; scan codes carry a `scan_`
/// prefix. The date comes from the same IST clock the record timestamp uses.
pub fn artifact_name(prefix: Option<&str>, date: NaiveDate, id: &str) -> String {
    let stamp = date.format("%d%m%Y");
    match prefix {
        Some(prefix) => format!("{prefix}_{stamp}_{id}.png"),
        None => format!("{stamp}_{id}.png"),
    }
}

/// Write a composed canvas as a PNG under `dir`, creating the directory if
/// needed. Returns the full path of the written file.
pub fn write_png(dir: &Path, name: &str, image: &RgbImage) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    image.save(&path)?;
    tracing::info!(path = %path.display(), "Wrote QR artifact");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn label_name_is_date_then_id() {
        assert_eq!(
            artifact_name(None, date(), "AB12cd34"),
            "07032026_AB12cd34.png"
        );
    }

    #[test]
    fn scan_name_carries_prefix() {
        assert_eq!(
            artifact_name(Some("scan"), date(), "Zz99Aa00"),
            "scan_07032026_Zz99Aa00.png"
        );
    }

    #[test]
    fn date_is_zero_padded() {
        let early = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert!(artifact_name(None, early, "x").starts_with("02012026_"));
    }
}
