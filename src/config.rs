//! Build configuration, loaded from a JSON file.
//!
//! The on-disk shape is inherited from the original CAGRA builder's
//! `loadCagraConfig`: a single top-level `"cagra"` object with upper-snake-
//! case keys. That format is kept verbatim here rather than redesigned,
//! since the KNNG producers that emit these config files are external to
//! this crate and not something this crate can change.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::Error;

/// The fully parsed build configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub knng_path: std::path::PathBuf,
    pub knng_format: KnngFormat,
    pub save_path: std::path::PathBuf,
    pub r_init: i32,
    pub r: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum KnngFormat {
    #[serde(rename = "efanna")]
    Efanna,
    #[serde(rename = "fbin")]
    Fbin,
}

#[derive(Deserialize)]
struct CagraConfigFile {
    cagra: CagraSection,
}

#[derive(Deserialize)]
struct CagraSection {
    #[serde(rename = "KNNG_PATH")]
    knng_path: std::path::PathBuf,
    #[serde(rename = "KNNG_FORMAT")]
    knng_format: KnngFormat,
    #[serde(rename = "SAVE_PATH")]
    save_path: std::path::PathBuf,
    #[serde(rename = "R_INIT")]
    r_init: i32,
    #[serde(rename = "R")]
    r: i32,
}

impl BuildConfig {
    /// Loads a build configuration from a JSON file shaped like:
    ///
    /// ```json
    /// {
    ///   "cagra": {
    ///     "KNNG_PATH": "knng.bin",
    ///     "KNNG_FORMAT": "efanna",
    ///     "SAVE_PATH": "out.nsg",
    ///     "R_INIT": 64,
    ///     "R": 32
    ///   }
    /// }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let parsed: CagraConfigFile =
            serde_json::from_reader(reader).map_err(|e| Error::FormatError {
                detail: format!("invalid cagra config file: {e}"),
            })?;

        Ok(BuildConfig {
            knng_path: parsed.cagra.knng_path,
            knng_format: parsed.cagra.knng_format,
            save_path: parsed.cagra.save_path,
            r_init: parsed.cagra.r_init,
            r: parsed.cagra.r,
        })
    }
}
