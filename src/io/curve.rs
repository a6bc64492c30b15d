//! Saved-curve store.
//!
//! A single JSON file keyed by curve name:
//!
//! ```json
//! {
//!   "curves": {
//!     "transformers": { "name": "transformers", "method": "mle", "shape": 2.1, ... }
//!   }
//! }
//! ```
//!
//! Every operation re-reads the file, so separate `wb` invocations see each
//! other's writes. A missing file is an empty store.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FitMethod, SavedCurve, WeibullParameters};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    curves: BTreeMap<String, SavedCurve>,
}

/// Handle on a store file.
#[derive(Debug, Clone)]
pub struct CurveStore {
    path: PathBuf,
}

impl CurveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite a curve by name.
    pub fn save(
        &self,
        name: &str,
        description: &str,
        method: FitMethod,
        params: WeibullParameters,
    ) -> Result<SavedCurve, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::new(2, "Curve name must not be empty."));
        }

        let mut file = self.read()?;
        let curve = SavedCurve {
            name: name.to_string(),
            description: description.to_string(),
            method,
            shape: params.shape,
            scale: params.scale,
            timestamp: Utc::now(),
        };
        let replaced = file.curves.insert(curve.name.clone(), curve.clone()).is_some();
        self.write(&file)?;

        info!(name = %curve.name, replaced, path = %self.path.display(), "saved curve");
        Ok(curve)
    }

    /// All curves, sorted by name.
    pub fn list(&self) -> Result<Vec<SavedCurve>, AppError> {
        Ok(self.read()?.curves.into_values().collect())
    }

    /// Names are matched after trimming, as they are stored by `save`.
    pub fn get(&self, name: &str) -> Result<SavedCurve, AppError> {
        let name = name.trim();
        self.read()?
            .curves
            .remove(name)
            .ok_or_else(|| AppError::new(2, format!("No saved curve named '{name}'.")))
    }

    pub fn delete(&self, name: &str) -> Result<SavedCurve, AppError> {
        let name = name.trim();
        let mut file = self.read()?;
        let removed = file
            .curves
            .remove(name)
            .ok_or_else(|| AppError::new(2, format!("No saved curve named '{name}'.")))?;
        self.write(&file)?;
        info!(name, path = %self.path.display(), "deleted curve");
        Ok(removed)
    }

    fn read(&self) -> Result<StoreFile, AppError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let file = File::open(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to open curve store '{}': {e}", self.path.display()))
        })?;
        serde_json::from_reader(file).map_err(|e| {
            AppError::new(2, format!("Invalid curve store '{}': {e}", self.path.display()))
        })
    }

    fn write(&self, store: &StoreFile) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to write curve store '{}': {e}", self.path.display()))
        })?;
        serde_json::to_writer_pretty(file, store)
            .map_err(|e| AppError::new(2, format!("Failed to write curve store: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(shape: f64, scale: f64) -> WeibullParameters {
        WeibullParameters::new(shape, scale).unwrap()
    }

    #[test]
    fn save_list_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curves.json"));

        assert!(store.list().unwrap().is_empty());

        store.save("zeta", "", FitMethod::Direct, params(1.0, 2.0)).unwrap();
        store.save("alpha", "breakers", FitMethod::Mle, params(2.5, 30.0)).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let alpha = store.get("alpha").unwrap();
        assert_eq!(alpha.method, FitMethod::Mle);
        assert_eq!(alpha.parameters().unwrap(), params(2.5, 30.0));

        store.delete("zeta").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.delete("zeta").is_err());
    }

    #[test]
    fn save_overwrites_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curves.json"));
        store.save("c", "old", FitMethod::Points, params(1.0, 1.0)).unwrap();
        store.save("c", "new", FitMethod::Points, params(3.0, 1.0)).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "new");
        assert_eq!(all[0].shape, 3.0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curves.json"));
        assert!(store.save("  ", "", FitMethod::Direct, params(1.0, 1.0)).is_err());
    }

    #[test]
    fn lookups_trim_names_like_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curves.json"));
        store.save(" fleet ", "", FitMethod::Mle, params(2.0, 10.0)).unwrap();

        assert_eq!(store.get(" fleet ").unwrap().name, "fleet");
        assert_eq!(store.get("fleet").unwrap().name, "fleet");
        assert_eq!(store.delete("  fleet").unwrap().name, "fleet");
        assert!(store.list().unwrap().is_empty());
    }
}
