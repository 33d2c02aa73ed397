//! File-Per-Run Store
//!
//! Each run lives in `predictions_<run id>.json` inside the history directory,
//! holding the labeled dataset. File names sort chronologically.

use crate::run::{PredictionRun, RunId};
use crate::{PersistenceError, RunStore};
use feature_engine::Dataset;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const FILE_PREFIX: &str = "predictions_";
const FILE_SUFFIX: &str = ".json";

/// Prediction history stored as one JSON file per run
#[derive(Debug, Clone)]
pub struct FileRunStore {
    dir: PathBuf,
}

impl FileRunStore {
    /// Open a history directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::Io {
            path: dir.clone(),
            source,
        })?;
        info!("Opened run history at {}", dir.display());
        Ok(Self { dir })
    }

    /// History directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding a given run
    pub fn path_for(&self, id: &RunId) -> PathBuf {
        self.dir.join(format!("{}{}{}", FILE_PREFIX, id, FILE_SUFFIX))
    }

    fn parse_file_name(name: &str) -> Option<RunId> {
        name.strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_SUFFIX)?
            .parse()
            .ok()
    }

    /// Write the payload to a private temporary file in the history directory
    fn write_temp(&self, payload: &[u8]) -> Result<PathBuf, PersistenceError> {
        let path = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let io_err = |source| PersistenceError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).map_err(io_err)?;
        let written = file
            .write_all(payload)
            .and_then(|_| file.sync_all())
            .map_err(io_err);
        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }

    /// Link the finished temporary file under the first free id.
    ///
    /// `hard_link` fails instead of replacing an existing file, so concurrent
    /// writers can never overwrite each other's runs.
    fn link_unique(&self, temp: &Path, mut id: RunId) -> Result<RunId, PersistenceError> {
        loop {
            let target = self.path_for(&id);
            match fs::hard_link(temp, &target) {
                Ok(()) => return Ok(id),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Run id {} taken, trying next sequence", id);
                    id = id
                        .next()
                        .ok_or_else(|| PersistenceError::SequenceExhausted(id.to_string()))?;
                }
                Err(source) => {
                    return Err(PersistenceError::Io {
                        path: target,
                        source,
                    })
                }
            }
        }
    }

    fn read_run(&self, id: RunId, path: &Path) -> Result<PredictionRun, PersistenceError> {
        let bytes = fs::read(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset: Dataset =
            serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(PredictionRun::from_parts(id, dataset))
    }
}

impl RunStore for FileRunStore {
    fn append(&self, run: PredictionRun) -> Result<RunId, PersistenceError> {
        let payload = serde_json::to_vec(run.dataset())
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        let temp = self.write_temp(&payload)?;
        let linked = self.link_unique(&temp, run.id());
        if let Err(e) = fs::remove_file(&temp) {
            warn!("Failed to remove temporary file {}: {}", temp.display(), e);
        }
        let id = linked?;

        info!(
            "Recorded prediction run {} ({} rows)",
            id,
            run.row_count()
        );
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<PredictionRun>, PersistenceError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            match name.to_str().and_then(Self::parse_file_name) {
                Some(id) => found.push((id, entry.path())),
                None => debug!("Skipping non-run file {:?}", name),
            }
        }
        found.sort_by_key(|(id, _)| *id);

        found
            .iter()
            .map(|(id, path)| self.read_run(*id, path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use feature_engine::{Column, Value};

    fn run_at(second: u32, labels: &[&str]) -> PredictionRun {
        let dataset = Dataset::from_columns(vec![
            Column::new("edu", labels.iter().map(|_| Value::from("Primary"))),
            Column::new("predicted_label", labels.iter().copied()),
        ])
        .unwrap();
        PredictionRun::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, second).unwrap(),
            dataset,
        )
    }

    #[test]
    fn test_append_and_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();

        let run = run_at(0, &["Uses ITN", "Does not use ITN"]);
        let id = store.append(run.clone()).unwrap();

        assert!(store.path_for(&id).exists());
        assert!(dir
            .path()
            .join("predictions_2024-05-01_08-30-00.json")
            .exists());

        let runs = store.list_all().unwrap();
        assert_eq!(runs, vec![run]);
    }

    #[test]
    fn test_colliding_timestamps_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();

        let ids: Vec<RunId> = (0..4)
            .map(|i| store.append(run_at(5, &[format!("label-{}", i).as_str()])).unwrap())
            .collect();

        let runs = store.list_all().unwrap();
        assert_eq!(runs.len(), 4);
        assert!(runs.windows(2).all(|w| w[0].id() < w[1].id()));
        for (i, (run, id)) in runs.iter().zip(&ids).enumerate() {
            assert_eq!(run.id(), *id);
            assert_eq!(
                run.labels().unwrap().values[0],
                Value::from(format!("label-{}", i))
            );
        }
    }

    #[test]
    fn test_list_in_chronological_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();
        store.append(run_at(45, &["c"])).unwrap();
        store.append(run_at(15, &["a"])).unwrap();
        store.append(run_at(30, &["b"])).unwrap();

        let seconds: Vec<String> = store
            .list_all()
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(
            seconds,
            vec![
                "2024-05-01_08-30-15",
                "2024-05-01_08-30-30",
                "2024-05-01_08-30-45",
            ]
        );
    }

    #[test]
    fn test_foreign_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();
        store.append(run_at(0, &["Uses ITN"])).unwrap();

        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join(".abandoned.tmp"), "{").unwrap();
        fs::write(dir.path().join("predictions_yesterday.json"), "{}").unwrap();

        assert_eq!(store.list_all().unwrap().len(), 1);
        // only the planted temporary file remains
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_corrupt_run_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("predictions_2024-05-01_08-30-00.json"), "not json").unwrap();

        assert!(matches!(
            store.list_all(),
            Err(PersistenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_ragged_run_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRunStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("predictions_2024-05-01_08-30-00.json"),
            r#"{"columns":[
                {"name":"edu","values":["Primary","Primary","Primary"]},
                {"name":"predicted_label","values":["Uses ITN"]}
            ]}"#,
        )
        .unwrap();

        match store.list_all() {
            Err(PersistenceError::Corrupt { reason, .. }) => {
                assert!(reason.contains("predicted_label"));
            }
            other => panic!("expected corrupt run, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_appends_from_separate_handles() {
        let dir = tempfile::tempdir().unwrap();
        let writers = 16;

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let path = dir.path().to_path_buf();
                std::thread::spawn(move || {
                    let store = FileRunStore::open(path).unwrap();
                    store
                        .append(run_at(0, &[format!("writer-{}", i).as_str()]))
                        .unwrap()
                })
            })
            .collect();
        let mut ids: Vec<RunId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), writers);

        let runs = FileRunStore::open(dir.path()).unwrap().list_all().unwrap();
        assert_eq!(runs.len(), writers);
        assert_eq!(runs.iter().map(PredictionRun::id).collect::<Vec<_>>(), ids);

        let mut labels: Vec<String> = runs
            .iter()
            .filter_map(|r| r.labels().unwrap().values[0].category_label())
            .collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), writers);
    }

    #[test]
    fn test_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("history");
        fs::write(&blocker, "a file, not a directory").unwrap();

        assert!(matches!(
            FileRunStore::open(&blocker),
            Err(PersistenceError::Io { .. })
        ));
    }
}
