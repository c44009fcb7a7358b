use crate::layout::StoreLayout;
use crate::{validate_key, write_atomic, FileGuard, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackforge_schema::{MetricData, StackId, WatchName, WatchRuleSpec, WatchState};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Persisted state of one watch rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchRuleRecord {
    pub name: WatchName,
    #[serde(default)]
    pub stack_id: Option<StackId>,
    pub rule: WatchRuleSpec,
    pub state: WatchState,
    pub last_evaluated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// blake3 checksum over the record without this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl WatchRuleRecord {
    pub fn new(
        name: WatchName,
        stack_id: Option<StackId>,
        rule: WatchRuleSpec,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            stack_id,
            rule,
            state: WatchState::Normal,
            last_evaluated: now,
            created_at: now,
            updated_at: None,
            checksum: None,
        }
    }

    fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        let json = serde_json::to_string_pretty(&copy)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    fn verify(&self) -> Result<(), StoreError> {
        if let Some(ref expected) = self.checksum {
            let actual = self.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    key: self.name.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// One submission of metric readings for a watch rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchDataPoint {
    pub created_at: DateTime<Utc>,
    pub data: MetricData,
}

pub trait WatchStore: Send + Sync {
    fn get_rule(&self, name: &WatchName) -> Result<WatchRuleRecord, StoreError>;

    /// Insert or overwrite the rule stored under `record.name`.
    fn put_rule(&self, record: &WatchRuleRecord) -> Result<(), StoreError>;

    /// Delete the rule and its data. Returns whether a rule existed.
    fn delete_rule(&self, name: &WatchName) -> Result<bool, StoreError>;

    /// Rules of one stack, or every rule, ordered by name.
    fn list_rules(&self, stack_id: Option<&StackId>) -> Result<Vec<WatchRuleRecord>, StoreError>;

    fn append_data(&self, name: &WatchName, point: &WatchDataPoint) -> Result<(), StoreError>;

    /// Data points of a rule, oldest first.
    fn list_data(&self, name: &WatchName) -> Result<Vec<WatchDataPoint>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryWatchStore {
    rules: Mutex<BTreeMap<WatchName, (WatchRuleRecord, Vec<WatchDataPoint>)>>,
}

impl MemoryWatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rules(
        &self,
    ) -> MutexGuard<'_, BTreeMap<WatchName, (WatchRuleRecord, Vec<WatchDataPoint>)>> {
        self.rules.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WatchStore for MemoryWatchStore {
    fn get_rule(&self, name: &WatchName) -> Result<WatchRuleRecord, StoreError> {
        self.rules()
            .get(name)
            .map(|(record, _)| record.clone())
            .ok_or_else(|| StoreError::WatchNotFound(name.to_string()))
    }

    fn put_rule(&self, record: &WatchRuleRecord) -> Result<(), StoreError> {
        let mut rules = self.rules();
        match rules.get_mut(&record.name) {
            Some((existing, _)) => *existing = record.clone(),
            None => {
                rules.insert(record.name.clone(), (record.clone(), Vec::new()));
            }
        }
        Ok(())
    }

    fn delete_rule(&self, name: &WatchName) -> Result<bool, StoreError> {
        Ok(self.rules().remove(name).is_some())
    }

    fn list_rules(&self, stack_id: Option<&StackId>) -> Result<Vec<WatchRuleRecord>, StoreError> {
        Ok(self
            .rules()
            .values()
            .map(|(record, _)| record)
            .filter(|record| stack_id.is_none_or(|id| record.stack_id.as_ref() == Some(id)))
            .cloned()
            .collect())
    }

    fn append_data(&self, name: &WatchName, point: &WatchDataPoint) -> Result<(), StoreError> {
        let mut rules = self.rules();
        let (_, data) = rules
            .get_mut(name)
            .ok_or_else(|| StoreError::WatchNotFound(name.to_string()))?;
        data.push(point.clone());
        Ok(())
    }

    fn list_data(&self, name: &WatchName) -> Result<Vec<WatchDataPoint>, StoreError> {
        let rules = self.rules();
        let (_, data) = rules
            .get(name)
            .ok_or_else(|| StoreError::WatchNotFound(name.to_string()))?;
        let mut data = data.clone();
        data.sort_by_key(|point| point.created_at);
        Ok(data)
    }
}

/// Watch rules as checksummed JSON files under `watch/rules/`, data points as
/// JSON lines under `watch/data/`.
pub struct FileWatchStore {
    layout: StoreLayout,
}

impl FileWatchStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    fn rule_path(&self, name: &WatchName) -> Result<PathBuf, StoreError> {
        validate_key(name)?;
        Ok(self.layout.watch_rules_dir().join(name.as_str()))
    }

    fn data_path(&self, name: &WatchName) -> Result<PathBuf, StoreError> {
        validate_key(name)?;
        Ok(self
            .layout
            .watch_data_dir()
            .join(format!("{}.jsonl", name.as_str())))
    }

    fn read_rule(&self, path: &std::path::Path, name: &str) -> Result<WatchRuleRecord, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::WatchNotFound(name.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        let record: WatchRuleRecord = serde_json::from_str(&content)?;
        record.verify()?;
        Ok(record)
    }
}

impl WatchStore for FileWatchStore {
    fn get_rule(&self, name: &WatchName) -> Result<WatchRuleRecord, StoreError> {
        self.read_rule(&self.rule_path(name)?, name)
    }

    fn put_rule(&self, record: &WatchRuleRecord) -> Result<(), StoreError> {
        let dest = self.rule_path(&record.name)?;

        let mut with_checksum = record.clone();
        with_checksum.checksum = Some(with_checksum.compute_checksum()?);
        let content = serde_json::to_string_pretty(&with_checksum)?;

        let dir = self.layout.watch_rules_dir();
        fs::create_dir_all(&dir)?;
        let _guard = FileGuard::acquire(&self.layout.lock_file())?;
        write_atomic(&dir, &dest, content.as_bytes())
    }

    fn delete_rule(&self, name: &WatchName) -> Result<bool, StoreError> {
        let rule_path = self.rule_path(name)?;
        let data_path = self.data_path(name)?;
        let _guard = FileGuard::acquire(&self.layout.lock_file())?;

        if data_path.exists() {
            fs::remove_file(&data_path)?;
        }
        if rule_path.exists() {
            fs::remove_file(&rule_path)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn list_rules(&self, stack_id: Option<&StackId>) -> Result<Vec<WatchRuleRecord>, StoreError> {
        let dir = self.layout.watch_rules_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_str().unwrap_or("");
            if name_str.is_empty() || name_str.starts_with('.') {
                continue;
            }
            match self.read_rule(&entry.path(), name_str) {
                Ok(record) => {
                    if stack_id.is_none_or(|id| record.stack_id.as_ref() == Some(id)) {
                        results.push(record);
                    }
                }
                Err(e) => {
                    tracing::warn!("skipping corrupted watch rule '{name_str}': {e}");
                }
            }
        }
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    fn append_data(&self, name: &WatchName, point: &WatchDataPoint) -> Result<(), StoreError> {
        let rule_path = self.rule_path(name)?;
        let data_path = self.data_path(name)?;
        let mut line = serde_json::to_string(point)?;
        line.push('\n');

        let _guard = FileGuard::acquire(&self.layout.lock_file())?;
        if !rule_path.exists() {
            return Err(StoreError::WatchNotFound(name.to_string()));
        }
        fs::create_dir_all(self.layout.watch_data_dir())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&data_path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn list_data(&self, name: &WatchName) -> Result<Vec<WatchDataPoint>, StoreError> {
        if !self.rule_path(name)?.exists() {
            return Err(StoreError::WatchNotFound(name.to_string()));
        }
        let content = match fs::read_to_string(self.data_path(name)?) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut points = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WatchDataPoint>(line) {
                Ok(point) => points.push(point),
                Err(e) => {
                    tracing::warn!(
                        "skipping corrupted data point {} for watch '{name}': {e}",
                        lineno + 1
                    );
                }
            }
        }
        points.sort_by_key(|point| point.created_at);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stackforge_schema::{ComparisonOperator, MetricSample, Statistic};

    fn spec() -> WatchRuleSpec {
        WatchRuleSpec::new(
            "cpu",
            Statistic::Average,
            ComparisonOperator::GreaterThanThreshold,
            10.0,
            60,
        )
    }

    fn record(name: &str, stack: &str) -> WatchRuleRecord {
        WatchRuleRecord::new(
            WatchName::new(name),
            Some(StackId::new(stack)),
            spec(),
            Utc::now(),
        )
    }

    fn point(value: f64, at: DateTime<Utc>) -> WatchDataPoint {
        let mut data = MetricData::new();
        data.insert("cpu".to_owned(), MetricSample::new(value, Some("Percent")));
        WatchDataPoint { created_at: at, data }
    }

    fn file_store() -> (tempfile::TempDir, FileWatchStore) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        (dir, FileWatchStore::new(layout))
    }

    fn exercise(store: &dyn WatchStore) {
        let name = WatchName::new("cpu_high");
        assert!(matches!(
            store.get_rule(&name),
            Err(StoreError::WatchNotFound(_))
        ));
        assert!(store.append_data(&name, &point(1.0, Utc::now())).is_err());

        let mut rec = record("cpu_high", "stack-1");
        store.put_rule(&rec).unwrap();
        store.put_rule(&record("mem_high", "stack-2")).unwrap();

        rec.state = WatchState::Alarm;
        store.put_rule(&rec).unwrap();
        assert_eq!(store.get_rule(&name).unwrap().state, WatchState::Alarm);

        let now = Utc::now();
        store.append_data(&name, &point(15.0, now)).unwrap();
        store
            .append_data(&name, &point(5.0, now - Duration::seconds(30)))
            .unwrap();
        let data = store.list_data(&name).unwrap();
        assert_eq!(data.len(), 2);
        assert!(data[0].created_at < data[1].created_at);

        let stack_rules = store.list_rules(Some(&StackId::new("stack-1"))).unwrap();
        assert_eq!(stack_rules.len(), 1);
        assert_eq!(store.list_rules(None).unwrap().len(), 2);

        assert!(store.delete_rule(&name).unwrap());
        assert!(!store.delete_rule(&name).unwrap());
        assert!(store.list_data(&name).is_err());
    }

    #[test]
    fn memory_watch_store_semantics() {
        exercise(&MemoryWatchStore::new());
    }

    #[test]
    fn file_watch_store_semantics() {
        let (_dir, store) = file_store();
        exercise(&store);
    }

    #[test]
    fn file_rules_carry_checksum() {
        let (dir, store) = file_store();
        store.put_rule(&record("cpu_high", "stack-1")).unwrap();

        let path = dir.path().join("watch").join("rules").join("cpu_high");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("checksum"));

        let tampered = content.replace("\"NORMAL\"", "\"ALARM\"");
        fs::write(&path, tampered).unwrap();
        assert!(matches!(
            store.get_rule(&WatchName::new("cpu_high")),
            Err(StoreError::IntegrityFailure { .. })
        ));
    }

    #[test]
    fn corrupted_rules_skipped_when_listing() {
        let (dir, store) = file_store();
        store.put_rule(&record("cpu_high", "stack-1")).unwrap();
        fs::write(dir.path().join("watch").join("rules").join("broken"), "{not json").unwrap();

        let rules = store.list_rules(None).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, WatchName::new("cpu_high"));
    }

    #[test]
    fn corrupted_data_lines_skipped() {
        let (dir, store) = file_store();
        let name = WatchName::new("cpu_high");
        store.put_rule(&record("cpu_high", "stack-1")).unwrap();
        store.append_data(&name, &point(1.0, Utc::now())).unwrap();

        let data_path = dir.path().join("watch").join("data").join("cpu_high.jsonl");
        let mut file = OpenOptions::new().append(true).open(&data_path).unwrap();
        file.write_all(b"garbage\n").unwrap();
        store.append_data(&name, &point(2.0, Utc::now())).unwrap();

        assert_eq!(store.list_data(&name).unwrap().len(), 2);
    }
}
