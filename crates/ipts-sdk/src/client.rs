use std::path::Path;

use ipts_node::{dagjson, Node};
use ipts_store::{DagStore, InMemoryDagStore, KuboClient};
use ipts_table::{HeadRecord, Selection, Table};
use ipts_types::{Codec, ContentId};

use crate::config::IptsConfig;
use crate::error::SdkResult;
use crate::pipeline::{self, PipelineReport};

/// A store plus the settings that go with it.
pub struct Ipts {
    config: IptsConfig,
    store: Box<dyn DagStore>,
}

impl Ipts {
    /// Connect to the Kubo node named in `config`.
    pub fn connect(config: IptsConfig) -> SdkResult<Self> {
        let store = KuboClient::new(config.kubo.clone())?;
        Ok(Self::with_store(config, store))
    }

    /// Use an in-memory store; useful for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::with_store(IptsConfig::default(), InMemoryDagStore::new())
    }

    pub fn with_store(config: IptsConfig, store: impl DagStore + 'static) -> Self {
        Self {
            config,
            store: Box::new(store),
        }
    }

    pub fn config(&self) -> &IptsConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn DagStore {
        self.store.as_ref()
    }

    // ---- Content operations ----

    pub fn put_file(&self, path: &Path) -> SdkResult<ContentId> {
        pipeline::put_readable_file(self.store(), path)
    }

    /// Put a DAG-JSON document held in memory.
    pub fn put_json(&self, json: &[u8]) -> SdkResult<ContentId> {
        Ok(self.store.put(json, Codec::DagJson, Codec::DagCbor)?)
    }

    pub fn get(&self, path: &str) -> SdkResult<Node> {
        Ok(self.store.get(path)?)
    }

    pub fn block_get(&self, id: &ContentId) -> SdkResult<Vec<u8>> {
        Ok(self.store.block_get(id)?)
    }

    pub fn fetch(&self, id: &ContentId) -> SdkResult<Node> {
        pipeline::fetch_node(self.store(), id)
    }

    /// Float vector at `path` under `id`, honoring `strict_floats`.
    pub fn floats(&self, id: &ContentId, path: &[&str]) -> SdkResult<Vec<f32>> {
        let node = self.fetch(id)?;
        pipeline::float_vector_at(&node, path, self.config.strict_floats)
    }

    pub fn run_pipeline(&self, path: &Path) -> SdkResult<PipelineReport> {
        pipeline::run_pipeline(self.store(), path, self.config.strict_floats)
    }

    // ---- Table operations ----

    pub fn table(&self) -> Table<'_, dyn DagStore> {
        Table::new(self.store.as_ref())
    }

    /// Create a table from a DAG-JSON schema file.
    pub fn create_table(&self, schema_path: &Path) -> SdkResult<ContentId> {
        let schema = dagjson::decode_file(schema_path)?;
        Ok(self.table().create(&schema)?)
    }

    /// Insert one DAG-JSON record; returns the new root.
    pub fn insert_json(&self, root: &ContentId, record: &[u8]) -> SdkResult<ContentId> {
        let record = dagjson::decode_slice(record)?;
        Ok(self.table().insert(root, &record)?)
    }

    pub fn select(
        &self,
        root: &ContentId,
        fields: &[&str],
        limit: Option<usize>,
    ) -> SdkResult<Selection> {
        Ok(self.table().select(root, fields, limit)?)
    }

    /// Build a single-record head record for `schema_path`, without storing
    /// anything.
    pub fn head_record(&self, schema_path: &Path, record: &[u8]) -> SdkResult<HeadRecord> {
        let schema = ipts_table::Schema::from_node(&dagjson::decode_file(schema_path)?)?;
        let mut head = HeadRecord::empty(&schema);
        head.append(&dagjson::decode_slice(record)?)?;
        Ok(head)
    }
}

impl std::fmt::Debug for Ipts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipts")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_table::Cell;
    use std::io::Write;

    fn schema_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"fields": {"temp": {"type": "f32"}}}"#)
            .unwrap();
        file
    }

    #[test]
    fn put_json_and_get_path() {
        let ipts = Ipts::in_memory();
        let id = ipts.put_json(br#"{"a": 1, "b": [true, false]}"#).unwrap();
        let b = ipts.get(&format!("{id}/b")).unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(ipts.fetch(&id).unwrap().len(), 2);
    }

    #[test]
    fn floats_respect_strictness() {
        let json = br#"{"fields": {"values": {"/": {"bytes": "AACAP6q7"}}}}"#;
        let strict = Ipts::in_memory();
        let id = strict.put_json(json).unwrap();
        assert!(strict.floats(&id, &["fields", "values"]).is_err());

        let config = IptsConfig {
            strict_floats: false,
            ..IptsConfig::default()
        };
        let lenient = Ipts::with_store(config, InMemoryDagStore::new());
        let id = lenient.put_json(json).unwrap();
        assert_eq!(lenient.floats(&id, &["fields", "values"]).unwrap(), vec![1.0]);
    }

    #[test]
    fn table_lifecycle() {
        let ipts = Ipts::in_memory();
        let root = ipts.create_table(schema_file().path()).unwrap();
        let root = ipts
            .insert_json(&root, br#"{"temp": 1.5, "_timestamp": 60}"#)
            .unwrap();
        let sel = ipts.select(&root, &[], None).unwrap();
        assert_eq!(sel.rows.len(), 1);
        let temp = sel.columns.iter().position(|c| c == "temp").unwrap();
        assert_eq!(sel.rows[0][temp], Cell::F32(1.5));
    }

    #[test]
    fn head_record_from_schema_file() {
        let ipts = Ipts::in_memory();
        let head = ipts
            .head_record(schema_file().path(), br#"{"temp": 2.0}"#)
            .unwrap();
        assert_eq!(head.row_count(), 1);
        assert_eq!(head.column("temp").unwrap().values, 2.0f32.to_le_bytes());
        assert!(ipts
            .head_record(schema_file().path(), br#"{"humidity": 2.0}"#)
            .is_err());
    }

    #[test]
    fn debug_hides_store() {
        let debug = format!("{:?}", Ipts::in_memory());
        assert!(debug.contains("Ipts"));
        assert!(debug.contains("strict_floats"));
    }
}
