//! Records - the unit of the flat encoded document
//!
//! Every record carries a common envelope (format version, generator tag
//! selecting the decoder, producer marker) under `metadata`. Everything
//! else is the concrete codec's responsibility: the envelope code never
//! inspects type-specific fields and never raises an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use basalt_scene::{Color, Mat4, Vec2, Vec3};

/// Wire format version stamped into every envelope.
pub const FORMAT_VERSION: &str = "1.0";
/// Producer marker stamped into every envelope.
pub const GENERATOR: &str = "basalt.codec";

/// Reserved tokens addressing document-level singleton records. Generated
/// node tokens are hex-with-counter values and can never collide.
pub mod tokens {
    pub const CONFIG: &str = "config";
    pub const CAMERA: &str = "camera";
    pub const RENDERER: &str = "renderer";
    pub const LISTENER: &str = "listener";
}

/// The common record envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub kind: String,
    pub generator: String,
}

/// One encoded unit in the flat document.
///
/// Children are referenced by identity token, never nested; a resource
/// embedded at its reference site lives in the payload as a sub-record
/// value instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub metadata: Envelope,
    pub token: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Record {
    /// Stamp a fresh envelope; the caller merges its own fields on top.
    pub fn new(kind: &str, token: impl Into<String>) -> Self {
        Self {
            metadata: Envelope {
                version: FORMAT_VERSION.to_string(),
                kind: kind.to_string(),
                generator: GENERATOR.to_string(),
            },
            token: token.into(),
            children: Vec::new(),
            payload: Map::new(),
        }
    }

    /// The generator tag selecting the decoder.
    pub fn kind(&self) -> &str {
        &self.metadata.kind
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.payload.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn f32_field(&self, key: &str) -> Option<f32> {
        self.get(key)?.as_f64().map(|v| v as f32)
    }

    pub fn u32_field(&self, key: &str) -> Option<u32> {
        self.get(key)?.as_u64().map(|v| v as u32)
    }

    pub fn i32_field(&self, key: &str) -> Option<i32> {
        self.get(key)?.as_i64().map(|v| v as i32)
    }

    pub fn color_field(&self, key: &str) -> Option<Color> {
        Color::parse(self.str_field(key)?)
    }

    pub fn insert_color(&mut self, key: &str, color: Color) {
        self.insert(key, color.to_css());
    }

    fn f32_array(&self, key: &str) -> Option<Vec<f32>> {
        self.get(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect()
    }

    pub fn vec2_field(&self, key: &str) -> Option<Vec2> {
        let a = self.f32_array(key)?;
        (a.len() == 2).then(|| Vec2::new(a[0], a[1]))
    }

    pub fn insert_vec2(&mut self, key: &str, v: Vec2) {
        self.insert(key, serde_json::json!([v.x, v.y]));
    }

    pub fn vec3_field(&self, key: &str) -> Option<Vec3> {
        let a = self.f32_array(key)?;
        (a.len() == 3).then(|| Vec3::new(a[0], a[1], a[2]))
    }

    pub fn insert_vec3(&mut self, key: &str, v: Vec3) {
        self.insert(key, serde_json::json!([v.x, v.y, v.z]));
    }

    pub fn mat4_field(&self, key: &str) -> Option<Mat4> {
        let a = self.f32_array(key)?;
        (a.len() == 16).then(|| {
            let mut cols = [0.0f32; 16];
            cols.copy_from_slice(&a);
            Mat4::from_cols_array(&cols)
        })
    }

    pub fn insert_mat4(&mut self, key: &str, m: Mat4) {
        let cols: Vec<f32> = m.to_cols_array().to_vec();
        self.insert(key, serde_json::json!(cols));
    }

    /// Read an inlined sub-record (e.g. a resource embedded at its
    /// reference site).
    pub fn record_field(&self, key: &str) -> Option<Record> {
        serde_json::from_value(self.get(key)?.clone()).ok()
    }

    /// Read an array of inlined sub-records.
    pub fn records_field(&self, key: &str) -> Option<Vec<Record>> {
        serde_json::from_value(self.get(key)?.clone()).ok()
    }

    pub fn insert_record(&mut self, key: &str, record: Record) {
        // Records always serialize cleanly; a failure here would be a
        // serde_json::Map with non-string keys, which cannot exist.
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        self.insert(key, value);
    }

    pub fn insert_records(&mut self, key: &str, records: Vec<Record>) {
        let value = serde_json::to_value(records).unwrap_or(Value::Null);
        self.insert(key, value);
    }
}

/// Token-indexed view over the flat record list.
///
/// Lookup is by identity over the whole list, never by position: a child
/// record may appear anywhere, including after its referencing parent.
/// The underlying list is read-only for the table's lifetime.
pub struct RecordTable<'a> {
    records: &'a [Record],
    index: HashMap<&'a str, &'a Record>,
}

impl<'a> RecordTable<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if index.insert(record.token.as_str(), record).is_some() {
                log::warn!(
                    "duplicate token '{}' in document; keeping the later record",
                    record.token
                );
            }
        }
        Self { records, index }
    }

    pub fn get(&self, token: &str) -> Option<&'a Record> {
        self.index.get(token).copied()
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    /// All records of a given kind, in document order.
    pub fn of_kind(&self, kind: &str) -> impl Iterator<Item = &'a Record> + '_ {
        let kind = kind.to_string();
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    /// The first record of a given kind, in document order.
    pub fn first_of_kind(&self, kind: &str) -> Option<&'a Record> {
        self.records.iter().find(|r| r.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_is_stamped() {
        let rec = Record::new("Mesh", "abc");
        assert_eq!(rec.kind(), "Mesh");
        assert_eq!(rec.metadata.version, FORMAT_VERSION);
        assert_eq!(rec.metadata.generator, GENERATOR);
    }

    #[test]
    fn test_payload_fields_flatten() {
        let mut rec = Record::new("Group", "t1");
        rec.insert("name", "hello");
        rec.insert_vec3("position", Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["name"], "hello");
        assert_eq!(json["position"][2], 3.0);
        assert_eq!(json["metadata"]["kind"], "Group");

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back.vec3_field("position"), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_mat4_roundtrip() {
        let mut rec = Record::new("Group", "t1");
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        rec.insert_mat4("matrix", m);
        assert_eq!(rec.mat4_field("matrix"), Some(m));
    }

    #[test]
    fn test_table_lookup_is_position_independent() {
        let a = Record::new("Scene", "A");
        let b = Record::new("Mesh", "B");
        let records = vec![b, a];
        let table = RecordTable::new(&records);
        assert_eq!(table.get("A").unwrap().kind(), "Scene");
        assert_eq!(table.get("B").unwrap().kind(), "Mesh");
        assert!(table.get("C").is_none());
    }

    #[test]
    fn test_duplicate_token_keeps_later_record() {
        let first = Record::new("Group", "dup");
        let mut second = Record::new("Mesh", "dup");
        second.insert("name", "winner");
        let records = vec![first, second];

        let table = RecordTable::new(&records);
        let kept = table.get("dup").unwrap();
        assert_eq!(kept.kind(), "Mesh");
        assert_eq!(kept.str_field("name"), Some("winner"));
        // The underlying list still holds both entries.
        assert_eq!(table.records().len(), 2);
    }

    #[test]
    fn test_nested_record_field() {
        let mut outer = Record::new("Mesh", "m");
        outer.insert_record("geometry", Record::new("BoxGeometry", "g"));
        let inner = outer.record_field("geometry").unwrap();
        assert_eq!(inner.kind(), "BoxGeometry");
        assert!(outer.record_field("material").is_none());
    }
}
