use ipts_node::{MapBuilder, Node, NodeError};

use crate::column::ColumnType;
use crate::error::{TableError, TableResult};

/// Field holding the insertion time of each record, in UNIX seconds.
pub const TIMESTAMP_FIELD: &str = "_timestamp";

/// A named, typed column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: ColumnType,
}

/// The ordered field list of a table.
///
/// Parsed from `{"fields": {name: {"type": "<ty>"}, ...}}`. A `_timestamp`
/// field of type `u64` is added when the node does not declare one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Build from explicit fields.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> TableResult<Self> {
        let mut out: Vec<Field> = Vec::new();
        for field in fields {
            if out.iter().any(|f| f.name == field.name) {
                return Err(TableError::InvalidSchema(format!(
                    "duplicate field {:?}",
                    field.name
                )));
            }
            out.push(field);
        }
        match out.iter().find(|f| f.name == TIMESTAMP_FIELD) {
            Some(f) if f.ty != ColumnType::U64 => {
                return Err(TableError::InvalidSchema(format!(
                    "{TIMESTAMP_FIELD} must be u64, not {}",
                    f.ty
                )))
            }
            Some(_) => {}
            None => out.push(Field {
                name: TIMESTAMP_FIELD.to_string(),
                ty: ColumnType::U64,
            }),
        }
        Ok(Self { fields: out })
    }

    pub fn from_node(node: &Node) -> TableResult<Self> {
        let fields = node.lookup_by_key("fields").map_err(schema_error)?;
        let map = fields.as_map().map_err(schema_error)?;
        let parsed = map
            .iter()
            .map(|(name, decl)| {
                let ty = decl
                    .lookup_by_key("type")
                    .and_then(Node::as_str)
                    .map_err(|e| TableError::InvalidSchema(format!("field {name:?}: {e}")))?;
                Ok(Field {
                    name: name.to_string(),
                    ty: ty.parse()?,
                })
            })
            .collect::<TableResult<Vec<_>>>()?;
        Self::new(parsed)
    }

    pub fn to_node(&self) -> TableResult<Node> {
        let mut fields = MapBuilder::with_capacity(self.fields.len());
        for field in &self.fields {
            let decl = MapBuilder::new().entry("type", Node::from(field.ty.name()))?;
            fields.insert(field.name.clone(), decl.build())?;
        }
        Ok(MapBuilder::new().entry("fields", fields.build())?.build())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn schema_error(err: NodeError) -> TableError {
    TableError::InvalidSchema(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_node::dagjson;

    fn parse(json: &str) -> TableResult<Schema> {
        Schema::from_node(&dagjson::decode_slice(json.as_bytes()).unwrap())
    }

    #[test]
    fn timestamp_is_added() {
        let schema = parse(r#"{"fields": {"temp": {"type": "f32"}}}"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field("temp").unwrap().ty, ColumnType::F32);
        assert_eq!(schema.field(TIMESTAMP_FIELD).unwrap().ty, ColumnType::U64);
    }

    #[test]
    fn declared_timestamp_kept_once() {
        let schema = parse(r#"{"fields": {"_timestamp": {"type": "u64"}, "n": {"type": "i8"}}}"#)
            .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.names().filter(|n| *n == TIMESTAMP_FIELD).count(), 1);
    }

    #[test]
    fn timestamp_must_be_u64() {
        assert!(matches!(
            parse(r#"{"fields": {"_timestamp": {"type": "f64"}}}"#),
            Err(TableError::InvalidSchema(_))
        ));
    }

    #[test]
    fn malformed_schemas() {
        assert!(matches!(parse(r#"{"columns": {}}"#), Err(TableError::InvalidSchema(_))));
        assert!(matches!(parse(r#"{"fields": []}"#), Err(TableError::InvalidSchema(_))));
        assert!(matches!(
            parse(r#"{"fields": {"t": {"kind": "f32"}}}"#),
            Err(TableError::InvalidSchema(_))
        ));
        assert!(matches!(
            parse(r#"{"fields": {"t": {"type": "float"}}}"#),
            Err(TableError::UnknownType(_))
        ));
    }

    #[test]
    fn duplicate_fields_rejected() {
        let f = || Field {
            name: "a".into(),
            ty: ColumnType::U8,
        };
        assert!(Schema::new([f(), f()]).is_err());
    }

    #[test]
    fn node_roundtrip() {
        let schema = parse(r#"{"fields": {"temp": {"type": "f32"}, "rh": {"type": "u8"}}}"#).unwrap();
        let again = Schema::from_node(&schema.to_node().unwrap()).unwrap();
        assert_eq!(again, schema);
    }
}
