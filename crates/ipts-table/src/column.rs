use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use ipts_node::Node;

use crate::error::{TableError, TableResult};

/// Fixed-width cell type of a column. All multi-byte types are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ColumnType {
    pub const ALL: [ColumnType; 10] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
    ];

    /// Lowercase name as it appears in schemas.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Bytes per cell.
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Append the encoding of `value` to `out`.
    ///
    /// Integer columns take integer nodes that fit the type exactly; float
    /// columns take any number. Nothing is written on error.
    pub fn encode_value(self, field: &str, value: &Node, out: &mut Vec<u8>) -> TableResult<()> {
        let invalid = |reason: String| TableError::InvalidValue {
            field: field.to_string(),
            reason,
        };
        let float = || value.as_number().map_err(|e| invalid(e.to_string()));
        let written = match self {
            Self::U8 => out.write_u8(self.fit(field, value)?),
            Self::U16 => out.write_u16::<LittleEndian>(self.fit(field, value)?),
            Self::U32 => out.write_u32::<LittleEndian>(self.fit(field, value)?),
            Self::U64 => out.write_u64::<LittleEndian>(self.fit(field, value)?),
            Self::I8 => out.write_i8(self.fit(field, value)?),
            Self::I16 => out.write_i16::<LittleEndian>(self.fit(field, value)?),
            Self::I32 => out.write_i32::<LittleEndian>(self.fit(field, value)?),
            Self::I64 => out.write_i64::<LittleEndian>(self.fit(field, value)?),
            Self::F32 => out.write_f32::<LittleEndian>(float()? as f32),
            Self::F64 => out.write_f64::<LittleEndian>(float()?),
        };
        written.map_err(|e| invalid(e.to_string()))
    }

    /// Integer value of `value` narrowed to the column's type.
    fn fit<T: TryFrom<i64>>(self, field: &str, value: &Node) -> TableResult<T> {
        let invalid = |reason: String| TableError::InvalidValue {
            field: field.to_string(),
            reason,
        };
        let v = value.as_int().map_err(|e| invalid(e.to_string()))?;
        T::try_from(v).map_err(|_| invalid(format!("{v} out of range for {self}")))
    }

    /// Read one cell. Fails with `UnexpectedEof` when the column runs out.
    pub fn read_cell<R: Read>(self, r: &mut R) -> io::Result<Cell> {
        Ok(match self {
            Self::U8 => Cell::Unsigned(r.read_u8()?.into()),
            Self::U16 => Cell::Unsigned(r.read_u16::<LittleEndian>()?.into()),
            Self::U32 => Cell::Unsigned(r.read_u32::<LittleEndian>()?.into()),
            Self::U64 => Cell::Unsigned(r.read_u64::<LittleEndian>()?),
            Self::I8 => Cell::Signed(r.read_i8()?.into()),
            Self::I16 => Cell::Signed(r.read_i16::<LittleEndian>()?.into()),
            Self::I32 => Cell::Signed(r.read_i32::<LittleEndian>()?.into()),
            Self::I64 => Cell::Signed(r.read_i64::<LittleEndian>()?),
            Self::F32 => Cell::F32(r.read_f32::<LittleEndian>()?),
            Self::F64 => Cell::F64(r.read_f64::<LittleEndian>()?),
        })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| TableError::UnknownType(s.to_string()))
    }
}

/// One decoded value from a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    Unsigned(u64),
    Signed(i64),
    F32(f32),
    F64(f64),
    /// Seconds since the UNIX epoch, from the `_timestamp` column.
    Timestamp(u64),
}

impl Cell {
    /// Node form, for tree-format output.
    pub fn to_node(self) -> Node {
        match self {
            Self::Unsigned(v) | Self::Timestamp(v) => {
                i64::try_from(v).map(Node::Int).unwrap_or(Node::Float(v as f64))
            }
            Self::Signed(v) => Node::Int(v),
            Self::F32(v) => Node::Float(f64::from(v)),
            Self::F64(v) => Node::Float(v),
        }
    }

    /// The timestamp as a UTC date-time, if it is one and in range.
    pub fn as_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(secs) => DateTime::from_timestamp(i64::try_from(secs).ok()?, 0),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Timestamp(v) => match self.as_datetime() {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{v}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn names_roundtrip() {
        for ty in ColumnType::ALL {
            assert_eq!(ty.name().parse::<ColumnType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_name_rejected() {
        assert!(matches!(
            "float".parse::<ColumnType>(),
            Err(TableError::UnknownType(_))
        ));
        assert!("F32".parse::<ColumnType>().is_err());
    }

    #[test]
    fn widths() {
        assert_eq!(ColumnType::U8.width(), 1);
        assert_eq!(ColumnType::I16.width(), 2);
        assert_eq!(ColumnType::F32.width(), 4);
        assert_eq!(ColumnType::U64.width(), 8);
    }

    #[test]
    fn encode_f32_little_endian() {
        let mut out = Vec::new();
        ColumnType::F32
            .encode_value("temp", &Node::Float(1.0), &mut out)
            .unwrap();
        ColumnType::F32.encode_value("temp", &Node::Int(2), &mut out).unwrap();
        assert_eq!(out, vec![0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn float_columns_take_integers_at_their_own_width() {
        let mut out = Vec::new();
        ColumnType::F64.encode_value("v", &Node::Int(2), &mut out).unwrap();
        assert_eq!(out, 2.0f64.to_le_bytes());
        out.clear();
        ColumnType::F32.encode_value("v", &Node::Int(-1), &mut out).unwrap();
        assert_eq!(out, (-1.0f32).to_le_bytes());
    }

    #[test]
    fn encode_each_width() {
        for ty in ColumnType::ALL {
            let mut out = Vec::new();
            ty.encode_value("x", &Node::Int(7), &mut out).unwrap();
            assert_eq!(out.len(), ty.width(), "{ty}");
            let cell = ty.read_cell(&mut Cursor::new(&out)).unwrap();
            assert_eq!(cell.to_string(), "7", "{ty}");
        }
    }

    #[test]
    fn out_of_range_writes_nothing() {
        let mut out = Vec::new();
        let err = ColumnType::U8
            .encode_value("level", &Node::Int(256), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("out of range for u8"), "{err}");
        assert!(ColumnType::U32
            .encode_value("level", &Node::Int(-1), &mut out)
            .is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn integer_column_rejects_floats_and_strings() {
        let mut out = Vec::new();
        assert!(matches!(
            ColumnType::I32.encode_value("n", &Node::Float(1.5), &mut out),
            Err(TableError::InvalidValue { .. })
        ));
        assert!(ColumnType::F64
            .encode_value("n", &Node::from("1.5"), &mut out)
            .is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn read_past_end_is_eof() {
        let err = ColumnType::U16
            .read_cell(&mut Cursor::new(&[0x01u8][..]))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn timestamp_display() {
        assert_eq!(Cell::Timestamp(0).to_string(), "1970-01-01 00:00:00");
        assert_eq!(Cell::Timestamp(1_600_000_000).to_string(), "2020-09-13 12:26:40");
        assert_eq!(Cell::Timestamp(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn cell_to_node() {
        assert_eq!(Cell::Unsigned(3).to_node(), Node::Int(3));
        assert_eq!(Cell::Signed(-3).to_node(), Node::Int(-3));
        assert_eq!(Cell::F32(0.5).to_node(), Node::Float(0.5));
        assert_eq!(Cell::Timestamp(10).to_node(), Node::Int(10));
    }
}
