//! PDF object types.
//!
//! The eight PDF value kinds form a closed set, so they live in a single
//! sum type. References stay lazy: `Object::Reference` is just a numbered
//! handle and is only resolved when a consumer asks the document for it.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array, escapes already decoded)
    String(Vec<u8>),
    /// Name (without the leading /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(HashMap<String, Object>),
    /// Stream (dictionary + payload)
    Stream {
        /// Stream dictionary
        dict: HashMap<String, Object>,
        /// Stream payload; raw on parse, replaced in place once decoded
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub num: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(num: u32, gen: u16) -> Self {
        Self { num, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.num, self.gen)
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an Integer or Real.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&HashMap<String, Object>> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Decode stream data using the filters named in the stream dictionary.
    ///
    /// Filters are applied in the order given; the first filter decodes
    /// the outermost layer. `/DecodeParms` mirrors the filter arity, so
    /// each filter sees its own parameter dictionary (and only the Flate
    /// stage applies a predictor).
    ///
    /// # Errors
    ///
    /// `Error::UnsupportedFilter` when a declared filter has no decoder;
    /// `Error::Decode` when a decoder rejects its input. Callers treat
    /// both as warnings and keep the raw bytes.
    pub fn decode_stream_data(&self) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let filters = dict
                    .get("Filter")
                    .map(extract_filter_names)
                    .unwrap_or_default();

                if filters.is_empty() {
                    return Ok(data.to_vec());
                }

                let params = extract_decode_params(dict.get("DecodeParms"), filters.len());
                crate::decoders::decode_stream(data, &filters, &params)
            },
            _ => Err(Error::Decode(format!(
                "decode_stream_data on non-stream object ({})",
                self.type_name()
            ))),
        }
    }
}

/// Follow a reference through the object table.
///
/// Non-references and dangling references return the input unchanged;
/// consumers that need to distinguish a miss check `as_reference()` on
/// the result.
pub fn resolve<'a>(objects: &'a HashMap<u32, Object>, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(r) => objects.get(&r.num).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract filter names from a /Filter entry.
///
/// The entry is either a single name (`/FlateDecode`) or an array of
/// names (`[/ASCII85Decode /FlateDecode]`). Anything else yields an
/// empty list.
pub fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

/// Extract per-filter decode parameters from a /DecodeParms entry.
///
/// DecodeParms mirrors the filter arity: a single dictionary, an array of
/// dictionaries (with nulls for filters that take none), or absent. The
/// result always has `filter_count` slots.
pub fn extract_decode_params(
    params_obj: Option<&Object>,
    filter_count: usize,
) -> Vec<Option<crate::decoders::DecodeParams>> {
    let mut out = vec![None; filter_count];

    match params_obj {
        Some(Object::Dictionary(d)) => {
            if let Some(slot) = out.first_mut() {
                *slot = Some(params_from_dict(d));
            }
        },
        Some(Object::Array(arr)) => {
            for (i, item) in arr.iter().enumerate().take(filter_count) {
                if let Object::Dictionary(d) = item {
                    out[i] = Some(params_from_dict(d));
                }
            }
        },
        _ => {},
    }

    out
}

fn params_from_dict(dict: &HashMap<String, Object>) -> crate::decoders::DecodeParams {
    crate::decoders::DecodeParams {
        predictor: dict
            .get("Predictor")
            .and_then(|o| o.as_integer())
            .unwrap_or(1),
        columns: dict
            .get("Columns")
            .and_then(|o| o.as_integer())
            .unwrap_or(1) as usize,
        colors: dict.get("Colors").and_then(|o| o.as_integer()).unwrap_or(1) as usize,
        bits_per_component: dict
            .get("BitsPerComponent")
            .and_then(|o| o.as_integer())
            .unwrap_or(8) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_integer() {
        let obj = Object::Integer(42);
        assert_eq!(obj.as_integer(), Some(42));
        assert_eq!(obj.as_number(), Some(42.0));
        assert!(obj.as_name().is_none());
        assert!(!obj.is_null());
    }

    #[test]
    fn test_object_real_as_number() {
        let obj = Object::Real(1.5);
        assert_eq!(obj.as_number(), Some(1.5));
        assert!(obj.as_integer().is_none());
    }

    #[test]
    fn test_object_name() {
        let obj = Object::Name("Type".to_string());
        assert_eq!(obj.as_name(), Some("Type"));
    }

    #[test]
    fn test_stream_dict_access() {
        let mut dict = HashMap::new();
        dict.insert("Length".to_string(), Object::Integer(100));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"stream data"),
        };

        let d = obj.as_dict().unwrap();
        assert_eq!(d.get("Length").unwrap().as_integer(), Some(100));
    }

    #[test]
    fn test_object_ref_display() {
        assert_eq!(format!("{}", ObjectRef::new(10, 0)), "10 0 R");
    }

    #[test]
    fn test_extract_filter_names_single() {
        let filter = Object::Name("FlateDecode".to_string());
        assert_eq!(extract_filter_names(&filter), vec!["FlateDecode"]);
    }

    #[test]
    fn test_extract_filter_names_array() {
        let filter = Object::Array(vec![
            Object::Name("ASCII85Decode".to_string()),
            Object::Name("FlateDecode".to_string()),
        ]);
        assert_eq!(extract_filter_names(&filter), vec!["ASCII85Decode", "FlateDecode"]);
    }

    #[test]
    fn test_extract_filter_names_invalid() {
        assert!(extract_filter_names(&Object::Integer(42)).is_empty());
    }

    #[test]
    fn test_decode_params_single_dict() {
        let mut d = HashMap::new();
        d.insert("Predictor".to_string(), Object::Integer(12));
        d.insert("Columns".to_string(), Object::Integer(4));
        let params = extract_decode_params(Some(&Object::Dictionary(d)), 1);
        assert_eq!(params.len(), 1);
        let p = params[0].as_ref().unwrap();
        assert_eq!(p.predictor, 12);
        assert_eq!(p.columns, 4);
        assert_eq!(p.colors, 1);
        assert_eq!(p.bits_per_component, 8);
    }

    #[test]
    fn test_decode_params_array_with_null() {
        let mut d = HashMap::new();
        d.insert("Predictor".to_string(), Object::Integer(2));
        let arr = Object::Array(vec![Object::Null, Object::Dictionary(d)]);
        let params = extract_decode_params(Some(&arr), 2);
        assert!(params[0].is_none());
        assert_eq!(params[1].as_ref().unwrap().predictor, 2);
    }

    #[test]
    fn test_decode_stream_no_filter() {
        let obj = Object::Stream {
            dict: HashMap::new(),
            data: bytes::Bytes::from_static(b"Hello"),
        };
        assert_eq!(obj.decode_stream_data().unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_stream_not_a_stream() {
        assert!(Object::Integer(42).decode_stream_data().is_err());
    }
}
