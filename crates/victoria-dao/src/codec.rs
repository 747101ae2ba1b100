use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::DaoResult;

/// Converts elements to and from document content.
///
/// Both directions fail with [`DaoError::Serialization`](crate::DaoError)
/// on input they cannot represent.
pub trait DocumentCodec<E>: Send + Sync {
    fn encode(&self, element: &E) -> DaoResult<Value>;
    fn decode(&self, content: Value) -> DaoResult<E>;
}

/// `serde_json` codec for any serde-capable element.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl<E> DocumentCodec<E> for JsonCodec
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, element: &E) -> DaoResult<Value> {
        Ok(serde_json::to_value(element)?)
    }

    fn decode(&self, content: Value) -> DaoResult<E> {
        Ok(serde_json::from_value(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaoError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn json_codec_encodes_fields() {
        let value = JsonCodec.encode(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value, json!({"x": 1, "y": 2}));
        let back: Point = JsonCodec.decode(value).unwrap();
        assert_eq!(back, Point { x: 1, y: 2 });
    }

    #[test]
    fn malformed_content_is_a_serialization_error() {
        let err = DocumentCodec::<Point>::decode(&JsonCodec, json!({"x": "one"})).unwrap_err();
        assert!(matches!(err, DaoError::Serialization(_)));
    }
}
