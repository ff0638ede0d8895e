//! Text encoding for list-valued columns.
//!
//! `sideEffects` and `alternatives` are persisted as JSON array strings and
//! handed out as sequences.

use crate::errors::Error;

pub fn encode_list(values: &[String]) -> Result<String, Error> {
    Ok(serde_json::to_string(values)?)
}

pub fn decode_list(encoded: &str) -> Result<Vec<String>, Error> {
    // Rows written before the column existed hold an empty string
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_list_round_trip(values in proptest::collection::vec(any::<String>(), 0..12)) {
            let encoded = encode_list(&values).unwrap();
            let decoded = decode_list(&encoded).unwrap();
            prop_assert_eq!(decoded, values);
        }
    }

    #[test]
    fn encodes_as_json_array() {
        let encoded = encode_list(&["Nausea".to_string(), "Headache".to_string()]).unwrap();
        assert_eq!(encoded, r#"["Nausea","Headache"]"#);
    }

    #[test]
    fn decodes_blank_as_empty() {
        assert!(decode_list("").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_text() {
        assert!(matches!(decode_list("Nausea"), Err(Error::Codec(_))));
    }
}
