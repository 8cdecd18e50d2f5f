// ============================================================================
// Record Encoding - JSON and YAML
// ============================================================================
//
// The encoded form is a flat mapping from field name to value, in field
// table order. Decoding is keyed by name: fields missing from the input keep
// their catalog default and unknown fields are ignored, so older and newer
// clients can exchange records.

use crate::errors::{ParamError, ParamResult};
use crate::fields::FIELDS;
use crate::record::ParameterRecord;
use serde_json::Value;
use std::path::Path;

/// Structured text format of an encoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension (`.json`, `.yaml`, `.yml`)
    pub fn from_path(path: &Path) -> ParamResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(ParamError::InvalidConfiguration(format!(
                "Cannot infer record format from {:?}; use .json, .yaml or .yml",
                path
            ))),
        }
    }

    pub fn encode(self, record: &ParameterRecord) -> ParamResult<String> {
        match self {
            Format::Json => encode_json(record),
            Format::Yaml => encode_yaml(record),
        }
    }

    pub fn decode(self, text: &str, band_count: usize) -> ParamResult<ParameterRecord> {
        match self {
            Format::Json => decode_json(text, band_count),
            Format::Yaml => decode_yaml(text, band_count),
        }
    }
}

/// Encode a record as a JSON value
pub fn to_value(record: &ParameterRecord) -> ParamResult<Value> {
    serde_json::to_value(record)
        .map_err(|e| ParamError::InvalidConfiguration(format!("Failed to encode record: {}", e)))
}

/// Encode a record as pretty-printed JSON
pub fn encode_json(record: &ParameterRecord) -> ParamResult<String> {
    serde_json::to_string_pretty(record)
        .map_err(|e| ParamError::InvalidConfiguration(format!("Failed to encode record: {}", e)))
}

/// Encode a record as YAML
pub fn encode_yaml(record: &ParameterRecord) -> ParamResult<String> {
    serde_yaml::to_string(record)
        .map_err(|e| ParamError::InvalidConfiguration(format!("Failed to encode record: {}", e)))
}

/// Build a record for a session of `band_count` bands from a decoded mapping
///
/// Every field present in `value` goes through [`ParameterRecord::set_json`],
/// so type, selector, length and range errors keep their own kinds. Nothing
/// is returned unless every present field is accepted.
pub fn from_value(value: &Value, band_count: usize) -> ParamResult<ParameterRecord> {
    let map = value.as_object().ok_or_else(|| {
        ParamError::DecodeError(format!(
            "expected a mapping of parameter names to values, found {}",
            kind_of(value)
        ))
    })?;

    let mut record = ParameterRecord::new(band_count)?;
    let mut missing = Vec::new();

    for spec in FIELDS.iter() {
        match map.get(spec.name) {
            Some(v) => record.set_json(spec.name, v)?,
            None => missing.push(spec.name),
        }
    }

    if !missing.is_empty() {
        log::debug!("Fields not in input, using defaults: {:?}", missing);
    }

    let unknown: Vec<&String> = map
        .keys()
        .filter(|k| !FIELDS.iter().any(|f| f.name == k.as_str()))
        .collect();
    if !unknown.is_empty() {
        log::debug!("Ignoring unknown fields: {:?}", unknown);
    }

    Ok(record)
}

/// Decode a JSON record for a session of `band_count` bands
pub fn decode_json(text: &str, band_count: usize) -> ParamResult<ParameterRecord> {
    let value: Value = serde_json::from_str(text)?;
    from_value(&value, band_count)
}

/// Decode a YAML record for a session of `band_count` bands
pub fn decode_yaml(text: &str, band_count: usize) -> ParamResult<ParameterRecord> {
    let value: Value = serde_yaml::from_str(text)?;
    from_value(&value, band_count)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;
    use crate::selectors::AdaptiveFilterType;
    use serde_json::json;

    #[test]
    fn test_encoding_covers_exactly_the_field_table_in_order() {
        let record = ParameterRecord::new(10).unwrap();
        let json = encode_json(&record).unwrap();

        // Key order of the text follows declaration order
        let mut last = 0;
        for spec in FIELDS.iter() {
            let needle = format!("\"{}\":", spec.name);
            let pos = json
                .find(&needle)
                .unwrap_or_else(|| panic!("field {} not encoded", spec.name));
            assert!(pos >= last, "field {} out of order", spec.name);
            last = pos;
        }

        let value = to_value(&record).unwrap();
        assert_eq!(value.as_object().unwrap().len(), FIELDS.len());
    }

    #[test]
    fn test_wire_representation() {
        let record = ParameterRecord::new(2).unwrap();
        let value = to_value(&record).unwrap();
        assert_eq!(value["en_ha"], json!(1));
        assert_eq!(value["rear_mics"], json!(0));
        assert_eq!(value["aligned"], json!(true));
        assert_eq!(value["afc_type"], json!(3));
        assert_eq!(value["bf_fir_length"], json!(319));
        assert_eq!(value["knee_low"], json!([45.0, 45.0]));
        assert_eq!(value["audio_recordfile"], json!("sample.wav"));
        assert_eq!(value["record_start"], json!(0));
    }

    #[test]
    fn test_json_round_trip() {
        let mut record = ParameterRecord::new(10).unwrap();
        record.g50[3] = 12.5;
        record.afc_type = AdaptiveFilterType::Ipnlms;
        record.afc_mu = 0.0123;
        record.bf = true;
        record.audio_filename = "speech.wav".to_string();
        record.audio_play = true;

        let decoded = decode_json(&encode_json(&record).unwrap(), 10).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut record = ParameterRecord::new(6).unwrap();
        record.knee_low.assign("knee_low", &[40.0, 42.5, 45.0, 47.5, 50.0, 55.0]).unwrap();
        record.afc_delta = 2.5e-7;
        record.bf_type = AdaptiveFilterType::PassThrough;

        let decoded = decode_yaml(&encode_yaml(&record).unwrap(), 6).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let mut record = ParameterRecord::new(10).unwrap();
        record.gain = -6.0;
        record.afc_mu = 0.02;

        let mut value = to_value(&record).unwrap();
        value.as_object_mut().unwrap().remove("afc_mu");

        let decoded = from_value(&value, 10).unwrap();
        assert_eq!(decoded.afc_mu, crate::defaults::afc::MU);
        assert_eq!(decoded.gain, -6.0);
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let record = ParameterRecord::new(10).unwrap();
        let mut value = to_value(&record).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("future_knob".to_string(), json!({"nested": [1, 2]}));

        let decoded = from_value(&value, 10).unwrap();
        assert_eq!(decoded, record);
        assert!(decoded.get("future_knob").is_none());
        assert!(!to_value(&decoded).unwrap().as_object().unwrap().contains_key("future_knob"));
    }

    #[test]
    fn test_empty_mapping_is_default_record() {
        assert_eq!(decode_json("{}", 4).unwrap(), ParameterRecord::new(4).unwrap());
    }

    #[test]
    fn test_original_client_integers_and_booleans() {
        let decoded = decode_json(
            r#"{"en_ha": 0, "afc": true, "aligned": false, "global_mpo": 115, "afc_type": 1}"#,
            10,
        )
        .unwrap();
        assert!(!decoded.en_ha);
        assert!(decoded.afc);
        assert!(!decoded.aligned);
        assert_eq!(decoded.global_mpo, 115.0);
        assert_eq!(decoded.afc_type, AdaptiveFilterType::Fxlms);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_json("{not json", 10), Err(ParamError::DecodeError(_))));
        assert!(matches!(decode_json("[1, 2, 3]", 10), Err(ParamError::DecodeError(_))));
        assert!(matches!(decode_yaml("- a\n- b\n", 10), Err(ParamError::DecodeError(_))));
        assert!(matches!(decode_json("{}", 0), Err(ParamError::InvalidConfiguration(_))));
        assert!(matches!(
            decode_json(r#"{"g80": [1.0, 2.0]}"#, 10),
            Err(ParamError::LengthMismatch { field: "g80", .. })
        ));
        assert!(matches!(
            decode_json(r#"{"bf_type": 9}"#, 10),
            Err(ParamError::UnknownSelector { field: "bf_type", value: 9 })
        ));
        assert!(matches!(
            decode_json(r#"{"audio_filename": 3}"#, 10),
            Err(ParamError::TypeMismatch { field: "audio_filename", .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/session.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("session.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("session.yaml")).unwrap(), Format::Yaml);
        assert!(Format::from_path(Path::new("session.txt")).is_err());
        assert!(Format::from_path(Path::new("session")).is_err());
    }

    #[test]
    fn test_format_dispatch() {
        let mut record = ParameterRecord::new(3).unwrap();
        record
            .set("release", FieldValue::Bands(vec![10.0, 20.0, 30.0]))
            .unwrap();
        for format in [Format::Json, Format::Yaml] {
            let text = format.encode(&record).unwrap();
            assert_eq!(format.decode(&text, 3).unwrap(), record);
        }
    }
}
