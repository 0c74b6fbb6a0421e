use serde::{Deserialize, Serialize};

/// A serum sample as it travels through the service: the inbound request body,
/// the record decoded from the scoring script's output, and the response body
/// are all this one shape. Wire names follow the Sebia export conventions the
/// scoring script was trained against.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Sample {
    #[serde(rename = "sebiaSerumCurve")]
    pub serum_curve_hex: Option<String>,
    #[serde(rename = "sebiaSerumGelControlCurve")]
    pub gel_control_curve_hex: Option<String>,
    #[serde(
        rename = "sebiaSerumCurve_intArr",
        default,
        deserialize_with = "lenient::int_array"
    )]
    pub serum_curve_ints: Option<Vec<i64>>,
    #[serde(
        rename = "sebiaSerumGelControlCurve_intArr",
        default,
        deserialize_with = "lenient::int_array"
    )]
    pub gel_control_curve_ints: Option<Vec<i64>>,
    #[serde(
        rename = "gamma_region_cutoff",
        default,
        deserialize_with = "lenient::int"
    )]
    pub gamma_region_cutoff: Option<i64>,
    #[serde(rename = "prediction", default, deserialize_with = "lenient::int")]
    pub prediction: Option<i64>,
    #[serde(rename = "scikitLearnModelName")]
    pub model_name: Option<String>,
}

impl Sample {
    /// Empty sample carrying only the resolved model name, returned by the
    /// metadata probe.
    pub fn for_model(model: &str) -> Self {
        Sample {
            model_name: Some(model.to_string()),
            ..Default::default()
        }
    }

    pub fn from_curve_pair(serum_hex: String, gel_control_hex: String) -> Self {
        Sample {
            serum_curve_hex: Some(serum_hex),
            gel_control_curve_hex: Some(gel_control_hex),
            ..Default::default()
        }
    }
}

/// The scoring script serializes through pandas, which emits whole-valued
/// floats (e.g. `123.0`) in positions that are integers on our side. These
/// deserializers accept either form.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_i64(v: &Value) -> Option<i64> {
        v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
    }

    pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(v) => as_i64(&v)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom("expected an integer")),
        }
    }

    pub fn int_array<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    as_i64(item)
                        .ok_or_else(|| serde::de::Error::custom("expected an integer element"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(serde::de::Error::custom("expected an array")),
        }
    }
}
