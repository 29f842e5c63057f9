use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::domain::{OutputFileId, PosterSet};

pub const GENERATE_POSTERS_PATH: &str = "/generate_posters";
pub const STATIC_OUTPUT_PATH: &str = "/static/output/";
pub const IMAGE_FIELD_NAME: &str = "image";

/// Success body of `POST /generate_posters`.
///
/// Every field is optional on the wire; absent values come through as empty.
/// `message` and `generated_count` are informational and become `None` when
/// their type does not match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratePostersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_files: Vec<OutputFileId>,
    #[serde(
        default,
        deserialize_with = "mismatch_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "mismatch_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_count: Option<usize>,
}

impl From<GeneratePostersResponse> for PosterSet {
    fn from(value: GeneratePostersResponse) -> Self {
        Self {
            title: value.title,
            description: value.description,
            outputs: value.output_files,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn mismatch_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}
