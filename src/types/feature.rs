use color_eyre::eyre;
use color_eyre::eyre::eyre;
use geojson::JsonObject;
use serde::{Deserialize, Serialize};

/// Properties that are attached to a track feature
#[derive(Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Length of the line in metres
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// For converting FeatureProperties to geojson properties
impl TryInto<JsonObject> for FeatureProperties {
    type Error = eyre::Error;

    fn try_into(self) -> Result<JsonObject, Self::Error> {
        let value = serde_json::to_value(self)?;
        let properties = value
            .as_object()
            .ok_or(eyre!("Couldn't create object for properties"))?;
        Ok(properties.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_properties_omit_name() {
        let properties: JsonObject = FeatureProperties {
            distance: 12.5,
            name: None,
        }
        .try_into()
        .unwrap();
        assert_eq!(properties.get("distance"), Some(&serde_json::json!(12.5)));
        assert!(!properties.contains_key("name"));
    }
}
