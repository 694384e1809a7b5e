//! Structural validation of manifest JSON.

use serde_json::{Map, Value};

use crate::{Item, ManifestError, Section};

/// Validate the top-level array and convert it into sections.
pub(crate) fn sections(value: &Value) -> Result<Vec<Section>, ManifestError> {
    let Value::Array(raw_sections) = value else {
        return Err(invalid("manifest", "expected an array of sections"));
    };

    raw_sections
        .iter()
        .enumerate()
        .map(|(index, raw)| section(raw, &format!("section[{index}]")))
        .collect()
}

fn section(value: &Value, location: &str) -> Result<Section, ManifestError> {
    let Value::Object(fields) = value else {
        return Err(invalid(location, "expected an object"));
    };

    let name = non_empty_str(fields, "section")
        .ok_or_else(|| invalid(location, "missing non-empty \"section\" label"))?;

    let Some(Value::Array(raw_items)) = fields.get("items") else {
        return Err(invalid(location, "\"items\" must be an array"));
    };

    let items = raw_items
        .iter()
        .enumerate()
        .map(|(index, raw)| item(raw, &format!("{location}.items[{index}]")))
        .collect::<Result<_, _>>()?;

    Ok(Section {
        name: name.to_owned(),
        items,
    })
}

fn item(value: &Value, location: &str) -> Result<Item, ManifestError> {
    let Value::Object(fields) = value else {
        return Err(invalid(location, "expected an object"));
    };

    let title = non_empty_str(fields, "title")
        .ok_or_else(|| invalid(location, "missing non-empty \"title\""))?
        .to_owned();

    // An item carrying both keys renders as an external link.
    if let Some(url) = non_empty_str(fields, "url") {
        return Ok(Item::External {
            title,
            url: url.to_owned(),
        });
    }
    if let Some(file) = non_empty_str(fields, "file") {
        return Ok(Item::Internal {
            title,
            file: file.to_owned(),
        });
    }

    Err(invalid(location, "either \"file\" or \"url\" is required"))
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn invalid(location: &str, message: &str) -> ManifestError {
    ManifestError::Validation {
        location: location.to_owned(),
        message: message.to_owned(),
    }
}
