use std::{fmt, path::Path};

use serde::{
    de::{self, value::MapAccessDeserializer, Error as _, MapAccess, SeqAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use toml::value::Datetime;

use crate::error::PageDataError;

/// One listed file or folder: named string fields kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Record::new(), |record, (name, value)| {
                record.with_field(name, value)
            })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a table of scalar record fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = Record::new();
        while let Some(name) = access.next_key::<String>()? {
            let FieldText(text) = access
                .next_value()
                .map_err(|error| A::Error::custom(format!("record field '{name}' {error}")))?;
            record = record.with_field(name, text);
        }
        Ok(record)
    }
}

/// A scalar field value rendered as text. TOML dates keep their literal
/// form, so `date = 2024-01-04` reads the same as `date = "2024-01-04"`.
struct FieldText(String);

impl<'de> Deserialize<'de> for FieldText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldTextVisitor)
    }
}

struct FieldTextVisitor;

impl<'de> Visitor<'de> for FieldTextVisitor {
    type Value = FieldText;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number, boolean or date")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(FieldText(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(FieldText(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(FieldText(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(FieldText(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(FieldText(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(FieldText(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldText(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldText(String::new()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<Self::Value, A::Error> {
        Err(A::Error::custom(NOT_SCALAR))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        Datetime::deserialize(MapAccessDeserializer::new(map))
            .map(|datetime| FieldText(datetime.to_string()))
            .map_err(|_| A::Error::custom(NOT_SCALAR))
    }
}

const NOT_SCALAR: &str = "must be a scalar";

pub type RecordList = Vec<Record>;

/// Redirect parameters of a page. An empty `redirect_url` means the page is a
/// normal listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRecord {
    #[serde(default, rename = "extractCode")]
    pub extract_code: String,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: String,
    #[serde(default, rename = "redirectPromptHTML")]
    pub redirect_prompt_html: String,
}

impl RedirectRecord {
    pub fn is_redirect(&self) -> bool {
        !self.redirect_url.is_empty()
    }

    /// Field view used when the dialog fragment is bound under the `info`
    /// namespace.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with_field("extractCode", self.extract_code.as_str())
            .with_field("redirectURL", self.redirect_url.as_str())
            .with_field("redirectPromptHTML", self.redirect_prompt_html.as_str())
    }
}

/// Everything a page's data file provides, passed explicitly to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub redirect: RedirectRecord,
    #[serde(default)]
    pub files: RecordList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDataFormat {
    Toml,
    Json,
}

impl PageDataFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        match Path::new(path).extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl PageData {
    pub fn parse(raw: &str, format: PageDataFormat) -> Result<Self, PageDataError> {
        match format {
            PageDataFormat::Toml => Ok(toml::from_str(raw)?),
            PageDataFormat::Json => Ok(serde_json::from_str(raw)?),
        }
    }

    pub fn parse_for_path(raw: &str, path: &str) -> Result<Self, PageDataError> {
        let format = PageDataFormat::from_path(path).ok_or_else(|| {
            PageDataError::UnsupportedFormat {
                path: path.to_string(),
            }
        })?;
        Self::parse(raw, format)
    }
}
