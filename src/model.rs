use serde_json::{Map, Value};

use crate::foundation::error::{PostcardError, PostcardResult};

/// Untyped key/value bag carried by every layer.
pub type Attributes = Map<String, Value>;

/// A generated post as returned by the generation backend.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Post {
    /// Backend-assigned identifier.
    #[serde(rename = "post_id", default)]
    pub id: String,
    /// Author id.
    #[serde(rename = "post_author", default)]
    pub author: i64,
    /// Chats the post is assigned to.
    #[serde(rename = "assigned_chat_id", default)]
    pub assigned_chat_ids: Vec<i64>,
    /// Plain text sent alongside the image.
    #[serde(rename = "main_text", default)]
    pub body_text: String,
    /// Visual layers; input order is advisory, paint order comes from `order_index`.
    #[serde(rename = "content", default)]
    pub layers: Vec<Layer>,
}

/// One visual element of a post.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Opaque identifier.
    #[serde(rename = "layer_id", default)]
    pub id: String,
    /// Layer kind.
    #[serde(rename = "type", default)]
    pub kind: LayerKind,
    /// Paint order, ascending.
    #[serde(default)]
    pub order_index: i64,
    /// Kind-specific geometry and content.
    #[serde(rename = "data", default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
}

/// Kind of a [`Layer`].
///
/// Kinds this crate does not know about decode into [`LayerKind::Other`] and are skipped when
/// painting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Filled axis-aligned rectangle.
    Rectangle,
    /// Embedded base64 raster image.
    Image,
    /// Single line of bitmap text.
    Text,
    /// Unrecognized kind, kept verbatim.
    Other(String),
}

impl Default for LayerKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl LayerKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Image => "image",
            Self::Text => "text",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for LayerKind {
    fn from(s: &str) -> Self {
        match s {
            "rectangle" => Self::Rectangle,
            "image" => Self::Image,
            "text" => Self::Text,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl serde::Serialize for LayerKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for LayerKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl Layer {
    /// Layer with empty attributes.
    pub fn new(kind: impl Into<LayerKind>, order_index: i64) -> Self {
        Self {
            id: String::new(),
            kind: kind.into(),
            order_index,
            attributes: Attributes::new(),
        }
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Return a copy with the given id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Post {
    /// Decode a post from backend JSON.
    pub fn from_json(s: &str) -> PostcardResult<Self> {
        serde_json::from_str(s).map_err(|e| PostcardError::decode(format!("post json: {e}")))
    }

    /// Decode a post from a reader yielding backend JSON.
    pub fn from_reader(r: impl std::io::Read) -> PostcardResult<Self> {
        serde_json::from_reader(r).map_err(|e| PostcardError::decode(format!("post json: {e}")))
    }
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Attributes, D::Error> {
    use serde::Deserialize as _;
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

/// Layers in paint order: ascending `order_index`, ties kept in input order.
pub fn paint_order(layers: &[Layer]) -> Vec<&Layer> {
    let mut sorted: Vec<&Layer> = layers.iter().collect();
    // `sort_by_key` is stable.
    sorted.sort_by_key(|l| l.order_index);
    sorted
}
