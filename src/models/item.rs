use crate::entities::hub_item;
use crate::errors::ServiceError;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Doctype label used for file attachments and hash namespaces
pub const HUB_ITEM_DOCTYPE: &str = "Hub Item";
/// Doctype behind the `hub_seller` link field
pub const HUB_SELLER_DOCTYPE: &str = "Hub Seller";

/// An inline image upload as sent by Hub clients:
/// `{"file_name": "a.png", "base64": "<content>"}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImagePayload {
    pub file_name: String,
    #[serde(rename = "base64")]
    pub base64_content: String,
}

#[derive(Deserialize)]
struct RawImagePayload {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    base64: Option<String>,
}

impl From<RawImagePayload> for ImagePayload {
    fn from(raw: RawImagePayload) -> Self {
        Self {
            file_name: raw.file_name.unwrap_or_default(),
            base64_content: raw.base64.unwrap_or_default(),
        }
    }
}

/// The `image` attribute of an item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageField {
    #[default]
    Empty,
    /// A stored file URL or any other plain reference
    Reference(String),
    /// Inline content that has not been written to storage yet
    PendingUpload(ImagePayload),
}

impl ImageField {
    /// Interprets the raw column/wire value.
    ///
    /// Only values starting with `{` are treated as payloads; everything else
    /// non-empty is a reference.
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw {
            None | Some("") => Ok(ImageField::Empty),
            Some(value) if value.starts_with('{') => {
                let payload: RawImagePayload = serde_json::from_str(value).map_err(|e| {
                    ServiceError::InvalidInput(format!("image payload is not valid JSON: {}", e))
                })?;
                Ok(ImageField::PendingUpload(payload.into()))
            }
            Some(value) => Ok(ImageField::Reference(value.to_string())),
        }
    }

    /// Column representation; pending payloads are stored as their JSON form
    pub fn to_column(&self) -> Option<String> {
        match self {
            ImageField::Empty => None,
            ImageField::Reference(url) => Some(url.clone()),
            ImageField::PendingUpload(payload) => serde_json::to_string(payload).ok(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageField::PendingUpload(_))
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            ImageField::Reference(url) => Some(url),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageInput {
    Text(String),
    Payload(RawImagePayload),
}

impl<'de> Deserialize<'de> for ImageField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<ImageInput>::deserialize(deserializer)? {
            None => Ok(ImageField::Empty),
            Some(ImageInput::Text(text)) => {
                ImageField::parse(Some(&text)).map_err(de::Error::custom)
            }
            Some(ImageInput::Payload(raw)) => Ok(ImageField::PendingUpload(raw.into())),
        }
    }
}

impl Serialize for ImageField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ImageField::Empty => serializer.serialize_none(),
            ImageField::Reference(url) => serializer.serialize_str(url),
            ImageField::PendingUpload(payload) => payload.serialize(serializer),
        }
    }
}

/// A Hub Item as seen by the lifecycle hooks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Identifier; empty until the first save names the item
    #[serde(default)]
    pub name: String,
    pub item_name: Option<String>,
    pub item_code: Option<String>,
    pub hub_category: Option<String>,
    pub hub_seller: Option<String>,
    pub route: Option<String>,
    #[serde(default)]
    pub image: ImageField,
    pub keywords: Option<String>,
}

impl Item {
    /// Reads a plain attribute by field name
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "name" if !self.name.is_empty() => Some(&self.name),
            "item_name" => self.item_name.as_deref(),
            "item_code" => self.item_code.as_deref(),
            "hub_category" => self.hub_category.as_deref(),
            "hub_seller" => self.hub_seller.as_deref(),
            "route" => self.route.as_deref(),
            "image" => self.image.as_reference(),
            "keywords" => self.keywords.as_deref(),
            _ => None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.name.is_empty()
    }

    /// Takes every field left unset here from `stored`. An empty image keeps
    /// the stored one; keywords are always rebuilt on save.
    pub fn fill_missing_from(&mut self, stored: &Item) {
        fn keep(field: &mut Option<String>, stored: &Option<String>) {
            if field.is_none() {
                field.clone_from(stored);
            }
        }

        keep(&mut self.item_name, &stored.item_name);
        keep(&mut self.item_code, &stored.item_code);
        keep(&mut self.hub_category, &stored.hub_category);
        keep(&mut self.hub_seller, &stored.hub_seller);
        keep(&mut self.route, &stored.route);
        if self.image == ImageField::Empty {
            self.image = stored.image.clone();
        }
    }
}

impl TryFrom<hub_item::Model> for Item {
    type Error = ServiceError;

    fn try_from(model: hub_item::Model) -> Result<Self, Self::Error> {
        let image = ImageField::parse(model.image.as_deref())?;
        Ok(Self {
            name: model.name,
            item_name: model.item_name,
            item_code: model.item_code,
            hub_category: model.hub_category,
            hub_seller: model.hub_seller,
            route: model.route,
            image,
            keywords: model.keywords,
        })
    }
}
