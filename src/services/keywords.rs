use crate::errors::ServiceError;
use crate::models::{Item, HUB_SELLER_DOCTYPE};
use crate::services::collaborators::FieldLookup;
use std::sync::Arc;
use tracing::instrument;

/// A source of one keyword segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordField {
    /// An attribute of the item itself
    Local(&'static str),
    /// `link_field.fieldname`: a field of the record the item links to
    Linked {
        link_field: &'static str,
        doctype: &'static str,
        fieldname: &'static str,
    },
}

const fn seller_field(fieldname: &'static str) -> KeywordField {
    KeywordField::Linked {
        link_field: "hub_seller",
        doctype: HUB_SELLER_DOCTYPE,
        fieldname,
    }
}

/// Fields that make up the keyword string, in order
pub const KEYWORD_FIELDS: [KeywordField; 7] = [
    KeywordField::Local("name"),
    KeywordField::Local("item_name"),
    KeywordField::Local("item_code"),
    KeywordField::Local("hub_category"),
    seller_field("company"),
    seller_field("country"),
    seller_field("company_description"),
];

/// Builds the denormalized search string of an item
#[derive(Clone)]
pub struct KeywordIndexer {
    lookup: Arc<dyn FieldLookup>,
}

impl KeywordIndexer {
    pub fn new(lookup: Arc<dyn FieldLookup>) -> Self {
        Self { lookup }
    }

    /// Joins every keyword field with a single space. Missing values
    /// contribute an empty segment.
    #[instrument(skip(self, item), fields(item = %item.name))]
    pub async fn compute(&self, item: &Item) -> Result<String, ServiceError> {
        let mut keywords = Vec::with_capacity(KEYWORD_FIELDS.len());

        for field in KEYWORD_FIELDS {
            let value = match field {
                KeywordField::Local(fieldname) => item.get(fieldname).map(str::to_string),
                KeywordField::Linked {
                    link_field,
                    doctype,
                    fieldname,
                } => match item.get(link_field) {
                    Some(linked) => {
                        self.lookup
                            .get_field_value(doctype, linked, fieldname)
                            .await?
                    }
                    None => None,
                },
            };
            keywords.push(value.unwrap_or_default());
        }

        Ok(keywords.join(" "))
    }
}
