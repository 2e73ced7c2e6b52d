pub mod item;

pub use item::{ImageField, ImagePayload, Item, HUB_ITEM_DOCTYPE, HUB_SELLER_DOCTYPE};

/// A file created by the storage collaborator
pub type StoredFile = crate::entities::file::Model;
