pub mod file;
pub mod hub_item;
pub mod hub_seller;

pub use file::{Entity as File, Model as FileModel};
pub use hub_item::{Entity as HubItem, Model as HubItemModel};
pub use hub_seller::{Entity as HubSeller, Model as HubSellerModel};
