// Collaborator interfaces and their default implementations
pub mod collaborators;
pub mod fetch;
pub mod files;
pub mod hashing;
pub mod records;

// Lifecycle hooks
pub mod images;
pub mod keywords;
pub mod naming;
pub mod validator;

// Remote file mirroring
pub mod mirror;

// Persistence layer
pub mod hub_items;

pub use collaborators::{
    FieldLookup, FileStore, Filters, HashGenerator, HttpFetcher, RecordCounter, SaveFile,
};
pub use hub_items::HubItemService;
pub use images::ImageNormalizer;
pub use keywords::KeywordIndexer;
pub use mirror::RemoteFileMirror;
pub use naming::ItemNamer;
pub use validator::RecordValidator;
