pub mod message_source;
pub mod wordpress_client;

pub use message_source::{FolderSource, Message, MessageSource};
pub use wordpress_client::WordpressClient;
