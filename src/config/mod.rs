//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::PrismicConfig;
pub use site::ReadingConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
