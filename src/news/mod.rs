//! News domain records and the collaborator traits that supply them.

mod feed;
mod model;

pub use feed::{ArticleFeed, ArticleQuery, SourceCatalog};
pub use model::{Article, ArticleSource, SourceItem};
