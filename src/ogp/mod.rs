//! Open Graph extraction pipeline: user-agent selection, streaming tag
//! extraction, resource validation, orchestration and caching.

pub mod cache;
pub mod extractor;
pub mod fetcher;
pub mod user_agent;
pub mod validator;

pub use cache::{CacheFront, CacheStore, MemoryStore};
pub use extractor::{extract_from_str, TagExtractor};
pub use fetcher::OgpFetcher;
pub use user_agent::{select_user_agent, UserAgentSelector};
pub use validator::ResourceValidator;
