//! TVDB Episode Provider Core Library
//!
//! This crate resolves episode-level metadata for a media library item from
//! TheTVDB and maps it into the host library's schema.
//!
//! # Features
//! - Locator validation and episode id resolution (by number or air date)
//! - Aired / DVD / absolute numbering selection
//! - Guest star credit parsing for split `"Name (Role, Role)"` entries
//! - Multi-episode files merged into a single result
//! - Rate-limited, token-authenticated HTTP catalog client

pub mod catalog;
pub mod client;
pub mod combiner;
pub mod error;
pub mod mapper;
pub mod parser;
pub mod provider;
pub mod types;

// Re-export main types for convenience
pub use catalog::{EpisodeCatalog, EpisodeQuery};
pub use client::{ClientConfig, RateLimiter, TvdbClient};
pub use error::{Result, TvdbError};
pub use provider::{EpisodeProvider, ProviderConfig, SpanFetch};
pub use types::{
    DisplayOrder, EpisodeLanguage, EpisodeLocator, MappedEpisode, MetadataResult, PersonCredit,
    PersonKind, RawEpisodeRecord, RawNumber, RemoteSearchResult,
};
