//! Plex adapter: library listings with file sizes.

use crate::http::{ApiClient, ApiClientConfig};
use async_trait::async_trait;
use futures::future::try_join_all;
use recap_common::de::optional_string;
use recap_common::Result;
use recap_config::PlexSettings;
use recap_stats::{CatalogSource, LibraryItem, LibrarySection, SectionType};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SERVICE: &str = "Plex";

/// Plex `type` filter value for episodes.
const EPISODE_TYPE: &str = "4";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
struct SectionList {
    #[serde(rename = "Directory", default)]
    directories: Vec<SectionDirectory>,
}

/// A library section as listed by `/library/sections`.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionDirectory {
    /// Section key used in item URLs.
    #[serde(deserialize_with = "optional_string", default)]
    pub key: Option<String>,
    /// Section name.
    #[serde(default)]
    pub title: String,
    /// `movie`, `show`, `artist`, `photo`.
    #[serde(rename = "type", default)]
    pub section_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct ItemList {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexItem>,
}

/// One library item with its media files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexItem {
    /// Item title.
    #[serde(default)]
    pub title: String,
    /// Media versions of the item.
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
}

/// One media version of an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexMedia {
    /// Files making up this version.
    #[serde(rename = "Part", default)]
    pub parts: Vec<PlexPart>,
}

/// One file of a media version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexPart {
    /// File size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

impl From<PlexItem> for LibraryItem {
    fn from(item: PlexItem) -> Self {
        Self {
            title: item.title,
            file_sizes: item
                .media
                .iter()
                .flat_map(|media| media.parts.iter())
                .filter_map(|part| part.size)
                .collect(),
        }
    }
}

/// Plex Media Server client
#[derive(Debug, Clone)]
pub struct PlexClient {
    api: ApiClient,
}

impl PlexClient {
    /// Create a client from the `plex` settings.
    pub fn new(settings: &PlexSettings) -> Result<Self> {
        let api = ApiClient::new(
            ApiClientConfig::new(
                SERVICE,
                &settings.url,
                Duration::from_secs(settings.timeout_seconds),
            )
            .with_header("x-plex-token", &settings.token),
        )?;
        Ok(Self { api })
    }

    /// List the library sections.
    pub async fn sections(&self) -> Result<Vec<SectionDirectory>> {
        let envelope: Envelope<SectionList> = self.api.get_json("library/sections", &[]).await?;
        Ok(envelope.media_container.directories)
    }

    async fn items(&self, key: &str, plex_type: Option<&str>) -> Result<Vec<LibraryItem>> {
        let path = format!("library/sections/{key}/all");
        let query: Vec<(&str, String)> = plex_type
            .map(|t| vec![("type", t.to_string())])
            .unwrap_or_default();
        let envelope: Envelope<ItemList> = self.api.get_json(&path, &query).await?;
        Ok(envelope
            .media_container
            .metadata
            .into_iter()
            .map(LibraryItem::from)
            .collect())
    }

    /// Expand one section directory into the listings the rollup needs.
    ///
    /// Show libraries yield two listings: the shows, which carry no files,
    /// and their episodes, which do.
    async fn expand(&self, directory: &SectionDirectory) -> Result<Vec<LibrarySection>> {
        let Some(key) = directory.key.as_deref() else {
            debug!(title = %directory.title, "Skipping section without a key");
            return Ok(Vec::new());
        };

        let section = |section_type, items| LibrarySection {
            title: directory.title.clone(),
            section_type,
            items,
        };

        Ok(match directory.section_type.as_str() {
            "movie" => vec![section(SectionType::Movie, self.items(key, None).await?)],
            "show" => vec![
                section(SectionType::Show, self.items(key, None).await?),
                section(SectionType::Episode, self.items(key, Some(EPISODE_TYPE)).await?),
            ],
            _ => vec![section(SectionType::Other, self.items(key, None).await?)],
        })
    }
}

#[async_trait]
impl CatalogSource for PlexClient {
    #[instrument(skip(self))]
    async fn library_sections(&self) -> Result<Vec<LibrarySection>> {
        let directories = self.sections().await?;
        let expanded = try_join_all(directories.iter().map(|d| self.expand(d))).await?;
        let sections: Vec<LibrarySection> = expanded.into_iter().flatten().collect();
        info!(sections = sections.len(), "Fetched library listings");
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let settings = PlexSettings {
            token: "abc".to_string(),
            ..PlexSettings::default()
        };
        assert!(PlexClient::new(&settings).is_ok());
    }

    #[test]
    fn test_section_list_deserialization() {
        let json = r#"{"MediaContainer": {"size": 3, "Directory": [
            {"key": "1", "title": "Movies", "type": "movie"},
            {"key": 2, "title": "TV Shows", "type": "show"},
            {"key": "3", "title": "Music", "type": "artist"}
        ]}}"#;
        let envelope: Envelope<SectionList> = serde_json::from_str(json).unwrap();
        let dirs = envelope.media_container.directories;
        assert_eq!(dirs.len(), 3);
        assert_eq!(dirs[1].key.as_deref(), Some("2"));
        assert_eq!(dirs[2].section_type, "artist");
    }

    #[test]
    fn test_item_sizes_from_parts() {
        let json = r#"{"MediaContainer": {"Metadata": [
            {"title": "Two Versions", "Media": [
                {"Part": [{"size": 1000}, {"size": 24}]},
                {"Part": [{"size": 2048}]}
            ]},
            {"title": "A Show"},
            {"title": "Unsized", "Media": [{"Part": [{"file": "/x.mkv"}]}]}
        ]}}"#;
        let envelope: Envelope<ItemList> = serde_json::from_str(json).unwrap();
        let items: Vec<LibraryItem> = envelope
            .media_container
            .metadata
            .into_iter()
            .map(LibraryItem::from)
            .collect();

        assert_eq!(items[0].file_sizes, vec![1000, 24, 2048]);
        assert!(items[1].file_sizes.is_empty());
        assert!(items[2].file_sizes.is_empty());
    }

    #[test]
    fn test_empty_container() {
        let envelope: Envelope<ItemList> =
            serde_json::from_str(r#"{"MediaContainer": {"size": 0}}"#).unwrap();
        assert!(envelope.media_container.metadata.is_empty());
    }
}
