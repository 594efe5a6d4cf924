//! Library size and content-count rollup.

use crate::sources::{LibrarySection, SectionType};
use crate::types::ServerStats;
use recap_common::format_bytes;

/// Count items per section type and sum every file size across all sections.
pub fn summarize_catalog(sections: &[LibrarySection]) -> ServerStats {
    let mut stats = ServerStats {
        movies_count: 0,
        shows_count: 0,
        episodes_count: 0,
        total_bytes: 0,
        total_bytes_formatted: String::new(),
    };

    for section in sections {
        let items = section.items.len() as u64;
        match section.section_type {
            SectionType::Movie => stats.movies_count += items,
            SectionType::Show => stats.shows_count += items,
            SectionType::Episode => stats.episodes_count += items,
            SectionType::Other => {}
        }

        stats.total_bytes = section
            .items
            .iter()
            .flat_map(|item| item.file_sizes.iter())
            .fold(stats.total_bytes, |acc, &size| acc.saturating_add(size));
    }

    #[allow(clippy::cast_precision_loss)]
    {
        stats.total_bytes_formatted = format_bytes(stats.total_bytes as f64);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::LibraryItem;

    fn item(title: &str, sizes: &[u64]) -> LibraryItem {
        LibraryItem {
            title: title.to_string(),
            file_sizes: sizes.to_vec(),
        }
    }

    fn section(section_type: SectionType, items: Vec<LibraryItem>) -> LibrarySection {
        LibrarySection {
            title: format!("{section_type:?}"),
            section_type,
            items,
        }
    }

    #[test]
    fn test_empty_catalog() {
        let stats = summarize_catalog(&[]);
        assert_eq!(stats.movies_count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.total_bytes_formatted, "0 Bytes");
    }

    #[test]
    fn test_counts_and_bytes() {
        let sections = vec![
            section(
                SectionType::Movie,
                vec![item("A", &[512, 512]), item("B", &[1024])],
            ),
            section(SectionType::Show, vec![item("Show", &[])]),
            section(
                SectionType::Episode,
                vec![item("E1", &[1024]), item("E2", &[1024]), item("E3", &[])],
            ),
            section(SectionType::Other, vec![item("Song", &[2048])]),
        ];
        let stats = summarize_catalog(&sections);

        assert_eq!(stats.movies_count, 2);
        assert_eq!(stats.shows_count, 1);
        assert_eq!(stats.episodes_count, 3);
        assert_eq!(stats.total_bytes, 6144);
        assert_eq!(stats.total_bytes_formatted, "6 KB");
    }

    #[test]
    fn test_single_kilobyte() {
        let stats = summarize_catalog(&[section(SectionType::Movie, vec![item("A", &[1024])])]);
        assert_eq!(stats.total_bytes_formatted, "1 KB");
    }

    #[test]
    fn test_byte_total_saturates() {
        let stats = summarize_catalog(&[section(
            SectionType::Movie,
            vec![item("A", &[u64::MAX]), item("B", &[10])],
        )]);
        assert_eq!(stats.total_bytes, u64::MAX);
    }
}
