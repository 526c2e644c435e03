use std::fmt;

/// Reading state recognized by the MyAnimeList manga import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Reading,
    Completed,
    OnHold,
    Dropped,
    PlanToRead,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Reading,
        Status::Completed,
        Status::OnHold,
        Status::Dropped,
        Status::PlanToRead,
    ];

    /// Label as it appears in the source CSV and in `<my_status>`.
    pub fn label(self) -> &'static str {
        match self {
            Status::Reading => "Reading",
            Status::Completed => "Completed",
            Status::OnHold => "On-Hold",
            Status::Dropped => "Dropped",
            Status::PlanToRead => "Plan to Read",
        }
    }

    /// Exact, case-sensitive match against the canonical labels.
    pub fn from_label(label: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six source columns of one CSV data row. Missing columns are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub mal: String,
    pub title: String,
    pub kind: String,
    pub read: String,
    pub rating: String,
    pub last_read: String,
}

/// One `<manga>` entry. Every field is kept as text because that is all the
/// import schema ever sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaRecord {
    pub manga_mangadb_id: String,
    /// Raw title; emitted inside a CDATA section.
    pub manga_title: String,
    pub manga_volumes: String,
    pub manga_chapters: String,
    pub my_id: String,
    pub my_read_volumes: String,
    pub my_read_chapters: String,
    pub my_start_date: String,
    pub my_finish_date: String,
    pub my_scanalation_group: String,
    pub my_score: String,
    pub my_storage: String,
    pub my_status: String,
    pub my_comments: String,
    pub my_times_read: String,
    pub my_tags: String,
    pub my_reread_value: String,
    pub update_on_import: String,
}

/// How a field's text is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    CData,
}

impl MangaRecord {
    /// Constant template that per-row values are merged into. The source
    /// export carries no volume/chapter totals, storage or tags.
    pub fn template() -> Self {
        Self {
            manga_mangadb_id: "0".to_string(),
            manga_title: String::new(),
            manga_volumes: "0".to_string(),
            manga_chapters: "0".to_string(),
            my_id: "0".to_string(),
            my_read_volumes: "0".to_string(),
            my_read_chapters: "0".to_string(),
            my_start_date: crate::config::DATE_SENTINEL.to_string(),
            my_finish_date: crate::config::DATE_SENTINEL.to_string(),
            my_scanalation_group: String::new(),
            my_score: "0".to_string(),
            my_storage: String::new(),
            my_status: Status::PlanToRead.label().to_string(),
            my_comments: String::new(),
            my_times_read: "0".to_string(),
            my_tags: String::new(),
            my_reread_value: "Low".to_string(),
            update_on_import: "1".to_string(),
        }
    }

    /// Fields in schema order as `(tag, kind, value)`.
    pub fn fields(&self) -> [(&'static str, FieldKind, &str); 18] {
        use FieldKind::{CData, Text};
        [
            ("manga_mangadb_id", Text, self.manga_mangadb_id.as_str()),
            ("manga_title", CData, self.manga_title.as_str()),
            ("manga_volumes", Text, self.manga_volumes.as_str()),
            ("manga_chapters", Text, self.manga_chapters.as_str()),
            ("my_id", Text, self.my_id.as_str()),
            ("my_read_volumes", Text, self.my_read_volumes.as_str()),
            ("my_read_chapters", Text, self.my_read_chapters.as_str()),
            ("my_start_date", Text, self.my_start_date.as_str()),
            ("my_finish_date", Text, self.my_finish_date.as_str()),
            ("my_scanalation_group", CData, self.my_scanalation_group.as_str()),
            ("my_score", Text, self.my_score.as_str()),
            ("my_storage", Text, self.my_storage.as_str()),
            ("my_status", Text, self.my_status.as_str()),
            ("my_comments", CData, self.my_comments.as_str()),
            ("my_times_read", Text, self.my_times_read.as_str()),
            ("my_tags", CData, self.my_tags.as_str()),
            ("my_reread_value", Text, self.my_reread_value.as_str()),
            ("update_on_import", Text, self.update_on_import.as_str()),
        ]
    }
}
