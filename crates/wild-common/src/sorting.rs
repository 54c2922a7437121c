//! Sort option resolution shared by every list view.
//!
//! A client asks for an ordering by key (`?sort_by=overrated`). The key is
//! checked against the entity being listed and falls back to `newest` when it
//! is missing, unknown, or meaningless for that entity. The resolved option
//! then yields a whitelisted `ORDER BY` clause, so no client text ever reaches
//! the SQL.

use serde::{Deserialize, Serialize};

/// Entities that can be listed, sorted, and (except petitions) voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Animal,
    Discussion,
    Comment,
    Petition,
    UserList,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Animal,
        EntityKind::Discussion,
        EntityKind::Comment,
        EntityKind::UserList,
        EntityKind::Petition,
    ];

    /// Resolve a profile tab / vote category (`animals`, `lists`, ...).
    pub fn from_category(category: &str) -> Option<Self> {
        match category {
            "animals" => Some(Self::Animal),
            "discussions" => Some(Self::Discussion),
            "comments" => Some(Self::Comment),
            "lists" => Some(Self::UserList),
            "petitions" => Some(Self::Petition),
            _ => None,
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Self::Animal => "animals",
            Self::Discussion => "discussions",
            Self::Comment => "comments",
            Self::UserList => "lists",
            Self::Petition => "petitions",
        }
    }

    /// Table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Animal => "animals",
            Self::Discussion => "discussions",
            Self::Comment => "comments",
            Self::UserList => "user_lists",
            Self::Petition => "petitions",
        }
    }

    /// Column used for alphabetical ordering, if the entity has one.
    fn label_column(self) -> Option<&'static str> {
        match self {
            Self::Animal => Some("name"),
            Self::Discussion | Self::UserList | Self::Petition => Some("title"),
            Self::Comment => None,
        }
    }

    pub fn has_votes(self) -> bool {
        !matches!(self, Self::Petition)
    }

    pub fn has_signatures(self) -> bool {
        matches!(self, Self::Petition)
    }
}

/// A sort key accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
    Title,
    Name,
    Overrated,
    Underrated,
    Newest,
    Oldest,
    MostSigned,
    LeastSigned,
}

impl SortOption {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "name" => Some(Self::Name),
            "overrated" => Some(Self::Overrated),
            "underrated" => Some(Self::Underrated),
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "most_signed" => Some(Self::MostSigned),
            "least_signed" => Some(Self::LeastSigned),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Name => "name",
            Self::Overrated => "overrated",
            Self::Underrated => "underrated",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostSigned => "most_signed",
            Self::LeastSigned => "least_signed",
        }
    }

    /// Human-readable form used in page headings ("most signed").
    pub fn label(self) -> String {
        self.key().replace('_', " ")
    }

    /// Check `choice` against `kind`, falling back to [`SortOption::Newest`].
    pub fn resolve(choice: Option<&str>, kind: EntityKind) -> Self {
        let Some(option) = choice.and_then(Self::parse) else {
            return Self::Newest;
        };
        match option {
            Self::Title | Self::Name => match kind {
                EntityKind::Animal => Self::Name,
                EntityKind::Comment => Self::Newest,
                _ => Self::Title,
            },
            Self::Overrated | Self::Underrated if !kind.has_votes() => Self::Newest,
            Self::MostSigned | Self::LeastSigned if !kind.has_signatures() => Self::Newest,
            other => other,
        }
    }

    /// `ORDER BY` body for a resolved option. `prefix` qualifies the columns
    /// when the query joins other tables (e.g. `"a."`).
    pub fn order_clause(self, kind: EntityKind, prefix: &str) -> String {
        let (column, direction) = match self {
            Self::Title | Self::Name => match kind.label_column() {
                Some(column) => (column, "ASC"),
                None => ("created_at", "DESC"),
            },
            Self::Overrated => ("votes", "DESC"),
            Self::Underrated => ("votes", "ASC"),
            Self::Newest => ("created_at", "DESC"),
            Self::Oldest => ("created_at", "ASC"),
            Self::MostSigned => ("signatures", "DESC"),
            Self::LeastSigned => ("signatures", "ASC"),
        };
        let tiebreak = match self {
            Self::Newest => "DESC",
            _ => "ASC",
        };
        format!("{prefix}{column} {direction}, {prefix}id {tiebreak}")
    }
}

/// Sort keys accepted by the profile directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSort {
    Name,
    Newest,
    Oldest,
}

impl ProfileSort {
    pub fn resolve(choice: Option<&str>) -> Self {
        match choice {
            Some("name") => Self::Name,
            Some("oldest") => Self::Oldest,
            _ => Self::Newest,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }

    pub fn order_clause(self) -> &'static str {
        match self {
            Self::Name => "username ASC, id ASC",
            Self::Newest => "created_at DESC, id DESC",
            Self::Oldest => "created_at ASC, id ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_unknown_falls_back_to_newest() {
        for kind in EntityKind::ALL {
            assert_eq!(SortOption::resolve(None, kind), SortOption::Newest);
            assert_eq!(SortOption::resolve(Some("bogus"), kind), SortOption::Newest);
        }
    }

    #[test]
    fn test_animal_title_means_name() {
        assert_eq!(
            SortOption::resolve(Some("title"), EntityKind::Animal),
            SortOption::Name
        );
        assert_eq!(
            SortOption::resolve(Some("name"), EntityKind::Discussion),
            SortOption::Title
        );
    }

    #[test]
    fn test_comments_cannot_sort_alphabetically() {
        assert_eq!(
            SortOption::resolve(Some("title"), EntityKind::Comment),
            SortOption::Newest
        );
        assert_eq!(
            SortOption::resolve(Some("name"), EntityKind::Comment),
            SortOption::Newest
        );
    }

    #[test]
    fn test_inapplicable_fields_fall_back() {
        assert_eq!(
            SortOption::resolve(Some("overrated"), EntityKind::Petition),
            SortOption::Newest
        );
        assert_eq!(
            SortOption::resolve(Some("most_signed"), EntityKind::Animal),
            SortOption::Newest
        );
        assert_eq!(
            SortOption::resolve(Some("least_signed"), EntityKind::Petition),
            SortOption::LeastSigned
        );
        assert_eq!(
            SortOption::resolve(Some("underrated"), EntityKind::UserList),
            SortOption::Underrated
        );
    }

    #[test]
    fn test_order_clauses() {
        assert_eq!(
            SortOption::Overrated.order_clause(EntityKind::Animal, ""),
            "votes DESC, id ASC"
        );
        assert_eq!(
            SortOption::Newest.order_clause(EntityKind::Discussion, "d."),
            "d.created_at DESC, d.id DESC"
        );
        assert_eq!(
            SortOption::Name.order_clause(EntityKind::Animal, "a."),
            "a.name ASC, a.id ASC"
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(SortOption::MostSigned.label(), "most signed");
        assert_eq!(SortOption::Overrated.label(), "overrated");
    }

    #[test]
    fn test_category_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_category(kind.category()), Some(kind));
        }
        assert_eq!(EntityKind::from_category("profiles"), None);
    }

    #[test]
    fn test_profile_sort() {
        assert_eq!(ProfileSort::resolve(Some("name")), ProfileSort::Name);
        assert_eq!(ProfileSort::resolve(Some("oldest")), ProfileSort::Oldest);
        assert_eq!(ProfileSort::resolve(Some("overrated")), ProfileSort::Newest);
        assert_eq!(ProfileSort::resolve(None), ProfileSort::Newest);
    }
}
