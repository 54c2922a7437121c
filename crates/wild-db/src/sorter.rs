//! Sorted listings: resolve the requested sort key for an entity, then run
//! the matching repository query.

use serde::Serialize;
use sqlx::SqlitePool;
use wild_common::{
    models::{
        animal::Animal, comment::Comment, discussion::Discussion, petition::Petition,
        profile::UserProfile, user_list::UserList,
    },
    pagination::PageWindow,
    sorting::{EntityKind, ProfileSort, SortOption},
};

use crate::repository::{animals, comments, discussions, petitions, profiles, user_lists};

/// Rows of any listable kind, serialized as a plain array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SortedEntities {
    Animals(Vec<Animal>),
    Discussions(Vec<Discussion>),
    Comments(Vec<Comment>),
    Petitions(Vec<Petition>),
    UserLists(Vec<UserList>),
}

impl SortedEntities {
    pub fn len(&self) -> usize {
        match self {
            Self::Animals(v) => v.len(),
            Self::Discussions(v) => v.len(),
            Self::Comments(v) => v.len(),
            Self::Petitions(v) => v.len(),
            Self::UserLists(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Count rows of `kind`, optionally only those by `author_id`.
pub async fn count_model(
    pool: &SqlitePool,
    kind: EntityKind,
    author_id: Option<i64>,
) -> Result<i64, sqlx::Error> {
    match kind {
        EntityKind::Animal => animals::count(pool, author_id).await,
        EntityKind::Discussion => discussions::count(pool, author_id).await,
        EntityKind::Petition => petitions::count(pool, author_id).await,
        EntityKind::UserList => user_lists::count(pool, author_id).await,
        EntityKind::Comment => comments::count(pool, author_id).await,
    }
}

/// List `kind` ordered by `choice`, optionally restricted to one author.
pub async fn sort_model(
    pool: &SqlitePool,
    choice: Option<&str>,
    kind: EntityKind,
    author_id: Option<i64>,
    window: Option<PageWindow>,
) -> Result<(SortOption, SortedEntities), sqlx::Error> {
    let sort = SortOption::resolve(choice, kind);
    let rows = match kind {
        EntityKind::Animal => {
            SortedEntities::Animals(animals::list_sorted(pool, sort, author_id, window).await?)
        }
        EntityKind::Discussion => SortedEntities::Discussions(
            discussions::list_sorted(pool, sort, author_id, window).await?,
        ),
        EntityKind::Petition => {
            SortedEntities::Petitions(petitions::list_sorted(pool, sort, author_id, window).await?)
        }
        EntityKind::UserList => {
            SortedEntities::UserLists(user_lists::list_sorted(pool, sort, author_id, window).await?)
        }
        // comment feeds are never paginated
        EntityKind::Comment => {
            SortedEntities::Comments(comments::list_sorted(pool, sort, author_id).await?)
        }
    };
    Ok((sort, rows))
}

pub async fn sort_profiles(
    pool: &SqlitePool,
    choice: Option<&str>,
    window: Option<PageWindow>,
) -> Result<(ProfileSort, Vec<UserProfile>), sqlx::Error> {
    let sort = ProfileSort::resolve(choice);
    let rows = profiles::list_sorted(pool, sort, window).await?;
    Ok((sort, rows))
}

pub async fn sort_user_list_animals(
    pool: &SqlitePool,
    choice: Option<&str>,
    list_id: i64,
    window: Option<PageWindow>,
) -> Result<(SortOption, Vec<Animal>), sqlx::Error> {
    let sort = SortOption::resolve(choice, EntityKind::Animal);
    let rows = animals::list_in_list(pool, list_id, sort, window).await?;
    Ok((sort, rows))
}

pub async fn sort_animal_discussions(
    pool: &SqlitePool,
    choice: Option<&str>,
    animal_id: i64,
) -> Result<(SortOption, Vec<Discussion>), sqlx::Error> {
    let sort = SortOption::resolve(choice, EntityKind::Discussion);
    let rows = discussions::list_for_animal(pool, animal_id, sort).await?;
    Ok((sort, rows))
}

pub async fn sort_discussion_comments(
    pool: &SqlitePool,
    choice: Option<&str>,
    discussion_id: i64,
) -> Result<(SortOption, Vec<Comment>), sqlx::Error> {
    let sort = SortOption::resolve(choice, EntityKind::Comment);
    let rows = comments::list_for_discussion(pool, discussion_id, sort).await?;
    Ok((sort, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use wild_common::slug::slugify;

    async fn seeded() -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let author = profiles::create_profile(&db.pool, "testuser", None, "hash").await.unwrap();
        for (name, votes) in [("Lion", 3), ("Aardvark", 7), ("Zebra", -1)] {
            animals::create_with_votes(&db.pool, author.id, name, "", None, &slugify(name), votes)
                .await
                .unwrap();
        }
        (db, author.id)
    }

    fn animal_names(rows: &SortedEntities) -> Vec<&str> {
        match rows {
            SortedEntities::Animals(v) => v.iter().map(|a| a.name.as_str()).collect(),
            other => panic!("expected animals, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_title_on_animals_sorts_by_name() {
        let (db, _) = seeded().await;
        let (sort, rows) = sort_model(&db.pool, Some("title"), EntityKind::Animal, None, None)
            .await
            .unwrap();
        assert_eq!(sort, SortOption::Name);
        assert_eq!(animal_names(&rows), ["Aardvark", "Lion", "Zebra"]);
    }

    #[tokio::test]
    async fn test_inapplicable_choice_falls_back_to_newest() {
        let (db, _) = seeded().await;
        let (sort, rows) =
            sort_model(&db.pool, Some("most_signed"), EntityKind::Animal, None, None)
                .await
                .unwrap();
        assert_eq!(sort, SortOption::Newest);
        assert_eq!(animal_names(&rows), ["Zebra", "Aardvark", "Lion"]);
    }

    #[tokio::test]
    async fn test_overrated_and_author_filter() {
        let (db, author) = seeded().await;
        let (_, rows) = sort_model(&db.pool, Some("overrated"), EntityKind::Animal, Some(author), None)
            .await
            .unwrap();
        assert_eq!(animal_names(&rows), ["Aardvark", "Lion", "Zebra"]);

        let stranger = profiles::create_profile(&db.pool, "stranger", None, "hash").await.unwrap();
        let (_, rows) =
            sort_model(&db.pool, None, EntityKind::Animal, Some(stranger.id), None)
                .await
                .unwrap();
        assert!(rows.is_empty());
        assert_eq!(count_model(&db.pool, EntityKind::Animal, Some(author)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sort_profiles() {
        let (db, _) = seeded().await;
        profiles::create_profile(&db.pool, "abby", None, "hash").await.unwrap();

        let (sort, rows) = sort_profiles(&db.pool, Some("name"), None).await.unwrap();
        assert_eq!(sort, ProfileSort::Name);
        assert_eq!(rows[0].username, "abby");

        let (sort, rows) = sort_profiles(&db.pool, Some("overrated"), None).await.unwrap();
        assert_eq!(sort, ProfileSort::Newest);
        assert_eq!(rows[0].username, "abby");
    }

    #[tokio::test]
    async fn test_comments_ignore_title() {
        let (db, author) = seeded().await;
        let lion = animals::find_by_slug(&db.pool, "lion").await.unwrap().unwrap();
        let thread =
            discussions::create_discussion(&db.pool, author, lion.id, "Lions", "", "lions")
                .await
                .unwrap();
        comments::create_comment(&db.pool, author, thread.id, "b").await.unwrap();
        comments::create_comment(&db.pool, author, thread.id, "a").await.unwrap();

        let (sort, rows) = sort_discussion_comments(&db.pool, Some("title"), thread.id)
            .await
            .unwrap();
        assert_eq!(sort, SortOption::Newest);
        assert_eq!(rows[0].content, "a");
    }
}
