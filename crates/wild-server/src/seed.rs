//! Seed import.
//!
//! Reads `animal.json` and `profile.json` (produced offline), creates the
//! `animalcorner` author, the listed profiles and animals, then generates a
//! handful of discussions, petitions and user lists between random profiles
//! and animals. Rows are matched by name or title, so running it twice does
//! not duplicate anything.

use anyhow::Context;
use rand::Rng;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use wild_common::{
    models::{AnimalSeedFile, ProfileSeedFile, UserProfile},
    slug::slugify,
};
use wild_db::{
    Database,
    repository::{
        animals, discussions,
        petitions::{self, NewPetition},
        profiles, user_lists,
    },
};

const AUTHOR_USERNAME: &str = "animalcorner";
const AUTHOR_EMAIL: &str = "animalcorner@gmail.com";
const AUTHOR_PASSWORD: &str = "WAD2Test2024";

/// Profiles and animals drawn for each batch of sample content.
const SAMPLE_SIZE: i64 = 5;

const ADJECTIVES: [&str; 4] = ["scariest", "gorgeous", "fastest", "slowest"];
const PETITION_DESCRIPTION: &str = "This animal is at the risk of extinction!";
const PETITION_GOAL: i64 = 100;

/// Rows created by one import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub profiles: usize,
    pub animals: usize,
    pub discussions: usize,
    pub petitions: usize,
    pub user_lists: usize,
}

fn load<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<BTreeMap<String, T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid seed file {}", path.display()))
}

pub async fn run(
    db: &Database,
    animals_path: &Path,
    profiles_path: &Path,
    reset: bool,
) -> anyhow::Result<SeedReport> {
    let animal_entries: AnimalSeedFile = load(animals_path)?;
    let profile_entries: ProfileSeedFile = load(profiles_path)?;
    let pool = &db.pool;

    if reset {
        clear(pool).await?;
    }

    let mut report = SeedReport::default();

    let (author, created) =
        ensure_profile(pool, AUTHOR_USERNAME, Some(AUTHOR_EMAIL), AUTHOR_PASSWORD, None).await?;
    report.profiles += usize::from(created);

    for (username, entry) in &profile_entries {
        let (_, created) = ensure_profile(
            pool,
            username,
            Some(entry.email.as_str()),
            &entry.password,
            picture_path(&entry.image_path),
        )
        .await?;
        report.profiles += usize::from(created);
    }

    for (name, entry) in &animal_entries {
        let slug = slugify(name);
        if slug.is_empty() {
            tracing::warn!(name = %name, "Skipping animal without a usable slug");
            continue;
        }
        if animals::name_taken(pool, name, &slug).await? {
            continue;
        }
        let votes = rand::rng().random_range(1..=100);
        animals::create_with_votes(
            pool,
            author.id,
            name,
            &entry.description,
            picture_path(&entry.image_path),
            &slug,
            votes,
        )
        .await?;
        report.animals += 1;
    }

    report.discussions = add_discussions(pool).await?;
    report.petitions = add_petitions(pool).await?;
    report.user_lists = add_user_lists(pool).await?;

    Ok(report)
}

/// Seed files use an empty `image_path` when no picture was downloaded.
fn picture_path(image_path: &str) -> Option<&str> {
    Some(image_path).filter(|p| !p.is_empty())
}

/// Delete every row, children before parents.
async fn clear(pool: &SqlitePool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    for table in [
        "votes",
        "petition_signatures",
        "petition_animals",
        "user_list_animals",
        "comments",
        "discussions",
        "petitions",
        "user_lists",
        "animals",
        "profiles",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!("Existing rows cleared");
    Ok(())
}

/// Returns the profile and whether it was created.
async fn ensure_profile(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password: &str,
    picture: Option<&str>,
) -> anyhow::Result<(UserProfile, bool)> {
    if let Some(existing) = profiles::find_by_username(pool, username).await? {
        return Ok((existing, false));
    }

    let hash = wild_api::auth::hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password for {username}: {e}"))?;
    let profile = profiles::create_profile(pool, username, email, &hash).await?;
    if let Some(picture) = picture {
        profiles::set_picture(pool, profile.id, picture).await?;
    }
    Ok((profile, true))
}

async fn add_discussions(pool: &SqlitePool) -> anyhow::Result<usize> {
    let users = profiles::random(pool, SAMPLE_SIZE).await?;
    let picks = animals::random(pool, SAMPLE_SIZE).await?;
    let mut created = 0;

    for (user, animal) in users.iter().zip(&picks) {
        let title = format!("Why do you like {} by {}?", animal.name, user.username);
        let slug = slugify(&title);
        if discussions::title_taken(pool, &title, &slug).await? {
            continue;
        }
        discussions::create_discussion(pool, user.id, animal.id, &title, "", &slug).await?;
        created += 1;
    }
    Ok(created)
}

async fn add_petitions(pool: &SqlitePool) -> anyhow::Result<usize> {
    let users = profiles::random(pool, SAMPLE_SIZE).await?;
    let picks = animals::random(pool, SAMPLE_SIZE).await?;
    let mut created = 0;

    for (user, animal) in users.iter().zip(&picks) {
        let title = format!("Petition for {} by {}", animal.name, user.username);
        let slug = slugify(&title);
        if petitions::title_taken(pool, &title, &slug).await? {
            continue;
        }

        let signatures = rand::rng().random_range(0..=PETITION_GOAL);

        let petition = petitions::create_petition(
            pool,
            &NewPetition {
                author_id: user.id,
                title: &title,
                slug: &slug,
                description: PETITION_DESCRIPTION,
                decision_maker: "",
                goal: PETITION_GOAL,
                animal_ids: &[animal.id],
            },
        )
        .await?;
        petitions::set_counts(pool, petition.id, PETITION_GOAL, signatures).await?;
        if let Some(picture) = &animal.picture {
            petitions::set_picture(pool, petition.id, picture).await?;
        }
        created += 1;
    }
    Ok(created)
}

async fn add_user_lists(pool: &SqlitePool) -> anyhow::Result<usize> {
    let users = profiles::random(pool, SAMPLE_SIZE).await?;
    let animal_ids: Vec<i64> = animals::random(pool, SAMPLE_SIZE)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();
    let mut created = 0;

    for user in &users {
        let adjective = ADJECTIVES[rand::rng().random_range(0..ADJECTIVES.len())];
        let title = format!("Top {adjective} animals by {}", user.username);
        let slug = slugify(&title);
        if user_lists::title_taken(pool, &title, &slug).await? {
            continue;
        }
        user_lists::create_user_list(pool, user.id, &title, "", &slug, &animal_ids).await?;
        created += 1;
    }
    Ok(created)
}
