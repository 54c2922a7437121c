//! Seed-file formats produced by the offline content downloader.
//!
//! `animal.json` maps animal names to their description and picture;
//! `profile.json` maps usernames to credentials and picture.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSeed {
    pub description: String,
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSeed {
    pub email: String,
    pub password: String,
    pub image_path: String,
}

pub type AnimalSeedFile = BTreeMap<String, AnimalSeed>;
pub type ProfileSeedFile = BTreeMap<String, ProfileSeed>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_animal_file() {
        let raw = r#"{
          "Aardvark": {
            "description": "Nocturnal burrowing mammal.",
            "image_path": "animal_images/aardvark.jpg"
          }
        }"#;
        let file: AnimalSeedFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file["Aardvark"].image_path, "animal_images/aardvark.jpg");
    }

    #[test]
    fn test_parse_profile_file() {
        let raw = r#"{
          "bluebird42": {
            "email": "bluebird42@example.com",
            "password": "hunter22",
            "image_path": "profile_images/42.jpg"
          }
        }"#;
        let file: ProfileSeedFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file["bluebird42"].email, "bluebird42@example.com");
    }
}
