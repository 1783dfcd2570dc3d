//! Uuid encoding shared by stored documents and query filters.
//!
//! `insert_one` encodes a bare `Uuid` as BSON binary while `to_bson` and
//! filter literals produce strings, so the two never compare equal. Id fields
//! carry one of these adapters and are stored as hyphenated strings;
//! [`uuid_bson`] builds the matching filter value.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Order {
//!     #[serde(rename = "_id", with = "uuid_as_string")]
//!     id: Uuid,
//!     #[serde(with = "uuid_vec_as_string")]
//!     items: Vec<Uuid>,
//! }
//!
//! collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
//! ```

use mongodb::bson::Bson;
use uuid::Uuid;

/// Filter value matching a field stored through [`uuid_as_string`]
pub fn uuid_bson(id: Uuid) -> Bson {
    Bson::String(id.hyphenated().to_string())
}

/// Array of [`uuid_bson`] values, for `$in`
pub fn uuids_bson(ids: &[Uuid]) -> Bson {
    Bson::Array(ids.iter().copied().map(uuid_bson).collect())
}

pub mod uuid_as_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&id.hyphenated())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(D::Error::custom)
    }
}

pub mod uuid_vec_as_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(ids: &[Uuid], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ids.iter().map(|id| id.hyphenated().to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Uuid>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| Uuid::parse_str(raw).map_err(D::Error::custom))
            .collect()
    }
}
