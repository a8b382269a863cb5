//! Wire format of the animal adoption open-data service.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::domain::entities::{AgeGroup, BodySize, Flag, Pet, PetId, Sex, parse_photo_url};

/// One record of the adoption dataset.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct PetResponse {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub animal_id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_place: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_kind: String,
    #[serde(default, rename = "animal_Variety", deserialize_with = "null_as_empty")]
    pub animal_variety: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_sex: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_bodytype: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_colour: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_age: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_sterilization: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_bacterin: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_foundplace: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_remark: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_opendate: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_closeddate: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_update: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animal_createtime: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album_file: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shelter_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shelter_address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shelter_tel: String,
}

impl From<PetResponse> for Pet {
    fn from(r: PetResponse) -> Self {
        Self {
            id: PetId(r.animal_id),
            location: r.animal_place,
            kind: r.animal_kind,
            sex: Sex::from_code(&r.animal_sex),
            body_size: BodySize::from_code(&r.animal_bodytype),
            colour: r.animal_colour,
            age: AgeGroup::from_code(&r.animal_age),
            sterilized: Flag::from_code(&r.animal_sterilization),
            vaccinated: Flag::from_code(&r.animal_bacterin),
            found_place: r.animal_foundplace,
            status: r.animal_status,
            remark: r.animal_remark,
            open_date: r.animal_opendate,
            closed_date: r.animal_closeddate,
            updated_at: r.animal_update,
            created_at: r.animal_createtime,
            photo_url: parse_photo_url(&r.album_file),
            address: r.shelter_address,
            telephone: r.shelter_tel,
            variety: r.animal_variety,
            shelter_name: r.shelter_name,
        }
    }
}

/// Accepts `null` for text fields.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Accepts the identifier as a JSON number or a numeric string.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrIntVisitor;

    impl Visitor<'_> for StringOrIntVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(value).map_err(de::Error::custom)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value.trim().parse::<u64>().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(StringOrIntVisitor)
}
