//! Person record and its canonical encoding
//!
//! A [`Person`] is encoded as a JSON object whose fields appear in alphabetical
//! order: Address, City, Id, Name, Status, Surname, TelephoneNumber. The order is
//! fixed by the declaration order below (serde_json writes struct fields in
//! declaration order), so two encoders always produce byte-identical output.
//! Do not reorder the fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PopulationError, PopulationResult};

/// A person record. `id` is the unique key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Unique key
    pub id: String,
    /// Given name
    pub name: String,
    /// Free-form status (e.g. "active")
    pub status: String,
    /// Family name
    pub surname: String,
    /// Telephone number
    pub telephone_number: String,
}

impl Person {
    /// Wire names of the fields, in encoding order.
    pub const FIELD_NAMES: [&'static str; 7] = [
        "Address",
        "City",
        "Id",
        "Name",
        "Status",
        "Surname",
        "TelephoneNumber",
    ];

    /// Build a record from the seven fields given in [`Person::FIELD_NAMES`] order.
    ///
    /// This is the positional argument order of the `AddPerson` and
    /// `ChangePersonData` transactions.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> PopulationResult<Person> {
        if fields.len() != Self::FIELD_NAMES.len() {
            return Err(PopulationError::invalid_input(format!(
                "expected {} fields ({}), got {}",
                Self::FIELD_NAMES.len(),
                Self::FIELD_NAMES.join(", "),
                fields.len()
            )));
        }

        let f = |i: usize| fields[i].as_ref().to_string();
        Ok(Person {
            address: f(0),
            city: f(1),
            id: f(2),
            name: f(3),
            status: f(4),
            surname: f(5),
            telephone_number: f(6),
        })
    }

    /// Field values in [`Person::FIELD_NAMES`] order.
    pub fn fields(&self) -> [&str; 7] {
        [
            self.address.as_str(),
            self.city.as_str(),
            self.id.as_str(),
            self.name.as_str(),
            self.status.as_str(),
            self.surname.as_str(),
            self.telephone_number.as_str(),
        ]
    }

    /// Encode to the canonical JSON bytes stored in world state.
    pub fn to_bytes(&self) -> PopulationResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| PopulationError::invalid_input(format!("cannot encode person: {}", e)))
    }

    /// Decode from stored bytes.
    ///
    /// Returns `Decode` if the bytes are not a complete person object.
    pub fn from_bytes(bytes: &[u8]) -> PopulationResult<Person> {
        serde_json::from_slice(bytes)
            .map_err(|e| PopulationError::decode(format!("cannot decode person: {}", e)))
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        f.write_str("{")?;
        for (name, value) in Self::FIELD_NAMES.iter().zip(self.fields()) {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}:{}", name, value)?;
        }
        f.write_str("}")
    }
}
