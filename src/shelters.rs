//! Shelter and animal reference data, plus the informational texts
//! composed from it. Read-only for the dialogue core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shelter record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelter {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub working_hours: String,
    /// Security desk contacts for visitor check-in.
    pub contacts: String,
    /// URL of the directions map image, if one exists.
    pub map_url: Option<String>,
}

/// An animal available for adoption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub shelter_id: Uuid,
    pub name: String,
    pub species: String,
    pub age_years: i64,
}

/// Compose the shelter information message.
pub fn shelter_info_text(shelter: &Shelter) -> String {
    format!(
        "About the \"{}\" shelter:\n\
         Address: {}\n\
         Working hours: {}\n\
         Security contacts: {}\n\n\
         Safety rules on the premises:\n\
         - Follow the check-in procedure\n\
         - Keep noise down on the grounds\n\
         - Follow the staff's instructions",
        shelter.name, shelter.address, shelter.working_hours, shelter.contacts
    )
}

/// Compose the how-to-adopt guide, including the current animal list.
pub fn adoption_guide_text(animals: &[Animal]) -> String {
    let mut text = String::from("How to adopt an animal from the shelter:\n1. Animals currently looking for a home:\n");
    if animals.is_empty() {
        text.push_str("There are no animals at the moment.\n");
    } else {
        for animal in animals {
            text.push_str(&format!(
                "- {} ({}, {} years old)\n",
                animal.name, animal.species, animal.age_years
            ));
        }
    }
    text.push_str(
        "2. Meeting the animal:\n\
         - Meetings take place in a designated area of the shelter\n\
         - Stay calm and quiet\n\
         3. Required documents:\n\
         - Passport and proof of residence\n\
         4. Transport and settling in at home:\n\
         - Use a proper pet carrier\n\
         - Prepare a safe spot for the animal\n\
         5. Handler's advice:\n\
         - Stay calm and confident when first meeting a dog\n\
         - Give the animal time to adapt\n\
         6. Common reasons for refusal:\n\
         - Unsuitable living conditions\n\
         - Incomplete documents\n\
         - Insufficient preparation for animal care\n\
         If you still have questions, you can call a volunteer for a consultation.",
    );
    text
}
