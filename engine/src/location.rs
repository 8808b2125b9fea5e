use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{Display, EnumIter, IntoEnumIterator};

pub const LOCATION_SYSTEM_INSTRUCTION: &str = indoc::indoc! {"
    You are a world-class narrative designer for a high-fantasy or sci-fi open world RPG.
    Your task is to invent a unique, mysterious location that a player might stumble upon.
    Focus on atmosphere, environmental storytelling, and mystery.
    Avoid generic tropes; be specific, evocative, and weird.
"};

const RANDOM_LOCATION_PROMPT: &str = "Create a completely random, unique mysterious location.";

/// A generated place, exactly as the text model describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub name: String,
    pub short_description: String,
    pub visual_atmosphere: String,
    pub lore: String,
    pub sensory_details: SensoryDetails,
    pub hidden_secrets: Vec<String>,
    pub potential_loot: Vec<String>,
    pub danger_level: DangerLevel,
    /// Only used to drive image generation. Missing means "derive one".
    #[serde(default)]
    pub visual_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensoryDetails {
    pub sound: String,
    pub smell: String,
    pub lighting: String,
}

#[derive(
    Debug, Clone, Copy, Display, Serialize, Deserialize, Hash, PartialEq, Eq, EnumIter, PartialOrd, Ord,
)]
pub enum DangerLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl LocationData {
    /// The prompt handed to the image model.
    pub fn image_prompt(&self) -> String {
        if self.visual_prompt.is_empty() {
            format!(
                "A high quality digital painting of {}, {}",
                self.name, self.visual_atmosphere
            )
        } else {
            self.visual_prompt.clone()
        }
    }
}

pub fn user_prompt(theme: Option<&str>) -> String {
    match theme.filter(|t| !t.is_empty()) {
        Some(theme) => format!("Create a mysterious location based on the theme: \"{theme}\"."),
        None => RANDOM_LOCATION_PROMPT.into(),
    }
}

/// Output schema the text model is constrained to, in the Generative Language
/// schema dialect.
pub fn response_schema() -> Value {
    let danger_levels = DangerLevel::iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>();

    json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "The evocative name of the location."
            },
            "shortDescription": {
                "type": "STRING",
                "description": "A 2-sentence summary of what the player sees immediately."
            },
            "visualAtmosphere": {
                "type": "STRING",
                "description": "Description of the color palette, architecture, and mood."
            },
            "lore": {
                "type": "STRING",
                "description": "A paragraph explaining the history or mystery of this place."
            },
            "sensoryDetails": {
                "type": "OBJECT",
                "properties": {
                    "sound": { "type": "STRING" },
                    "smell": { "type": "STRING" },
                    "lighting": { "type": "STRING" }
                },
                "required": ["sound", "smell", "lighting"]
            },
            "hiddenSecrets": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 2-3 secrets or hidden interactions."
            },
            "potentialLoot": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 3 unique items found here."
            },
            "dangerLevel": {
                "type": "STRING",
                "enum": danger_levels
            },
            "visualPrompt": {
                "type": "STRING",
                "description": "A highly detailed, comma-separated prompt optimized for an AI image generator to visualize this location. Include camera angle, lighting style, and key elements."
            }
        },
        "required": [
            "name",
            "shortDescription",
            "visualAtmosphere",
            "lore",
            "sensoryDetails",
            "hiddenSecrets",
            "potentialLoot",
            "dangerLevel",
            "visualPrompt"
        ]
    })
}

#[cfg(test)]
pub(crate) mod test {
    use expect_test::expect;

    use super::*;

    pub(crate) fn sample_location(name: &str) -> LocationData {
        LocationData {
            name: name.into(),
            short_description: "A bell tower leans out of the tide. It still rings.".into(),
            visual_atmosphere: "teal bioluminescence".into(),
            lore: "The town drowned, the bell did not stop.".into(),
            sensory_details: SensoryDetails {
                sound: "a muffled toll".into(),
                smell: "brine and candle wax".into(),
                lighting: "cold green glow".into(),
            },
            hidden_secrets: vec!["The rope leads down, not up.".into()],
            potential_loot: vec!["Barnacled censer".into(), "Drowned hymnal".into()],
            danger_level: DangerLevel::Medium,
            visual_prompt: String::new(),
        }
    }

    #[test]
    fn image_prompt_falls_back_to_name_and_atmosphere() {
        let location = sample_location("Sunken Bell Tower");
        assert_eq!(
            location.image_prompt(),
            "A high quality digital painting of Sunken Bell Tower, teal bioluminescence"
        );
    }

    #[test]
    fn image_prompt_prefers_explicit_visual_prompt() {
        let location = LocationData {
            visual_prompt: "wide shot, drowned tower, volumetric light".into(),
            ..sample_location("Sunken Bell Tower")
        };
        assert_eq!(
            location.image_prompt(),
            "wide shot, drowned tower, volumetric light"
        );
    }

    #[test]
    fn user_prompt_uses_theme_or_random_instruction() {
        assert_eq!(
            user_prompt(Some("Fey Wilds")),
            "Create a mysterious location based on the theme: \"Fey Wilds\"."
        );
        assert_eq!(user_prompt(Some("")), RANDOM_LOCATION_PROMPT);
        assert_eq!(user_prompt(None), RANDOM_LOCATION_PROMPT);
    }

    #[test]
    fn parses_model_output() {
        let src = r#"{
            "name": "The Glass Orchard",
            "shortDescription": "Trees of blown glass. They chime.",
            "visualAtmosphere": "amber dusk, crystalline",
            "lore": "A glassblower's grief, grown wild.",
            "sensoryDetails": {"sound": "chimes", "smell": "hot sand", "lighting": "refracted"},
            "hiddenSecrets": ["One tree is hollow"],
            "potentialLoot": ["Glass apple", "Blowpipe", "Ash journal"],
            "dangerLevel": "Extreme",
            "visualPrompt": "glass trees, dusk"
        }"#;

        let location: LocationData = serde_json::from_str(src).unwrap();
        assert_eq!(location.name, "The Glass Orchard");
        assert_eq!(location.danger_level, DangerLevel::Extreme);
        assert_eq!(location.potential_loot.len(), 3);
        assert_eq!(location.image_prompt(), "glass trees, dusk");
    }

    #[test]
    fn missing_visual_prompt_defaults_to_empty() {
        let mut value = serde_json::to_value(sample_location("Sunken Bell Tower")).unwrap();
        value.as_object_mut().unwrap().remove("visualPrompt");

        let location: LocationData = serde_json::from_value(value).unwrap();
        assert!(location.visual_prompt.is_empty());
    }

    #[test]
    fn rejects_unknown_danger_level() {
        let mut value = serde_json::to_value(sample_location("Sunken Bell Tower")).unwrap();
        value["dangerLevel"] = "Apocalyptic".into();
        assert!(serde_json::from_value::<LocationData>(value).is_err());
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut value = serde_json::to_value(sample_location("Sunken Bell Tower")).unwrap();
        value.as_object_mut().unwrap().remove("lore");
        assert!(serde_json::from_value::<LocationData>(value).is_err());
    }

    #[test]
    fn schema_lists_danger_levels() {
        let schema = response_schema();
        let expect = expect![[r#"["Low","Medium","High","Extreme"]"#]];
        expect.assert_eq(&schema["properties"]["dangerLevel"]["enum"].to_string());
        assert_eq!(schema["required"].as_array().unwrap().len(), 9);
    }
}
