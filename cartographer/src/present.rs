use std::{fmt::Write as _, path::Path};

use engine::{
    generation::{GenerationStatus, Session},
    location::LocationData,
};

pub enum ImageView<'a> {
    Pending,
    Unavailable,
    Saved(&'a Path),
    Unsaved,
}

impl<'a> ImageView<'a> {
    pub fn for_session(session: &Session, saved: Option<&'a Path>) -> Self {
        match (session.status(), session.image(), saved) {
            (GenerationStatus::GeneratingImage, ..) => Self::Pending,
            (_, Some(_), Some(path)) => Self::Saved(path),
            (_, Some(_), None) => Self::Unsaved,
            (_, None, _) => Self::Unavailable,
        }
    }
}

pub fn render_card(location: &LocationData, image: ImageView) -> String {
    let mut out = String::new();
    let rule = "=".repeat(location.name.chars().count().max(20));

    // writing to a String can't fail
    _ = writeln!(out, "LOCATION DISCOVERED");
    _ = writeln!(out, "{rule}\n{}\n{rule}", location.name);
    _ = writeln!(out, "{}\n", location.short_description);

    let image_line = match image {
        ImageView::Pending => "[Manifesting Visuals...]".to_string(),
        ImageView::Unavailable => "[Visual Manifestation Unavailable]".to_string(),
        ImageView::Saved(path) => format!("[Image: {}]", path.display()),
        ImageView::Unsaved => "[Image ready, `save <path>` to keep it]".to_string(),
    };
    _ = writeln!(out, "{image_line}");

    _ = writeln!(out, "\nDanger Level: {}", location.danger_level);

    let senses = &location.sensory_details;
    _ = writeln!(out, "\nSensory Details");
    _ = writeln!(out, "  Sound:    {}", senses.sound);
    _ = writeln!(out, "  Smell:    {}", senses.smell);
    _ = writeln!(out, "  Lighting: {}", senses.lighting);

    _ = writeln!(out, "\nLore\n  {}", location.lore);

    write_list(&mut out, "Hidden Secrets", &location.hidden_secrets);
    write_list(&mut out, "Potential Loot", &location.potential_loot);
    out
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    _ = writeln!(out, "\n{title}");
    for (i, item) in items.iter().enumerate() {
        _ = writeln!(out, "  {}. {item}", i + 1);
    }
}
