use std::{
    io::{Write, stdout},
    path::{Path, PathBuf},
};

use color_eyre::Result;
use engine::generation::{GenerationStatus, Generator, Session};
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};

use crate::{
    cli::Preset,
    export_image,
    present::{ImageView, render_card},
    save_result_image,
};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Quit,
    Help,
    /// Back to an empty search.
    New,
    /// Run the last theme again after an error.
    Retry,
    Save(PathBuf),
    /// A command used the wrong way; nothing is generated.
    Usage(&'static str),
    Explore(String),
}

pub fn parse_input(line: &str, status: GenerationStatus) -> Input {
    let line = line.trim();
    match line {
        "quit" | "exit" | "q" => return Input::Quit,
        "help" | "?" => return Input::Help,
        "new" => return Input::New,
        "retry" if status == GenerationStatus::Error => return Input::Retry,
        "retry" => return Input::Usage("`retry` only works after an error."),
        "save" => return Input::Usage("Usage: save <path>"),
        _ => {}
    }

    if let Some(path) = line.strip_prefix("save ").map(str::trim)
        && !path.is_empty()
    {
        return Input::Save(path.into());
    }

    if let Some(preset) = line.parse().ok().and_then(Preset::from_number) {
        return Input::Explore(preset.to_string());
    }

    Input::Explore(line.to_string())
}

pub async fn run(generator: Generator, image_dir: Option<PathBuf>) -> Result<()> {
    let mut lines = BufReader::new(stdin()).lines();
    let mut session = Session::new();
    let mut saved_image = None;

    print_welcome();
    loop {
        print!("{}> ", prompt_prefix(&session));
        stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line, session.status()) {
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Usage(hint) => println!("{hint}"),
            Input::New => {
                session = session.reset();
                saved_image = None;
                print_welcome();
            }
            Input::Retry => {
                session = session.retry();
                (session, saved_image) =
                    discover(&generator, session, image_dir.as_deref()).await;
            }
            Input::Save(path) => match session.image() {
                Some(image) => match export_image(image, &path) {
                    Ok(()) => {
                        println!("Saved {}", path.display());
                        saved_image = Some(path);
                    }
                    Err(e) => println!("Couldn't save the image: {e}"),
                },
                None => println!("There is no image to save."),
            },
            Input::Explore(theme) => {
                session = session.set_theme(theme);
                (session, saved_image) =
                    discover(&generator, session, image_dir.as_deref()).await;
            }
        }
    }

    if let Some(path) = saved_image {
        println!("Last image: {}", path.display());
    }
    Ok(())
}

/// Runs one cycle, printing the card as soon as the text is there.
async fn discover(
    generator: &Generator,
    session: Session,
    image_dir: Option<&Path>,
) -> (Session, Option<PathBuf>) {
    let session = generator
        .run(session, |s| {
            if s.status() == GenerationStatus::GeneratingImage
                && let Some(location) = s.location()
            {
                println!("\n{}", render_card(location, ImageView::Pending));
            }
            if let Some(label) = s.status().progress_label() {
                println!("{label}");
            }
        })
        .await;

    let saved = save_result_image(&session, None, image_dir);

    match session.status() {
        GenerationStatus::Complete => match (session.image(), &saved) {
            (Some(_), Some(path)) => println!("Image: {}", path.display()),
            (Some(_), None) => println!("Image ready, `save <path>` to keep it."),
            (None, _) => println!("Visual Manifestation Unavailable"),
        },
        GenerationStatus::Error => {
            println!("{}", session.error().unwrap_or_default());
            println!("Type `retry` to try again, `new` to start over, or enter a new theme.");
        }
        _ => {}
    }

    (session, saved)
}

fn prompt_prefix(session: &Session) -> &'static str {
    match session.status() {
        GenerationStatus::Complete => "\n(new | save <path> | quit | theme)",
        GenerationStatus::Error => "\n(retry | new | quit | theme)",
        _ => "",
    }
}

fn print_welcome() {
    println!(
        "{}",
        indoc::indoc! {"

            MYSTIC CARTOGRAPHER - Infinite World Generator

            Where will you go?
            Enter a theme, keyword, or leave blank for serendipity.
            The Cartographer awaits your command.
        "}
    );
    for (i, preset) in Preset::iter().enumerate() {
        println!("  {}. {preset}", i + 1);
    }
}

fn print_help() {
    println!(
        "{}",
        indoc::indoc! {"
            <theme>        discover a location, empty for a random one
            1-4            use a preset theme
            new            start a new search
            retry          after an error, try the same theme again
            save <path>    write the current image to <path>
            quit           leave
        "}
    );
}
