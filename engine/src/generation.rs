use color_eyre::Result;
use log::debug;

use crate::{ImgModBox, TextModBox, image_model::GeneratedImage, location::LocationData};

mod session;
pub use session::{
    CycleTicket, GENERIC_FAILURE_MESSAGE, GenerationStatus, Session, failure_message,
};

/// Drives one generation cycle: text first, then the image derived from it.
pub struct Generator {
    text: TextModBox,
    image: ImgModBox,
}

impl Clone for Generator {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            image: self.image.clone(),
        }
    }
}

impl Generator {
    pub fn new(text: TextModBox, image: ImgModBox) -> Self {
        Self { text, image }
    }

    pub async fn generate_text(&self, theme: Option<&str>) -> Result<LocationData> {
        self.text.generate_location(theme).await
    }

    pub async fn generate_image(&self, location: &LocationData) -> Result<Option<GeneratedImage>> {
        let prompt = location.image_prompt();
        debug!("Image prompt: {prompt}");
        self.image.get_image(&prompt).await
    }

    /// Both steps without a session. Any failure fails the whole cycle.
    pub async fn generate(
        &self,
        theme: Option<&str>,
    ) -> Result<(LocationData, Option<GeneratedImage>)> {
        let location = self.generate_text(theme).await?;
        let image = self.generate_image(&location).await?;
        Ok((location, image))
    }

    /// Runs a full cycle on `session`, reporting every transition to
    /// `observer`, so the location can be shown before the image arrives.
    pub async fn run(&self, session: Session, mut observer: impl FnMut(&Session)) -> Session {
        let (session, ticket) = session.submit();
        observer(&session);

        let text = self.generate_text(ticket.theme()).await;
        let session = session.text_finished(ticket.id, text);
        observer(&session);
        if session.status() != GenerationStatus::GeneratingImage {
            return session;
        }

        let Some(location) = session.location() else {
            return session;
        };
        let image = self.generate_image(location).await;
        let session = session.image_finished(ticket.id, image);
        observer(&session);
        session
    }
}

#[cfg(test)]
mod test {
    use std::{
        pin::Pin,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use color_eyre::eyre::eyre;

    use super::*;
    use crate::{image_model::ImageModel, location::test::sample_location, text_model::TextModel};

    /// Names every location after the call number; fails when `fail` is set.
    #[derive(Clone, Default)]
    struct FakeText {
        calls: Arc<AtomicUsize>,
        themes: Arc<Mutex<Vec<Option<String>>>>,
        fail: bool,
        visual_prompt: String,
    }

    impl TextModel for FakeText {
        fn generate_location<'a>(
            &'a self,
            theme: Option<&'a str>,
        ) -> Pin<Box<dyn Future<Output = Result<LocationData>> + Send + 'a>> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                self.themes.lock().unwrap().push(theme.map(String::from));
                if self.fail {
                    return Err(eyre!("connection reset by peer"));
                }
                Ok(LocationData {
                    visual_prompt: self.visual_prompt.clone(),
                    ..sample_location(&format!("Location #{n}"))
                })
            })
        }

        fn clone(&self) -> Box<dyn TextModel + Send + Sync + 'static> {
            Box::new(Clone::clone(self))
        }
    }

    /// Returns an image only on the first call.
    #[derive(Clone, Default)]
    struct FakeImage {
        prompts: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ImageModel for FakeImage {
        fn get_image<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Option<GeneratedImage>>> + Send + 'a>> {
            Box::pin(async move {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                if self.fail {
                    return Err(eyre!("image model down"));
                }
                Ok((prompts.len() == 1).then(|| GeneratedImage::new(None, "aGVsbG8=".into())))
            })
        }

        fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static> {
            Box::new(Clone::clone(self))
        }
    }

    fn generator(text: &FakeText, image: &FakeImage) -> Generator {
        Generator::new(Box::new(Clone::clone(text)), Box::new(Clone::clone(image)))
    }

    #[tokio::test]
    async fn run_reports_every_transition() {
        let (text, image) = (FakeText::default(), FakeImage::default());
        let mut seen = vec![];

        let session = generator(&text, &image)
            .run(Session::new().set_theme("Fey Wilds"), |s| {
                seen.push((s.status(), s.location().is_some(), s.image().is_some()))
            })
            .await;

        assert_eq!(
            seen,
            vec![
                (GenerationStatus::GeneratingText, false, false),
                (GenerationStatus::GeneratingImage, true, false),
                (GenerationStatus::Complete, true, true),
            ]
        );
        assert_eq!(session.location().unwrap().name, "Location #1");
        assert_eq!(*text.themes.lock().unwrap(), vec![Some("Fey Wilds".to_string())]);
    }

    #[tokio::test]
    async fn fallback_prompt_reaches_image_model() {
        let (text, image) = (FakeText::default(), FakeImage::default());
        generator(&text, &image).run(Session::new(), |_| {}).await;
        assert_eq!(
            *image.prompts.lock().unwrap(),
            vec!["A high quality digital painting of Location #1, teal bioluminescence".to_string()]
        );

        let text = FakeText {
            visual_prompt: "isometric, fog".into(),
            ..Default::default()
        };
        let image = FakeImage::default();
        generator(&text, &image).run(Session::new(), |_| {}).await;
        assert_eq!(*image.prompts.lock().unwrap(), vec!["isometric, fog".to_string()]);
    }

    #[tokio::test]
    async fn text_failure_skips_image() {
        let text = FakeText {
            fail: true,
            ..Default::default()
        };
        let image = FakeImage::default();

        let session = generator(&text, &image).run(Session::new(), |_| {}).await;
        assert_eq!(session.status(), GenerationStatus::Error);
        assert_eq!(session.error(), Some("connection reset by peer"));
        assert!(session.location().is_none());
        assert!(image.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn image_failure_keeps_location() {
        let text = FakeText::default();
        let image = FakeImage {
            fail: true,
            ..Default::default()
        };

        let session = generator(&text, &image).run(Session::new(), |_| {}).await;
        assert_eq!(session.status(), GenerationStatus::Error);
        assert_eq!(session.location().unwrap().name, "Location #1");
        assert!(session.image().is_none());
    }

    #[tokio::test]
    async fn second_run_overwrites_first() {
        let (text, image) = (FakeText::default(), FakeImage::default());
        let generator = generator(&text, &image);

        let first = generator
            .run(Session::new().set_theme("Space Station"), |_| {})
            .await;
        assert!(first.image().is_some());

        let second = generator.run(first, |_| {}).await;
        assert_eq!(second.status(), GenerationStatus::Complete);
        assert_eq!(second.cycle(), 2);
        assert_eq!(second.theme(), "Space Station");
        assert_eq!(second.location().unwrap().name, "Location #2");
        assert!(second.image().is_none());
    }

    #[tokio::test]
    async fn generate_returns_both_results() {
        let (text, image) = (FakeText::default(), FakeImage::default());
        let (location, img) = generator(&text, &image).generate(None).await.unwrap();
        assert_eq!(location.name, "Location #1");
        assert!(img.is_some());

        let failing = FakeImage {
            fail: true,
            ..Default::default()
        };
        let err = generator(&text, &failing).generate(None).await.unwrap_err();
        assert_eq!(err.to_string(), "image model down");
    }
}
