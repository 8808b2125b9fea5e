use std::pin::Pin;

use color_eyre::Result;

use crate::location::LocationData;

pub trait TextModel {
    /// Asks the model for one location. `None` or an empty theme asks for a
    /// random one.
    fn generate_location<'a>(
        &'a self,
        theme: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<LocationData>> + Send + 'a>>;

    fn clone(&self) -> Box<dyn TextModel + Send + Sync + 'static>;
}
