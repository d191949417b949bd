pub mod api;
pub mod error;
pub mod image;
pub mod render;
pub mod session;
pub mod similarity;
pub mod view;

pub use api::{HttpSearchApi, SearchApi};
pub use error::{ClientError, Result};
pub use image::ImageFile;
pub use session::Session;
pub use similarity::{HttpSimilarityService, SimilarityService};
pub use view::{ImageSearchView, Tab};
