//! Portfolio projects: the data model, aggregate statistics, the derived
//! filter/sort catalogue and the project controller.

pub mod catalogue;
pub mod controller;
pub mod project;
pub mod stats;
pub mod url;

pub use catalogue::{build_catalogue, category_id, category_of, CATEGORY_PREFIX};
pub use controller::{ProjectController, ProjectControllerBuilder};
pub use project::Project;
pub use stats::{LanguageStat, PortfolioStats};
pub use url::{CategoryUrlCodec, CATEGORY_PARAM};
