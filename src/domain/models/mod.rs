mod analysis;
mod analysis_outcome;
mod analysis_request;
mod conversation;
mod prompt_template;

pub use analysis::*;
pub use analysis_outcome::*;
pub use analysis_request::*;
pub use conversation::*;
pub use prompt_template::*;
