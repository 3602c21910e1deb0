pub mod view;

pub use view::{DueBucket, SortHint, ViewSelector};
