//! Section loading: the bridge between page renders and the content store

mod adapter;
mod section;
pub mod wrappers;

pub use adapter::{FetchError, FetchState, SectionLoad, Shape};
pub use section::SectionView;
