pub mod dedup;
pub mod transformer;

pub use dedup::DedupFilter;
pub use transformer::Transformer;
