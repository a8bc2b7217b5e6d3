// datacheck-core/src/application/accessor/mod.rs

pub mod live;
pub mod preview;

#[cfg(test)]
pub(crate) mod testing;

pub use live::LiveTableAccessor;
pub use preview::PreviewSampleAccessor;
