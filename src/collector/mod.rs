use futures::future::BoxFuture;
use thiserror::Error;

use crate::parsers;
use crate::sink::{Desc, Sink};
use crate::targets;

pub mod ilm;
pub mod projector;

pub use ilm::IlmCollector;

/// A source of metrics that is scraped on every pull.
///
/// Failures stay inside the collector and are reported through its own
/// series. `collect` never fails.
pub trait Collector {
    /// Series this collector always emits, whatever the remote state.
    fn describe(&self) -> Vec<Desc>;

    /// Series that only appear when the remote state has something to report.
    fn describe_series(&self) -> Vec<Desc> {
        Vec::new()
    }

    fn collect<'a>(&'a self, sink: &'a mut (dyn Sink + Send)) -> BoxFuture<'a, ()>;
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Target(#[from] targets::TargetError),
    #[error(transparent)]
    Parse(#[from] parsers::ParseError),
}
