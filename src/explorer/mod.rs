//! Transfer decoding and page assembly.
//!
//! Pipeline per page: [`aggregator`] walks the block window, [`decoder`] scans each
//! receipt for `Transfer` events, [`decimals`] resolves token precision and
//! [`amount`] scales raw amounts exactly.

pub mod aggregator;
pub mod amount;
pub mod context;
pub mod decimals;
pub mod decoder;
pub mod model;
pub mod pages;
pub mod signature;

pub use aggregator::{BLOCKS_IN_PAGE, BlockOutcome, BlockPage, BlockRangeAggregator, PageWindow};
pub use context::ExplorerContext;
pub use decoder::TokenTransfer;
pub use pages::Explorer;
