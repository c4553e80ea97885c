//! IR Lowering Passes
//!
//! Passes that rewrite high-level IR constructs into simpler ones before
//! code generation.

pub mod for_loops;

pub use for_loops::{
    ArrayLoopHeader, BoundLoopHeader, ComparingFunction, ForLoopHeader, ForLoopsConfig,
    ForLoopsLowering, HeaderInfo, HeaderInfoBuilder, HeaderProcessor, ProgressionHeaderInfoBuilder,
    ProgressionLoopHeader,
};
