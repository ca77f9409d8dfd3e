/// Data organization utilities for the close-approach visualizer.
///
/// Submodules:
/// - `merging` — combines the two result sets of a "Both" object-type fetch.

pub mod merging;
