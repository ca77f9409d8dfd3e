//! Close-approach visualizer service.
//!
//! Fetches near-Earth object and comet close-approach records from JPL's
//! SSD/CNEOS CAD API, normalizes them into typed tabular records, and
//! prepares CSV exports and scatter-plot specifications for a presentation
//! layer. Data flows strictly forward: query build → fetch → normalize
//! (→ merge for "Both") → present.

pub mod analysis;
pub mod bodies;
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod viz;
