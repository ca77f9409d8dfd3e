/// Upstream data ingestion.
///
/// Submodules:
/// - `cad` — JPL SSD/CNEOS close-approach data API client.

pub mod cad;
