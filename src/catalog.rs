//! Catalog model and the HTTP client for the catalog/resolution service.
//!
//! Every record coming from the service goes through one of the mapping
//! functions in `normalize` so the rest of the crate only ever sees the
//! canonical [`Track`].

mod client;
mod model;
mod normalize;

pub use client::{CatalogApi, CatalogClient, ItemDetails, MediaLinks, QualityLink, StationSeed};
pub use model::{ItemKind, RawMoreInfo, RawTrack, Track};
pub use normalize::{decode_entities, from_catalog, from_station, high_res_image, id_from_url};
