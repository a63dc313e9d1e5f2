//! Reconstruction loading pipeline.
//!
//! ```text
//! SourceImages | DiagnosticMode | ViewSettings changed
//!   └─> request_reconstruction()      capture inputs, bump generation
//!       └─> AssetServer loads images  (async)
//!           └─> poll_reconstruction_jobs()
//!               ├─> wait until every image is Loaded or Failed
//!               ├─> drop the job if a newer one is already shown
//!               ├─> rasterise, synthesise, skip failures
//!               └─> swap the reconstruction group via SceneRegistry
//! ```

/// Tile synthesis and reconstruction group spawning.
pub mod point_cloud_creator;

/// Generation-gated rebuild jobs and the systems driving them.
pub mod reconstruction;
