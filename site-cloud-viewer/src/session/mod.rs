//! Host-side session state.
//!
//! The viewer never mutates these resources directly during interaction.
//! It emits [`host::MeasurementAdded`] and [`host::MeasurementUpdated`] and
//! the host systems here fold them into [`state::MeasurementList`]. Image
//! URIs, view settings, diagnostic mode and calibration are written by RPC,
//! keyboard shortcuts or the startup manifest.
//!
//! ## Startup
//!
//! ```text
//! Startup: start_loading (default.session.json)
//!   └─> ViewerState::LoadingSession
//!       └─> apply_session_manifest (Loaded | Failed)
//!           └─> ViewerState::Running
//! ```

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::core::app_state::ViewerState;

/// Session events and the systems applying them.
pub mod host;

/// Startup JSON manifest seeding the session.
pub mod manifest;

/// Session resources: images, mode, view settings, calibration, measurements.
pub mod state;

use host::{
    CalibrationRequest, ClearMeasurementsEvent, MeasurementAdded, MeasurementUpdated,
    ResetSessionEvent, apply_measurement_events, handle_calibration_requests,
    handle_clear_measurements, handle_reset_session,
};
use manifest::{ManifestLoader, SessionManifest, apply_session_manifest, start_loading};
use state::{CalibrationScale, DiagnosticMode, MeasurementList, SourceImages, ViewSettings};

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<SessionManifest>::new(&["session.json"]))
            .init_resource::<ManifestLoader>()
            .init_resource::<SourceImages>()
            .init_resource::<DiagnosticMode>()
            .init_resource::<ViewSettings>()
            .init_resource::<CalibrationScale>()
            .init_resource::<MeasurementList>()
            .add_event::<MeasurementAdded>()
            .add_event::<MeasurementUpdated>()
            .add_event::<ClearMeasurementsEvent>()
            .add_event::<ResetSessionEvent>()
            .add_event::<CalibrationRequest>()
            .add_systems(Startup, start_loading)
            .add_systems(
                Update,
                apply_session_manifest.run_if(in_state(ViewerState::LoadingSession)),
            )
            .add_systems(
                Update,
                (
                    apply_measurement_events,
                    handle_clear_measurements,
                    handle_reset_session,
                    handle_calibration_requests,
                )
                    .chain()
                    .in_set(SessionSet)
                    .run_if(in_state(ViewerState::Running)),
            );
    }
}

/// Host reducers. Renderers that read session state run after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSet;
