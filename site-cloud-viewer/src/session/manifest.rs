use bevy::asset::LoadState;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::state::{CalibrationScale, DiagnosticMode, SourceImages, ViewSettings};
use crate::engine::core::app_state::ViewerState;

pub const SESSION_MANIFEST_PATH: &str = "default.session.json";

/// Initial session as a JSON asset. Every field is optional.
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionManifest {
    #[serde(default)]
    pub source_images: Vec<String>,
    #[serde(default)]
    pub diagnostic_mode: DiagnosticMode,
    #[serde(default)]
    pub view_settings: ViewSettings,
    #[serde(default)]
    pub calibration_scale: CalibrationScale,
}

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<SessionManifest>>,
}

pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    manifest_loader.handle = Some(asset_server.load(SESSION_MANIFEST_PATH));
}

/// Seed session resources from the manifest once it settles. A missing or
/// malformed manifest leaves the defaults in place.
pub fn apply_session_manifest(
    manifest_loader: Res<ManifestLoader>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<SessionManifest>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    let Some(handle) = manifest_loader.handle.as_ref() else {
        return;
    };

    match asset_server.get_load_state(handle) {
        Some(LoadState::Loaded) => {
            let Some(manifest) = manifests.get(handle) else {
                return;
            };
            info!(
                "Session manifest loaded: {} source images, {} mode",
                manifest.source_images.len(),
                manifest.diagnostic_mode.to_string()
            );
            insert_session(&mut commands, manifest.clone());
            next_state.set(ViewerState::Running);
        }
        Some(LoadState::Failed(err)) => {
            warn!("Session manifest unavailable ({err}), starting with defaults");
            next_state.set(ViewerState::Running);
        }
        _ => {}
    }
}

fn insert_session(commands: &mut Commands, manifest: SessionManifest) {
    commands.insert_resource(SourceImages::new(manifest.source_images));
    commands.insert_resource(manifest.diagnostic_mode);
    commands.insert_resource(manifest.view_settings);
    commands.insert_resource(manifest.calibration_scale);
}
