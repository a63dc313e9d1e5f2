// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

// Crate engine modules
use crate::engine::{
    camera::viewport_camera::{
        OrbitCamera, camera_controller, handle_viewport_resize, spawn_viewport_camera,
    },
    core::{app_state::ViewerState, window_config::create_window_config},
    loading::reconstruction::{
        ReconstructionJobs, poll_reconstruction_jobs, request_reconstruction,
    },
    scene::{
        grid::create_ground_grid,
        registry::SceneRegistry,
        section_plane::{spawn_section_plane, update_section_plane},
    },
    shaders::ScanPointMaterial,
    systems::fps_tracking::fps_notification_system,
};

// Crate tools modules
use crate::tools::{
    interaction::{PointerInteraction, pointer_input_system},
    measure::{billboard_labels, rebuild_measurement_render},
    tool_manager::{
        ClearToolEvent, ToolManager, ToolSelectionEvent, handle_clear_tool_events,
        handle_tool_keyboard_shortcuts, handle_tool_selection_events,
    },
};

// Session and Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::session::{
    SessionPlugin, SessionSet,
    state::{CalibrationScale, DiagnosticMode, MeasurementList, SourceImages, ViewSettings},
};

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::{
    fps_tracking::fps_text_update_system,
    hud::{spawn_hud, update_hud_text},
};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<ViewerState>()
        .add_plugins(MaterialPlugin::<ScanPointMaterial>::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(WebRpcPlugin)
        .add_plugins(SessionPlugin);

    // Initialise resources early
    app.init_resource::<ToolManager>()
        .init_resource::<PointerInteraction>()
        .init_resource::<SceneRegistry>()
        .init_resource::<ReconstructionJobs>()
        .init_resource::<OrbitCamera>()
        .add_event::<ToolSelectionEvent>()
        .add_event::<ClearToolEvent>();

    app.add_systems(
        Startup,
        (spawn_viewport_camera, create_ground_grid, spawn_section_plane),
    );

    // Tool state settles before pointer input, and viewer callbacks reach
    // the session reducers in the same frame.
    app.add_systems(
        Update,
        (
            handle_tool_keyboard_shortcuts, // Native shortcuts or no-op for WASM
            handle_tool_selection_events,
            handle_clear_tool_events,
            pointer_input_system,
            camera_controller,
        )
            .chain()
            .before(SessionSet)
            .run_if(in_state(ViewerState::Running)),
    );

    app.add_systems(
        Update,
        (
            request_reconstruction.run_if(
                resource_changed::<SourceImages>
                    .or(resource_changed::<DiagnosticMode>)
                    .or(resource_changed::<ViewSettings>),
            ),
            poll_reconstruction_jobs,
        )
            .chain()
            .after(SessionSet)
            .run_if(in_state(ViewerState::Running)),
    );

    app.add_systems(
        Update,
        (
            update_section_plane.run_if(resource_changed::<ViewSettings>),
            rebuild_measurement_render.run_if(
                resource_changed::<MeasurementList>.or(resource_changed::<CalibrationScale>),
            ),
            billboard_labels,
            handle_viewport_resize,
            fps_notification_system,
        )
            .after(SessionSet)
            .run_if(in_state(ViewerState::Running)),
    );

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, spawn_hud).add_systems(
            Update,
            (fps_text_update_system, update_hud_text).run_if(in_state(ViewerState::Running)),
        );
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
