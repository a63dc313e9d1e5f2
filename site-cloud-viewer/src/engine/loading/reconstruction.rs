use bevy::asset::LoadState;
use bevy::prelude::*;

use super::point_cloud_creator::{
    SourceState, rasterize_sources, spawn_reconstruction, synthesize_tiles,
};
use crate::engine::scene::registry::SceneRegistry;
use crate::engine::shaders::ScanPointMaterial;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::session::state::{DiagnosticMode, SourceImages, ViewSettings};

/// Source image of a job, bound to its tile slot.
#[derive(Debug, Clone)]
pub struct JobSource {
    pub slot: usize,
    pub uri: String,
    pub handle: Handle<Image>,
}

/// Rebuild request with its inputs captured at request time.
#[derive(Debug, Clone)]
pub struct ReconstructionJob {
    pub generation: u64,
    pub sources: Vec<JobSource>,
    pub mode: DiagnosticMode,
    pub settings: ViewSettings,
}

#[derive(Resource, Debug, Default)]
pub struct ReconstructionJobs {
    next_generation: u64,
    applied_generation: u64,
    pending: Vec<ReconstructionJob>,
    /// Handles of the applied job, kept so mode or settings rebuilds reuse
    /// the decoded images.
    retained: Vec<Handle<Image>>,
}

impl ReconstructionJobs {
    pub fn submit(
        &mut self,
        sources: Vec<JobSource>,
        mode: DiagnosticMode,
        settings: ViewSettings,
    ) -> u64 {
        self.next_generation += 1;
        self.pending.push(ReconstructionJob {
            generation: self.next_generation,
            sources,
            mode,
            settings,
        });
        self.next_generation
    }

    /// Remove every job `is_ready` accepts and return the newest one if it is
    /// newer than what is on screen. Older completions are dropped.
    pub fn take_latest_ready(
        &mut self,
        mut is_ready: impl FnMut(&ReconstructionJob) -> bool,
    ) -> Option<ReconstructionJob> {
        let (ready, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|job| is_ready(job));
        self.pending = waiting;

        let newest = ready.into_iter().max_by_key(|job| job.generation)?;
        if newest.generation <= self.applied_generation {
            debug!(
                "Dropping stale reconstruction {} (showing {})",
                newest.generation, self.applied_generation
            );
            return None;
        }
        self.applied_generation = newest.generation;
        Some(newest)
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Capture current inputs as a new job. Scheduled on change of images,
/// diagnostic mode or view settings.
pub fn request_reconstruction(
    images: Res<SourceImages>,
    mode: Res<DiagnosticMode>,
    settings: Res<ViewSettings>,
    asset_server: Res<AssetServer>,
    mut jobs: ResMut<ReconstructionJobs>,
) {
    let sources = images
        .placed()
        .iter()
        .enumerate()
        .map(|(slot, uri)| JobSource {
            slot,
            uri: uri.clone(),
            handle: asset_server.load(uri.as_str()),
        })
        .collect();
    let generation = jobs.submit(sources, *mode, *settings);
    debug!("Reconstruction {generation} requested");
}

fn is_terminal(asset_server: &AssetServer, handle: &Handle<Image>) -> bool {
    matches!(
        asset_server.get_load_state(handle),
        Some(LoadState::Loaded) | Some(LoadState::Failed(_))
    )
}

/// Apply the newest job whose images have all either loaded or failed.
pub fn poll_reconstruction_jobs(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    mut jobs: ResMut<ReconstructionJobs>,
    mut registry: ResMut<SceneRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ScanPointMaterial>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if jobs.pending_count() == 0 {
        return;
    }
    let applied = swap_in_latest_ready(
        &mut jobs,
        |job| {
            job.sources
                .iter()
                .all(|source| is_terminal(&asset_server, &source.handle))
        },
        &images,
        &mut SceneAssets {
            commands: &mut commands,
            registry: &mut registry,
            meshes: &mut meshes,
            materials: &mut materials,
        },
    );

    if let Some((generation, tile_count)) = applied {
        rpc_interface.send_notification(
            "reconstruction_ready",
            serde_json::json!({ "generation": generation, "tiles": tile_count }),
        );
    }
}

/// Everything a group swap writes to.
pub struct SceneAssets<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub registry: &'a mut SceneRegistry,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<ScanPointMaterial>,
}

/// Take the newest ready job and replace the on-screen group with its
/// tiles. The previous root is despawned first; a job without surviving
/// tiles leaves the scene empty. Returns the applied generation and its
/// tile count.
pub fn swap_in_latest_ready(
    jobs: &mut ReconstructionJobs,
    is_ready: impl FnMut(&ReconstructionJob) -> bool,
    images: &Assets<Image>,
    scene: &mut SceneAssets,
) -> Option<(u64, usize)> {
    let job = jobs.take_latest_ready(is_ready)?;

    let rasters = rasterize_sources(job.sources.iter().map(|source| {
        let state = match images.get(&source.handle) {
            Some(image) => SourceState::Loaded(image),
            None => SourceState::Failed,
        };
        (source.slot, source.uri.as_str(), state)
    }));
    let tiles = synthesize_tiles(&rasters, job.mode);
    let tile_count = tiles.len();

    if let Some(previous) = scene.registry.take_reconstruction() {
        if let Ok(mut entity_commands) = scene.commands.get_entity(previous) {
            entity_commands.despawn();
        }
    }
    if !tiles.is_empty() {
        let root = spawn_reconstruction(
            scene.commands,
            scene.meshes,
            scene.materials,
            tiles,
            &job.settings,
            job.generation,
        );
        scene.registry.replace_reconstruction(root);
    }
    jobs.retained = job.sources.into_iter().map(|source| source.handle).collect();

    info!(
        "Reconstruction {} ready: {} of {} tiles",
        job.generation,
        tile_count,
        jobs.retained.len()
    );
    Some((job.generation, tile_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::point_cloud::ScanTile;
    use bevy::asset::RenderAssetUsages;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

    fn submit_empty(jobs: &mut ReconstructionJobs) -> u64 {
        jobs.submit(Vec::new(), DiagnosticMode::Rgb, ViewSettings::default())
    }

    #[test]
    fn generations_increase_per_request() {
        let mut jobs = ReconstructionJobs::default();
        assert_eq!(submit_empty(&mut jobs), 1);
        assert_eq!(submit_empty(&mut jobs), 2);
        assert_eq!(jobs.pending_count(), 2);
    }

    #[test]
    fn late_completion_of_older_job_is_discarded() {
        let mut jobs = ReconstructionJobs::default();
        let older = submit_empty(&mut jobs);
        let newer = submit_empty(&mut jobs);

        // Newer job finishes first.
        let applied = jobs.take_latest_ready(|job| job.generation == newer).unwrap();
        assert_eq!(applied.generation, newer);

        assert!(jobs.take_latest_ready(|job| job.generation == older).is_none());
        assert_eq!(jobs.applied_generation(), newer);
        assert_eq!(jobs.pending_count(), 0);
    }

    #[test]
    fn unfinished_jobs_stay_pending() {
        let mut jobs = ReconstructionJobs::default();
        submit_empty(&mut jobs);
        assert!(jobs.take_latest_ready(|_| false).is_none());
        assert_eq!(jobs.pending_count(), 1);
        assert_eq!(jobs.applied_generation(), 0);
    }

    #[test]
    fn only_newest_of_simultaneous_completions_applies() {
        let mut jobs = ReconstructionJobs::default();
        submit_empty(&mut jobs);
        submit_empty(&mut jobs);
        let newest = submit_empty(&mut jobs);

        let applied = jobs.take_latest_ready(|_| true).unwrap();
        assert_eq!(applied.generation, newest);
        assert_eq!(jobs.pending_count(), 0);
    }

    fn scene_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<ScanPointMaterial>>()
            .init_resource::<Assets<Image>>()
            .init_resource::<SceneRegistry>()
            .init_resource::<ReconstructionJobs>();
        app
    }

    fn loaded_source(app: &mut App, slot: usize) -> JobSource {
        let image = Image::new_fill(
            Extent3d {
                width: 8,
                height: 8,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[120, 80, 40, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::MAIN_WORLD,
        );
        JobSource {
            slot,
            uri: format!("tile_{slot}.png"),
            handle: app.world_mut().resource_mut::<Assets<Image>>().add(image),
        }
    }

    fn submit(app: &mut App, sources: Vec<JobSource>) -> u64 {
        app.world_mut().resource_mut::<ReconstructionJobs>().submit(
            sources,
            DiagnosticMode::Rgb,
            ViewSettings::default(),
        )
    }

    /// Run one swap where only `ready` counts as finished.
    fn swap(app: &mut App, ready: u64) -> Option<(u64, usize)> {
        let applied = app
            .world_mut()
            .run_system_once(
                move |mut commands: Commands,
                      images: Res<Assets<Image>>,
                      mut jobs: ResMut<ReconstructionJobs>,
                      mut registry: ResMut<SceneRegistry>,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<ScanPointMaterial>>| {
                    swap_in_latest_ready(
                        &mut jobs,
                        |job| job.generation == ready,
                        &images,
                        &mut SceneAssets {
                            commands: &mut commands,
                            registry: &mut registry,
                            meshes: &mut meshes,
                            materials: &mut materials,
                        },
                    )
                },
            )
            .unwrap();
        app.world_mut().flush();
        applied
    }

    fn tile_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&ScanTile>().iter(world).count()
    }

    fn reconstruction(app: &App) -> Option<Entity> {
        app.world().resource::<SceneRegistry>().reconstruction()
    }

    #[test]
    fn newer_generation_replaces_previous_group() {
        let mut app = scene_app();
        let sources = vec![loaded_source(&mut app, 0), loaded_source(&mut app, 1)];
        let first = submit(&mut app, sources);
        assert_eq!(swap(&mut app, first), Some((first, 2)));
        let first_root = reconstruction(&app).unwrap();
        assert_eq!(tile_count(&mut app), 2);

        let sources = vec![loaded_source(&mut app, 0)];
        let second = submit(&mut app, sources);
        assert_eq!(swap(&mut app, second), Some((second, 1)));

        let second_root = reconstruction(&app).unwrap();
        assert_ne!(first_root, second_root);
        assert!(app.world().get_entity(first_root).is_err());
        assert_eq!(tile_count(&mut app), 1);
    }

    #[test]
    fn empty_image_list_tears_group_down() {
        let mut app = scene_app();
        let sources = vec![loaded_source(&mut app, 0)];
        let first = submit(&mut app, sources);
        swap(&mut app, first);
        let root = reconstruction(&app).unwrap();

        let cleared = submit(&mut app, Vec::new());
        assert_eq!(swap(&mut app, cleared), Some((cleared, 0)));

        assert_eq!(reconstruction(&app), None);
        assert!(app.world().get_entity(root).is_err());
        assert_eq!(tile_count(&mut app), 0);
    }

    #[test]
    fn failed_sources_without_tiles_leave_scene_empty() {
        let mut app = scene_app();
        let failed = JobSource {
            slot: 0,
            uri: "missing.png".into(),
            handle: Handle::default(),
        };
        let generation = submit(&mut app, vec![failed]);
        assert_eq!(swap(&mut app, generation), Some((generation, 0)));
        assert_eq!(reconstruction(&app), None);
    }

    #[test]
    fn stale_completion_leaves_current_group_alone() {
        let mut app = scene_app();
        let sources = vec![loaded_source(&mut app, 0), loaded_source(&mut app, 1)];
        let older = submit(&mut app, sources);
        let sources = vec![loaded_source(&mut app, 2)];
        let newer = submit(&mut app, sources);

        assert_eq!(swap(&mut app, newer), Some((newer, 1)));
        let current = reconstruction(&app).unwrap();

        assert_eq!(swap(&mut app, older), None);
        assert_eq!(reconstruction(&app), Some(current));
        assert!(app.world().get_entity(current).is_ok());
        assert_eq!(tile_count(&mut app), 1);
        assert_eq!(
            app.world().resource::<ReconstructionJobs>().applied_generation(),
            newer
        );
    }
}
