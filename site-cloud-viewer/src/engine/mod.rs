pub mod camera;
pub mod core;
pub mod error;
pub mod loading;
pub mod mesh;
pub mod point_cloud;
pub mod scene;
pub mod shaders;
pub mod systems;
