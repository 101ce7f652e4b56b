// Library crate: the scene store, its command protocol and test fixtures.
// The `klorad-scene` binary is a thin JSON driver on top of it.

pub mod command;
pub mod fixtures;
pub mod state;

pub use state::SceneStore;
