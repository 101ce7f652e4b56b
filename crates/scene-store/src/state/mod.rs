pub mod engine;
pub mod live;
pub mod scene;
pub mod selection;
pub mod settings;

pub use engine::{CameraPose, EngineContext, SceneFrame};
pub use live::LiveModelHandle;
pub use scene::{
    model_display_name, model_kind_label, observation_display_name, short_id, ModelDraft,
    ObjectUpdate, ObservationPointPatch, PersistenceError, PreviewState, SceneStore, UpdateError,
};
pub use selection::Selection;
pub use settings::StoreSettings;
