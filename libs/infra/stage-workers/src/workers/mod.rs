// [libs/infra/stage-workers/src/workers/mod.rs]
pub mod character_model;
pub mod lip_sync;
pub mod render;
pub mod script_parse;
pub mod sound_match;
pub mod storyboard;

pub use character_model::CharacterModelWorker;
pub use lip_sync::LipSyncWorker;
pub use render::RenderWorker;
pub use script_parse::ScriptParseWorker;
pub use sound_match::SoundMatchWorker;
pub use storyboard::StoryboardWorker;
