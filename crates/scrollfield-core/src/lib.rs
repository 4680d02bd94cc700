//! Scroll-synchronized particle animation core.
//!
//! A [`scroll::ScrollTracker`] turns scroll offsets into progress values, a
//! [`phase::PhaseInterpolator`] blends ordered shape states by a smoothed
//! phase, and a [`field::ParticleField`] layers idle motion and pointer
//! forces on top before writing an instance buffer for the GPU. A
//! [`scene::Scene`] owns all of it together with its [`frame::RenderLoop`].
pub mod cards;
pub mod config;
pub mod error;
pub mod field;
pub mod forces;
pub mod frame;
pub mod globe;
pub mod math;
pub mod particle;
pub mod phase;
pub mod scene;
pub mod scroll;
pub mod shapes;
pub mod transient;

pub use config::{DistanceFog, FieldConfig, TransientConfig};
pub use error::{ConfigError, TriggerParseError};
pub use field::{GpuInstance, ParticleField};
pub use scene::{Scene, SceneConfig};
