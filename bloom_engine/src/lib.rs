//! # bloom_engine
//!
//! The animation core of the bloom scene: a four-phase state machine driven
//! by discrete hand gestures, and a per-frame engine that interpolates every
//! entity between two precomputed layouts — a cone-and-spiral *tree* and a
//! torus-and-ring *nebula*.
//!
//! ## Phase machine
//!
//! | Phase | Entry | Progress target | Auto-exit |
//! |---|---|---|---|
//! | `Tree` | initial / collapse completes | 0 | none |
//! | `Blooming` | `OpenPalm` while `Tree` | 1 | progress > 0.99 → `Nebula` |
//! | `Nebula` | bloom completes | 1 | none |
//! | `Collapsing` | `ClosedFist` while `Nebula` | 0 | progress < 0.01 → `Tree` |
//!
//! Gestures outside their entry row are ignored, which debounces a flickering
//! classifier mid-transition. Progress is a single scalar advanced by an
//! exponential approach filter, so a phase change mid-flight simply redirects
//! it from wherever it sits.
//!
//! All pose pairs are generated once in [`Scene::new`]; [`Scene::tick`]
//! mutates only scalars and preallocated output buffers.

pub mod scene;
pub mod state;

pub use scene::{Scene, SceneConfig};
pub use state::{transition, Gesture, Phase, SceneStore};
