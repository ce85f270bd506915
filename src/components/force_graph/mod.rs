//! Track transition graph: model, layout simulation, viewport interaction,
//! transition geometry and the canvas component that ties them together.

mod component;
pub mod geometry;
pub mod layout;
mod render;
pub mod selection;
pub mod source;
mod state;
pub mod types;
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use layout::{LayoutEngine, LayoutParameters, PositionMap, Simulation};
pub use selection::{EdgeKey, HighlightSet, Selection};
pub use source::{GraphScope, GraphSnapshot, GraphSource, MemorySource, SourceError, load_view};
pub use types::{Edge, GraphData, GraphModel, Node, Point, TrackId, TransitionType};
pub use viewport::{Interaction, ViewportController, ViewportTransform};
