pub mod dismissal;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod marker;
pub mod pagination;
pub mod positioning;
pub mod presentation;
pub mod view;

pub use dismissal::{Document, MarkerId, OpenScope, SharedDocument};
pub use event::{Direction, HitRegion, InputEvent, InputModality, Key, Surface};
pub use geometry::{Point, Rect, Size, Viewport};
pub use gesture::{GestureAction, GestureRecognizer, GestureTrackingState, SheetFeedback, Transition};
pub use marker::{AffordanceSizes, AffordanceView, InteractionState, MarkerController, MarkerUpdate};
pub use pagination::{NavPolicy, Pager};
pub use positioning::Placement;
pub use presentation::{Affordance, Mode};
pub use view::MessageView;
