pub mod compositor;
pub mod dom;

pub use compositor::{Compositor, BODY_IMAGE_SLOTS};
pub use dom::{Element, Fragment, Node};
