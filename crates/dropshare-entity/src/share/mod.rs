//! Share domain entities.

pub mod counter;
pub mod model;
pub mod policy;
pub mod view;

pub use counter::CounterUpdate;
pub use model::{FileEntry, ShareRecord};
pub use policy::PolicyState;
pub use view::{FileView, ShareSummary, ShareView};
