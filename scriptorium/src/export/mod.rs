//! Document exporters. Each renders the markup document to a downloadable
//! byte stream; all three share the block/run parse in [`crate::markup`].

pub mod docx;
pub mod pdf;
pub mod text;
