pub mod model;
pub mod reader;
pub mod writer;

pub use model::{Cell, DocumentTree, Paragraph, Row, Run, Table};
pub use reader::read_document;
pub use writer::write_document;
