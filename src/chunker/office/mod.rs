//! ZIP-backed office document chunkers (DOCX, ODT)

mod docx;
mod odt;
mod zip_util;

pub use docx::DocxChunker;
pub use odt::OdtChunker;
