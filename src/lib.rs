// pdfstamp library
// Text watermarking for PDF documents

pub mod config;
pub mod logging;
pub mod watermark;
