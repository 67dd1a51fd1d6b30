//! I/O modules for reading DIST-ALERT bands and writing GeoTIFF products

pub mod band_reader;
pub mod writer;

pub use band_reader::BandReader;
pub use writer::GeoTiffWriter;
