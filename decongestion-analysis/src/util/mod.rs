pub mod fs;
pub mod geojson_ops;
pub mod table_ops;
