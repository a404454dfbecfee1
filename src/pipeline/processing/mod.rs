// Pipeline processing: mapping construction, field location, and substitution

pub mod locator;
pub mod mapping;
pub mod transform;

pub use locator::FieldLocator;
pub use mapping::{MappingRow, MappingTable};
pub use transform::{ChangeReport, Replacement, Transformed, Transformer, XmlTransformer};
