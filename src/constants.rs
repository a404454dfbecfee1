/// Column and tag names shared by the mapping builder and the locators

// Mapping CSV columns (exact, case-sensitive)
pub const KEY_COLUMN: &str = "Postnr";
pub const VALUE_COLUMN: &str = "Id";

pub const CSV_DELIMITER: u8 = b';';

// FlatScan target element
pub const FLAT_TAG: &str = "Postnummer";

// StructuredScan container and field elements
pub const STRUCTURED_CONTAINER: &str = "Post";
pub const STRUCTURED_FIELD: &str = "PostNr";

pub const XML_EXTENSION: &str = "xml";

// Locator names (used in logs and run summaries)
pub const FLAT_LOCATOR: &str = "flat";
pub const STRUCTURED_LOCATOR: &str = "structured";
