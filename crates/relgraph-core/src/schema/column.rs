use super::Vendor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

/// Normalized vendor type name of a column.
///
/// Names are lower-cased, size and precision suffixes are removed and runs of
/// whitespace collapse to one space, so `VARCHAR(255)` becomes `varchar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataType(String);

impl DataType {
    pub fn new(_vendor: Vendor, raw: &str) -> DataType {
        let base = match raw.find('(') {
            Some(index) => &raw[..index],
            None => raw,
        };

        let normalized = base
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        DataType(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
