//! CSV tables for embedded `.csv` files

/// A table loaded from CSV data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// First CSV row
    pub header: Vec<String>,

    /// Remaining rows; rows may differ in length
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV data, taking the first row as the header
    ///
    /// # Parameters
    /// * `data` - Raw CSV bytes, as read from the embedded file
    ///
    /// # Returns
    /// * `Ok(Table)` - Successfully parsed table (empty input gives an empty table)
    /// * `Err(csv::Error)` - Error parsing the CSV data
    pub fn parse(data: &[u8]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        // Read the headers as the first row
        let header: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        // Read the data rows
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(Self { header, rows })
    }
}
