/// One decoded spreadsheet row: header -> cell value, in column order.
///
/// Empty cells are never stored, so "missing column" and "empty cell"
/// read the same through [`SheetRow::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: Vec<(String, String)>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. Empty values are dropped; re-inserting a header replaces it.
    ///
    /// Decoders give duplicate sheet headers distinct keys before inserting.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        self.cells.retain(|(h, _)| *h != header);
        if !value.is_empty() {
            self.cells.push((header, value));
        }
    }

    /// Non-empty value under `header`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value among `headers`, in the given order.
    pub fn first_of<S: AsRef<str>>(&self, headers: &[S]) -> Option<&str> {
        headers.iter().find_map(|h| self.get(h.as_ref()))
    }

    /// Value of the leftmost non-empty cell.
    pub fn first_value(&self) -> Option<&str> {
        self.cells.first().map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for SheetRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = SheetRow::new();
        for (h, v) in iter {
            row.insert(h, v);
        }
        row
    }
}
