// Spreadsheet decoding (xlsx, xls, xlsb, ods via calamine; csv/tsv via csv)
//
// Produces header-keyed rows from the first worksheet. One-way: nothing is
// ever written back.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use evalgrid_core::SheetRow;

/// Extensions decoded through calamine.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Decode a spreadsheet file into header-keyed rows.
pub fn read_rows(path: &Path) -> Result<Vec<SheetRow>, String> {
    match extension_of(path).as_deref() {
        Some("csv") => read_delimited_rows(path, b','),
        Some("tsv") => read_delimited_rows(path, b'\t'),
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => read_workbook_rows(path),
        Some(ext) => Err(format!("unsupported file type: .{ext}")),
        None => Err(format!("{}: file has no extension", path.display())),
    }
}

/// Lowercased extension, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn read_workbook_rows(path: &Path) -> Result<Vec<SheetRow>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet: {}", e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| "Spreadsheet contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    log::debug!("read {} grid rows from sheet '{}'", grid.len(), first);
    Ok(rows_from_grid(grid))
}

fn read_delimited_rows(path: &Path, delimiter: u8) -> Result<Vec<SheetRow>, String> {
    let content = read_file_as_utf8(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        grid.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(rows_from_grid(grid))
}

/// Read file and convert to UTF-8 if needed.
///
/// Japanese Excel saves CSV as Shift_JIS, so that is tried first; bytes that
/// are not valid Shift_JIS either are read as Windows-1252.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            if let Some(decoded) =
                encoding_rs::SHIFT_JIS.decode_without_bom_handling_and_without_replacement(&bytes)
            {
                log::debug!("{}: decoded as Shift_JIS", path.display());
                return Ok(decoded.into_owned());
            }
            log::debug!("{}: decoded as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Turn a raw cell grid into header-keyed rows.
///
/// The first row with any content is the header row. Blank data rows are
/// dropped; cells under a blank header are keyed `__EMPTY_<col>`. A header
/// seen before gets a `_<n>` suffix (`氏名`, `氏名_1`, ...) so no column
/// shadows another.
pub fn rows_from_grid(grid: Vec<Vec<String>>) -> Vec<SheetRow> {
    let mut lines = grid.into_iter().skip_while(|r| r.iter().all(|c| c.is_empty()));

    let headers = match lines.next() {
        Some(h) => unique_headers(h),
        None => return Vec::new(),
    };

    lines
        .filter_map(|cells| {
            let row: SheetRow = headers
                .iter()
                .zip(cells)
                .map(|(h, v)| (h.clone(), v))
                .collect();
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());
    for (i, h) in raw.into_iter().enumerate() {
        let base = if h.is_empty() { format!("__EMPTY_{i}") } else { h };
        let mut key = base.clone();
        let mut n = 1;
        while seen.contains(&key) {
            key = format!("{base}_{n}");
            n += 1;
        }
        seen.insert(key.clone());
        headers.push(key);
    }
    headers
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

/// Integral floats render without a fractional part ("3", not "3.0").
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_row_keys_cells() {
        let rows = rows_from_grid(grid(&[
            &["メール", "名前", "氏名"],
            &["a@co.com", "Aoki", "Suzuky"],
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("名前"), Some("Aoki"));
        assert_eq!(rows[0].get("氏名"), Some("Suzuky"));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let rows = rows_from_grid(grid(&[
            &["", ""],
            &["a", "b"],
            &["", ""],
            &["1", ""],
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[0].get("b"), None);
    }

    #[test]
    fn blank_headers_get_placeholder_keys() {
        let rows = rows_from_grid(grid(&[&["", "name"], &["x", "y"]]));
        assert_eq!(rows[0].get("__EMPTY_0"), Some("x"));
        assert_eq!(rows[0].first_value(), Some("x"));
    }

    #[test]
    fn repeated_headers_keep_every_column() {
        let rows = rows_from_grid(grid(&[
            &["氏名", "具体的な行動内容", "氏名", "具体的な行動内容", "氏名_1"],
            &["Suzuki", "good", "", "also good", "x"],
        ]));
        assert_eq!(rows[0].get("氏名"), Some("Suzuki"));
        assert_eq!(rows[0].get("具体的な行動内容"), Some("good"));
        assert_eq!(rows[0].get("氏名_1"), None);
        assert_eq!(rows[0].get("具体的な行動内容_1"), Some("also good"));
        assert_eq!(rows[0].get("氏名_1_1"), Some("x"));
    }

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn csv_with_bom_and_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "\u{feff}メール,名前,実施週：週を選択してください\na@co.com,Aoki\n").unwrap();
        drop(f);

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("メール"), Some("a@co.com"));
        assert_eq!(rows[0].get("実施週：週を選択してください"), None);
    }

    #[test]
    fn windows_1252_csv_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        // "name\nJos\xe9\n" in Windows-1252
        std::fs::write(&path, b"name\nJos\xe9\n").unwrap();
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0].get("name"), Some("José"));
    }

    #[test]
    fn shift_jis_csv_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.csv");
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode("メール,名前\na@co.com,青木\n");
        assert!(!had_errors);
        std::fs::write(&path, &bytes).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("メール"), Some("a@co.com"));
        assert_eq!(rows[0].get("名前"), Some("青木"));
    }

    #[test]
    fn xlsx_first_sheet_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("participants.xlsx");

        let mut wb = rust_xlsxwriter::Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "正式氏名").unwrap();
        ws.write_string(0, 1, "社員番号").unwrap();
        ws.write_string(1, 0, "Suzuki").unwrap();
        ws.write_number(1, 1, 1042.0).unwrap();
        wb.save(&path).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("正式氏名"), Some("Suzuki"));
        assert_eq!(rows[0].get("社員番号"), Some("1042"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = read_rows(Path::new("notes.txt")).unwrap_err();
        assert!(err.contains("unsupported file type"));
    }
}
