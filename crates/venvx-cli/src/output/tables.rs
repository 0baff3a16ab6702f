use crate::style::Style;

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header. Trailing padding is trimmed from every line.
pub(super) fn format_table(style: &Style, headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();
    let rule_cells: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(style.table_header(&join_row(&header_cells, &widths)));
    lines.push(join_row(&rule_cells, &widths));
    for row in rows {
        lines.push(join_row(row, &widths));
    }
    lines
}

fn join_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, &width)| {
            let cell = cells.get(idx).map_or("", String::as_str);
            format!("{cell:<width$}")
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let style = Style::new(true, false);
        let rows = vec![
            vec!["requests".to_string(), "2.31.0".to_string()],
            vec!["six".to_string(), "1.16.0".to_string()],
        ];
        let lines = format_table(&style, &["Package", "Version"], &rows);
        assert_eq!(lines[0], "Package   Version");
        assert_eq!(lines[1], "--------  -------");
        assert_eq!(lines[2], "requests  2.31.0");
        assert_eq!(lines[3], "six       1.16.0");
    }

    #[test]
    fn empty_trailing_cells_do_not_leave_padding() {
        let style = Style::new(true, false);
        let rows = vec![vec!["attrs".to_string(), String::new()]];
        let lines = format_table(&style, &["Package", "Notes"], &rows);
        assert_eq!(lines[2], "attrs");
    }
}
