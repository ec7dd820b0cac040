use crate::cell::Cell;
use crate::error::AwesomeTableError;
use crate::geometry::{EdgeStyle, Rect};
use crate::label::Label;
use crate::line::LineMode;
use crate::types::{BBox, Color};
use std::collections::BTreeMap;

/// Grid of cells. Rows group cells sharing a `top`, ordered by `left`.
/// Merged-away cells keep their slot so (row, col) addressing is stable.
#[derive(Debug, Clone)]
pub struct Table {
    cells: Vec<Cell>,
    rows: Vec<Vec<usize>>,
    rect: Rect,
}

impl Table {
    pub fn new(cells: Vec<Cell>) -> Result<Self, AwesomeTableError> {
        if cells.is_empty() {
            return Err(AwesomeTableError::EmptyTable);
        }
        let mut by_top: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, cell) in cells.iter().enumerate() {
            by_top.entry(cell.rect().top()).or_default().push(idx);
        }
        let rows: Vec<Vec<usize>> = by_top
            .into_values()
            .map(|mut row| {
                row.sort_by_key(|&idx| cells[idx].rect().left());
                row
            })
            .collect();

        let mut table = Self {
            cells,
            rows,
            rect: Rect::with_style(0, 0, 0, 0, outline_style(Color::TRANSPARENT, 1)),
        };
        table.refresh_rect();
        Ok(table)
    }

    /// Spans the first row's first cell to the last row's last cell.
    fn refresh_rect(&mut self) {
        let first = self.rows.first().and_then(|row| row.first());
        let last = self.rows.last().and_then(|row| row.last());
        if let (Some(&first), Some(&last)) = (first, last) {
            let tl = self.cells[first].rect().topleft();
            let br = self.cells[last].rect().bottomright();
            self.rect.set_ltrb(BBox::new(tl.x, tl.y, br.x, br.y));
        }
    }

    pub fn with_outline(mut self, outline: Color, line_width: u32) -> Self {
        self.set_outline(outline, line_width);
        self
    }

    /// Outline drawn around the whole table. Hidden (transparent) by default.
    pub fn set_outline(&mut self, outline: Color, line_width: u32) {
        self.rect.set_style(outline_style(outline, line_width));
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> Option<Vec<&Cell>> {
        self.rows
            .get(row)
            .map(|row| row.iter().map(|&idx| &self.cells[idx]).collect())
    }

    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize, AwesomeTableError> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or(AwesomeTableError::CellOutOfRange { row, col })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index_of(row, col).ok().map(|idx| &self.cells[idx])
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        let idx = self.index_of(row, col).ok()?;
        Some(&mut self.cells[idx])
    }

    /// Cells at position `col` of each row; rows shorter than that are skipped.
    pub fn column(&self, col: usize) -> Vec<&Cell> {
        self.rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(|&idx| &self.cells[idx])
            .collect()
    }

    /// Row-major iteration, merged-away cells included.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .flat_map(move |row| row.iter().map(move |&idx| &self.cells[idx]))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Merges the cell at (row_end, col_end) into the one at
    /// (row_start, col_start) and soft-deletes it.
    pub fn merge(
        &mut self,
        row_start: usize,
        col_start: usize,
        row_end: usize,
        col_end: usize,
    ) -> Result<(), AwesomeTableError> {
        let host = self.index_of(row_start, col_start)?;
        let absorbed = self.index_of(row_end, col_end)?;
        if host == absorbed {
            return Err(AwesomeTableError::InvalidMerge(format!(
                "cell ({row_start}, {col_start}) cannot be merged with itself"
            )));
        }
        let (host_cell, absorbed_cell) = if host < absorbed {
            let (head, tail) = self.cells.split_at_mut(absorbed);
            (&mut head[host], &mut tail[0])
        } else {
            let (head, tail) = self.cells.split_at_mut(host);
            (&mut tail[0], &mut head[absorbed])
        };
        host_cell.merge(absorbed_cell);
        absorbed_cell.mark_merged_away();
        Ok(())
    }

    /// Row-major: each visible cell's label followed by its text labels.
    pub fn labels(&self) -> Vec<Label> {
        let mut labels = Vec::new();
        for cell in self.iter().filter(|cell| cell.visible()) {
            labels.push(cell.label());
            labels.extend(cell.texts().iter().map(|text| text.label()));
        }
        labels
    }

    /// True once an outline with a visible color has been set.
    pub fn has_outline(&self) -> bool {
        self.rect.style().fill.a > 0
    }
}

fn outline_style(fill: Color, width: u32) -> EdgeStyle {
    EdgeStyle {
        width,
        fill,
        mode: LineMode::Solid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellState;
    use crate::label::LabelKey;
    use crate::test_util::block_fonts;
    use crate::text::{Text, TextStyle};
    use crate::types::Point;

    fn grid() -> Table {
        // Deliberately shuffled input order.
        let cells = vec![
            Cell::new(100, 50, 100, 50),
            Cell::new(0, 0, 100, 50),
            Cell::new(0, 50, 100, 50),
            Cell::new(100, 0, 100, 50),
        ];
        Table::new(cells).unwrap()
    }

    #[test]
    fn rows_partition_by_top_and_sort_by_left() {
        let table = grid();
        assert_eq!(table.row_count(), 2);
        for r in 0..2 {
            let row = table.row(r).unwrap();
            assert_eq!(row.len(), 2);
            assert_eq!(row[0].rect().left(), 0);
            assert_eq!(row[1].rect().left(), 100);
            assert!(row.iter().all(|c| c.rect().top() == r as i32 * 50));
        }
        assert_eq!(table.rect().bbox(), BBox::new(0, 0, 200, 100));
        assert_eq!(table.column(1).len(), 2);
        let lefts: Vec<i32> = table.iter().map(|c| c.rect().left()).collect();
        assert_eq!(lefts, vec![0, 100, 0, 100]);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            Table::new(Vec::new()),
            Err(AwesomeTableError::EmptyTable)
        ));
    }

    #[test]
    fn merge_unions_host_and_hides_absorbed_cell() {
        let fonts = block_fonts();
        let style = TextStyle::default().with_font("block.ttf", 20);
        let mut table = grid();
        table
            .cell_mut(0, 0)
            .unwrap()
            .push(Text::new(Point::ORIGIN, "a", &style, &fonts).unwrap());
        for content in ["b", "c"] {
            table
                .cell_mut(1, 1)
                .unwrap()
                .push(Text::new(Point::ORIGIN, content, &style, &fonts).unwrap());
        }

        table.merge(0, 0, 1, 1).unwrap();
        let host = table.cell(0, 0).unwrap();
        assert_eq!(host.bbox(), BBox::new(0, 0, 200, 100));
        assert_eq!(host.len(), 3);
        assert_eq!(host.state(), CellState::Spanning);
        let absorbed = table.cell(1, 1).unwrap();
        assert!(!absorbed.visible());
        assert_eq!(absorbed.state(), CellState::MergedAway);
        // Addressing is unchanged after the merge.
        assert_eq!(table.row_len(1), Some(2));
    }

    #[test]
    fn merge_rejects_bad_coordinates() {
        let mut table = grid();
        assert!(matches!(
            table.merge(0, 0, 2, 0),
            Err(AwesomeTableError::CellOutOfRange { row: 2, col: 0 })
        ));
        assert!(matches!(
            table.merge(1, 1, 1, 1),
            Err(AwesomeTableError::InvalidMerge(_))
        ));
    }

    #[test]
    fn merge_with_host_after_absorbed_in_storage_order() {
        // Host (0, 1) is stored at index 3, absorbed (1, 0) at index 2.
        let mut table = grid();
        table.merge(0, 1, 1, 0).unwrap();
        assert_eq!(table.cell(0, 1).unwrap().bbox(), BBox::new(0, 0, 200, 100));
        assert!(!table.cell(1, 0).unwrap().visible());
    }

    #[test]
    fn merging_into_a_merged_away_cell_keeps_it_hidden() {
        let mut table = grid();
        table.merge(0, 0, 0, 1).unwrap();
        assert_eq!(table.labels().len(), 3);

        table.merge(0, 1, 1, 1).unwrap();
        let hidden = table.cell(0, 1).unwrap();
        assert!(!hidden.visible());
        assert_eq!(hidden.state(), CellState::MergedAway);
        assert!(!table.cell(1, 1).unwrap().visible());
        assert_eq!(table.cell(0, 0).unwrap().bbox(), BBox::new(0, 0, 200, 50));
        // Only (0, 0) and (1, 0) remain.
        assert_eq!(table.labels().len(), 2);
        assert_eq!(table.iter().filter(|cell| cell.visible()).count(), 2);
    }

    #[test]
    fn outline_is_hidden_until_set() {
        let mut table = grid();
        assert!(!table.has_outline());
        assert_eq!(table.rect().style().fill, Color::TRANSPARENT);
        table.set_outline(Color::BLACK, 2);
        assert!(table.has_outline());
        assert_eq!(table.rect().style().width, 2);
        assert!(!grid().with_outline(Color::TRANSPARENT, 1).has_outline());
    }

    #[test]
    fn labels_skip_merged_away_cells() {
        let fonts = block_fonts();
        let style = TextStyle::default().with_font("block.ttf", 20);
        let mut table = grid();
        table
            .cell_mut(0, 1)
            .unwrap()
            .push(Text::new(Point::new(100, 0), "x", &style, &fonts).unwrap());
        assert_eq!(table.labels().len(), 5);

        table.merge(0, 0, 0, 1).unwrap();
        let labels = table.labels();
        let keys: Vec<LabelKey> = labels.iter().map(|l| l.key).collect();
        assert_eq!(
            keys,
            vec![LabelKey::Cell, LabelKey::Text, LabelKey::Cell, LabelKey::Cell]
        );
        assert_eq!(labels[1].content, "x");
    }
}
