/// Tap handling for the café shell.
///
/// Rendering records which terminal row maps to which action key; the mouse
/// handler converts a DOM pixel position back into a row and looks the key
/// up. Everything here is pure so it can be unit tested without a browser.

/// One tappable terminal row.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub row: u16,
    pub key: char,
}

/// Shared between the draw callback and the mouse handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_target(&mut self, row: u16, key: char) {
        self.targets.push(ClickTarget { row, key });
    }

    /// Map every row of a `height`-row block starting at `top` to `key`.
    pub fn add_span(&mut self, top: u16, height: u16, key: char) {
        for row in top..top.saturating_add(height) {
            self.add_target(row, key);
        }
    }

    /// First registered key for `row`.
    pub fn find_target_key(&self, row: u16) -> Option<char> {
        self.targets.iter().find(|t| t.row == row).map(|t| t.key)
    }
}

/// Convert a pixel Y offset (relative to the grid's top edge) into a row.
/// `None` when the tap is outside the grid or the grid has no size yet.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }

    let row = (click_y / (grid_height / terminal_rows as f64)) as u16;
    (row < terminal_rows).then_some(row)
}

/// Phones get the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}
