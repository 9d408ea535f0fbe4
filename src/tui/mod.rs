pub mod content;
pub mod filter_popover;
pub mod footer;
pub mod header;
pub mod help_overlay;
pub mod render;
pub mod runs_list;
pub mod spinner;
pub mod timeline;

use ratatui::layout::Rect;

/// Below this width the list drops secondary columns and hints shorten.
pub const NARROW_WIDTH_THRESHOLD: u16 = 80;

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
