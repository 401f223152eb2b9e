use eframe::egui;

/// Pointer distance (screen px) within which a handle is grabbed.
pub const HANDLE_TOLERANCE: f32 = 10.0;

/// One of the eight draggable points on the crop frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

/// Which side of an axis a handle drags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Left or top edge.
    Start,
    /// Right or bottom edge.
    End,
    /// The handle does not drive this axis.
    Neither,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    pub fn horizontal(self) -> Side {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => Side::Start,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight => Side::End,
            ResizeHandle::Top | ResizeHandle::Bottom => Side::Neither,
        }
    }

    pub fn vertical(self) -> Side {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => Side::Start,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight => {
                Side::End
            }
            ResizeHandle::Left | ResizeHandle::Right => Side::Neither,
        }
    }

    pub fn is_corner(self) -> bool {
        self.horizontal() != Side::Neither && self.vertical() != Side::Neither
    }

    /// Compass name, e.g. `"nw"`.
    pub fn compass(self) -> &'static str {
        match self {
            ResizeHandle::TopLeft => "nw",
            ResizeHandle::Top => "n",
            ResizeHandle::TopRight => "ne",
            ResizeHandle::Right => "e",
            ResizeHandle::BottomRight => "se",
            ResizeHandle::Bottom => "s",
            ResizeHandle::BottomLeft => "sw",
            ResizeHandle::Left => "w",
        }
    }

    /// Screen position of this handle on `rect`.
    pub fn position(self, rect: egui::Rect) -> egui::Pos2 {
        match self {
            ResizeHandle::TopLeft => rect.min,
            ResizeHandle::Top => rect.center_top(),
            ResizeHandle::TopRight => rect.right_top(),
            ResizeHandle::Right => rect.right_center(),
            ResizeHandle::BottomRight => rect.max,
            ResizeHandle::Bottom => rect.center_bottom(),
            ResizeHandle::BottomLeft => rect.left_bottom(),
            ResizeHandle::Left => rect.left_center(),
        }
    }

    /// `rect` with the edges this handle owns shifted by `delta`.
    pub fn drag_edges(self, rect: egui::Rect, delta: egui::Vec2) -> egui::Rect {
        let mut out = rect;
        match self.horizontal() {
            Side::Start => out.min.x += delta.x,
            Side::End => out.max.x += delta.x,
            Side::Neither => {}
        }
        match self.vertical() {
            Side::Start => out.min.y += delta.y,
            Side::End => out.max.y += delta.y,
            Side::Neither => {}
        }
        out
    }

    pub fn cursor(self) -> egui::CursorIcon {
        match self {
            ResizeHandle::TopLeft => egui::CursorIcon::ResizeNorthWest,
            ResizeHandle::Top => egui::CursorIcon::ResizeNorth,
            ResizeHandle::TopRight => egui::CursorIcon::ResizeNorthEast,
            ResizeHandle::Right => egui::CursorIcon::ResizeEast,
            ResizeHandle::BottomRight => egui::CursorIcon::ResizeSouthEast,
            ResizeHandle::Bottom => egui::CursorIcon::ResizeSouth,
            ResizeHandle::BottomLeft => egui::CursorIcon::ResizeSouthWest,
            ResizeHandle::Left => egui::CursorIcon::ResizeWest,
        }
    }
}

/// What a pointer-down grabs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Drag the image under a fixed crop frame.
    Pan,
    /// Drag the crop frame over a fixed image.
    MoveCrop,
    Resize(ResizeHandle),
}

impl DragMode {
    pub fn cursor(self, active: bool) -> egui::CursorIcon {
        match self {
            DragMode::Pan if active => egui::CursorIcon::Grabbing,
            DragMode::Pan => egui::CursorIcon::Grab,
            DragMode::MoveCrop if active => egui::CursorIcon::Grabbing,
            DragMode::MoveCrop => egui::CursorIcon::Move,
            DragMode::Resize(handle) => handle.cursor(),
        }
    }
}

/// Classifies a pointer-down on the viewport.
///
/// Corners beat edges, edges beat the crop interior, and everything else pans.
pub fn hit_test(pos: egui::Pos2, crop: egui::Rect, tolerance: f32) -> DragMode {
    let min = crop.min;
    let max = crop.max;

    for handle in ResizeHandle::ALL.into_iter().filter(|h| h.is_corner()) {
        if pos.distance(handle.position(crop)) < tolerance {
            return DragMode::Resize(handle);
        }
    }

    let within_y = pos.y > min.y && pos.y < max.y;
    let within_x = pos.x > min.x && pos.x < max.x;

    if (pos.x - min.x).abs() < tolerance && within_y {
        return DragMode::Resize(ResizeHandle::Left);
    }
    if (pos.x - max.x).abs() < tolerance && within_y {
        return DragMode::Resize(ResizeHandle::Right);
    }
    if (pos.y - min.y).abs() < tolerance && within_x {
        return DragMode::Resize(ResizeHandle::Top);
    }
    if (pos.y - max.y).abs() < tolerance && within_x {
        return DragMode::Resize(ResizeHandle::Bottom);
    }

    if crop.contains(pos) {
        return DragMode::MoveCrop;
    }

    DragMode::Pan
}
