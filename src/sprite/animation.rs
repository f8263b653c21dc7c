use crate::engine::{Point, Rect, Renderer, SheetImage, Size};
use std::rc::Rc;

/// Where a run of frames sits on a sheet and how it plays back.
///
/// Frames are packed left to right from `start`. The first row begins at
/// `start.x`, every following row begins at the sheet's left edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Strip {
    pub start: Point,
    pub frame_size: Size,
    /// seconds each frame stays up
    pub frame_duration: f64,
    pub frames: u32,
    pub looping: bool,
    pub reverse: bool,
}

impl Strip {
    pub fn total_time(&self) -> f64 {
        self.frame_duration * f64::from(self.frames)
    }
}

/// A [`Strip`] being played off one sheet. Time only moves when somebody
/// calls [`Animation::advance`] (or [`Animation::draw_frame`], which does).
pub struct Animation<I> {
    sheet: Rc<I>,
    strip: Strip,
    elapsed_time: f64,
}

impl<I: SheetImage> Animation<I> {
    pub fn new(sheet: Rc<I>, strip: Strip) -> Self {
        Animation {
            sheet,
            strip,
            elapsed_time: 0.0,
        }
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn total_time(&self) -> f64 {
        self.strip.total_time()
    }

    /// Back to the first frame.
    pub fn reset(&mut self) {
        self.elapsed_time = 0.0;
    }

    /// Looping strips snap back to 0 once done, the overshoot is dropped.
    pub fn advance(&mut self, delta: f64) {
        self.elapsed_time += delta;
        if self.strip.looping && self.is_done() {
            self.elapsed_time = 0.0;
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_time >= self.total_time()
    }

    pub fn current_frame(&self) -> u32 {
        let frame = (self.elapsed_time / self.strip.frame_duration).floor() as u32;
        frame.min(self.strip.frames.saturating_sub(1))
    }

    /// Index into the strip after applying `reverse`.
    pub fn frame_index(&self) -> u32 {
        if self.strip.reverse {
            self.strip.frames - self.current_frame() - 1
        } else {
            self.current_frame()
        }
    }

    /// Source rectangle of the current frame on the sheet.
    pub fn frame_rect(&self) -> Rect {
        let sheet_width = self.sheet.width();
        let Size { width, height } = self.strip.frame_size;
        let start = self.strip.start;

        let mut index = self.frame_index() as f32;
        let mut row = 0.0;
        if (index + 1.0) * width + start.x > sheet_width {
            index -= ((sheet_width - start.x) / width).floor();
            row += 1.0;
        }
        let per_row = (sheet_width / width).floor();
        // a sheet narrower than one frame would never wrap
        while per_row >= 1.0 && (index + 1.0) * width > sheet_width {
            index -= per_row;
            row += 1.0;
        }

        let offset = if row == 0.0 { start.x } else { 0.0 };
        Rect::from_xywh(
            index * width + offset,
            row * height + start.y,
            width,
            height,
        )
    }

    /// Advance by `tick`, then blit the current frame at `position` with the
    /// frame scaled by `scale`. A finished non-looping strip draws nothing.
    pub fn draw_frame<R>(&mut self, tick: f64, renderer: &mut R, position: Point, scale: f32)
    where
        R: Renderer<Image = I>,
    {
        self.advance(tick);
        if !self.strip.looping && self.is_done() {
            return;
        }

        let frame = self.frame_rect();
        let destination = Rect::new(
            position,
            Size {
                width: frame.width() * scale,
                height: frame.height() * scale,
            },
        );
        renderer.draw_image(&self.sheet, &frame, &destination);
    }
}
