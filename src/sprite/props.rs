//! Everything on screen that isn't the player.
use crate::engine::{Point, Rect, Renderer, SheetImage, Size};
use crate::game::{Entity, Frame};
use crate::sprite::animation::{Animation, Strip};
use std::rc::Rc;

pub const ENEMY_SHEET_PATH: &str = "images/smb3_enemies_sheet.png";
pub const QUESTION_BOX_SHEET_PATH: &str = "images/animateQuestionBox.png";

const ENEMY_CROP: Rect = Rect {
    position: Point { x: 179.0, y: 150.0 },
    size: Size {
        width: 75.0,
        height: 75.0,
    },
};

const QUESTION_BOX_SPIN: Strip = Strip {
    start: Point { x: 0.0, y: 0.0 },
    frame_size: Size {
        width: 18.0,
        height: 17.0,
    },
    frame_duration: 0.22,
    frames: 4,
    looping: true,
    reverse: false,
};

/// Stands still and draws one fixed crop. No AI yet.
pub struct Enemy<I> {
    sheet: Rc<I>,
    position: Point,
}

impl<I: SheetImage> Enemy<I> {
    pub fn new(sheet: Rc<I>, position: Point) -> Self {
        Enemy { sheet, position }
    }
}

impl<R: Renderer> Entity<R> for Enemy<R::Image> {
    fn draw(&mut self, renderer: &mut R, _frame: &Frame) {
        renderer.draw_image(
            &self.sheet,
            &ENEMY_CROP,
            &Rect::new(self.position, ENEMY_CROP.size),
        );
    }

    fn position(&self) -> Point {
        self.position
    }
}

/// A spinning "?" block.
pub struct QuestionBox<I> {
    spin: Animation<I>,
    position: Point,
}

impl<I: SheetImage> QuestionBox<I> {
    pub fn new(sheet: Rc<I>, position: Point) -> Self {
        QuestionBox {
            spin: Animation::new(sheet, QUESTION_BOX_SPIN),
            position,
        }
    }
}

impl<R: Renderer> Entity<R> for QuestionBox<R::Image> {
    fn draw(&mut self, renderer: &mut R, frame: &Frame) {
        self.spin
            .draw_frame(frame.tick, renderer, self.position, 1.0);
    }

    fn position(&self) -> Point {
        self.position
    }
}

/// Where map and tile data will live. Does nothing for now.
#[derive(Debug, Default)]
pub struct Board;

impl<R: Renderer> Entity<R> for Board {
    fn position(&self) -> Point {
        Point::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::InputState;
    use crate::engine::testing::{FakeSheet, RecordingRenderer};

    fn sheet() -> Rc<FakeSheet> {
        Rc::new(FakeSheet {
            width: 72.0,
            height: 17.0,
        })
    }

    fn draw_with_tick(entity: &mut dyn Entity<RecordingRenderer>, tick: f64) -> RecordingRenderer {
        let input = InputState::default();
        let frame = Frame {
            tick,
            input: &input,
            surface: Size::default(),
        };
        let mut renderer = RecordingRenderer::default();
        entity.update(&frame);
        entity.draw(&mut renderer, &frame);
        renderer
    }

    #[test]
    fn enemy_draws_the_same_crop_every_frame() {
        let mut enemy = Enemy::new(sheet(), Point { x: 100.0, y: 40.0 });
        for tick in [0.016, 0.1] {
            let draws = draw_with_tick(&mut enemy, tick).draws();
            assert_eq!(
                draws,
                vec![(
                    Rect::from_xywh(179.0, 150.0, 75.0, 75.0),
                    Rect::from_xywh(100.0, 40.0, 75.0, 75.0)
                )]
            );
        }
    }

    #[test]
    fn question_box_cycles_and_loops() {
        let mut question_box = QuestionBox::new(sheet(), Point { x: 0.0, y: 100.0 });
        let frames: Vec<f32> = [0.1, 0.22, 0.22, 0.22, 0.22]
            .iter()
            .map(|tick| draw_with_tick(&mut question_box, *tick).draws()[0].0.x())
            .collect();
        // 0.1, 0.32, 0.54, 0.76, then 0.98 >= 0.88 wraps to the first frame
        assert_eq!(frames, vec![0.0, 18.0, 36.0, 54.0, 0.0]);
    }

    #[test]
    fn question_box_draws_at_its_position_unscaled() {
        let mut question_box = QuestionBox::new(sheet(), Point { x: 0.0, y: 100.0 });
        let draws = draw_with_tick(&mut question_box, 0.0).draws();
        assert_eq!(draws[0].1, Rect::from_xywh(0.0, 100.0, 18.0, 17.0));
    }

    #[test]
    fn board_does_nothing() {
        let mut board = Board;
        assert!(draw_with_tick(&mut board, 0.1).calls.is_empty());
        assert_eq!(Entity::<RecordingRenderer>::position(&board), Point::default());
    }
}
