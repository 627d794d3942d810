//! Screen layout and hit-testing
//!
//! Buttons are described declaratively: every frame the list of buttons
//! is recomputed from the current [`View`], and a click is resolved by
//! looking up which button's region contains the pointer. The state
//! machine never sees coordinates, only the resulting [`Control`].

use itertools::Itertools;
use serde::Serialize;

use crate::{
    constants::display::{SCREEN_HEIGHT, SCREEN_WIDTH},
    game::{Control, GameView, Highlight, View},
    question::{AnswerSlot, Operation},
};

/// A position on screen in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    /// Distance from the left edge
    pub x: i32,
    /// Distance from the top edge
    pub y: i32,
}

impl Point {
    /// Creates a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside; the right and bottom edges are outside
    pub fn contains(&self, point: Point) -> bool {
        (self.x..self.x + self.width).contains(&point.x)
            && (self.y..self.y + self.height).contains(&point.y)
    }

    /// The middle of the rectangle
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// How a button should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonState {
    /// Plain
    Idle,
    /// Under the pointer
    Hovered,
    /// The chosen option of a group
    Selected,
    /// Shown but not clickable
    Disabled,
    /// Answer card holding the true result during feedback
    Correct,
    /// Answer card picked wrongly during feedback
    Incorrect,
}

/// A button as it should be drawn and hit-tested this frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    /// What activating the button does
    pub control: Control,
    /// Where the button is
    pub rect: Rect,
    /// Text on the button
    pub label: String,
    /// Drawing state
    pub state: ButtonState,
}

/// Fixed regions of the menu screen
pub mod menu {
    use super::Rect;
    use crate::question::Operation;

    /// Operator buttons in a 2×2 grid
    pub fn operation(operation: Operation) -> Rect {
        match operation {
            Operation::Addition => Rect::new(225, 200, 150, 50),
            Operation::Subtraction => Rect::new(425, 200, 150, 50),
            Operation::Multiplication => Rect::new(225, 280, 150, 50),
            Operation::Division => Rect::new(425, 280, 150, 50),
        }
    }

    /// Start button below the operators
    pub const START: Rect = Rect::new(320, 360, 150, 50);
}

/// Fixed regions of the in-game screen
pub mod game {
    use super::{Rect, SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::question::AnswerSlot;

    /// Header bar with operation, score, progress and timer
    pub const HEADER: Rect = Rect::new(20, 10, SCREEN_WIDTH - 40, 80);
    /// Card holding the question text
    pub const QUESTION_CARD: Rect = Rect::new(20, 100, SCREEN_WIDTH - 40, 100);

    const CARD_WIDTH: i32 = 300;
    const CARD_HEIGHT: i32 = 80;
    const CARD_GAP: i32 = 20;
    const ANSWER_TOP: i32 = 220;

    /// Card drawn behind each answer button
    pub fn answer_card(slot: AnswerSlot) -> Rect {
        let x = match slot {
            AnswerSlot::A | AnswerSlot::C => 75,
            AnswerSlot::B | AnswerSlot::D => 425,
        };
        let y = match slot {
            AnswerSlot::A | AnswerSlot::B => ANSWER_TOP,
            AnswerSlot::C | AnswerSlot::D => ANSWER_TOP + CARD_HEIGHT + CARD_GAP,
        };
        Rect::new(x, y, CARD_WIDTH, CARD_HEIGHT)
    }

    /// Clickable answer button inset in its card
    pub fn answer(slot: AnswerSlot) -> Rect {
        let card = answer_card(slot);
        Rect::new(card.x + 10, card.y + 10, card.width - 20, card.height - 20)
    }

    /// Button opening the exit confirmation
    pub const MAIN_MENU: Rect = Rect::new(550, 420, 200, 50);

    /// Confirmation dialog box
    pub const DIALOG: Rect = Rect::new(
        (SCREEN_WIDTH - 420) / 2,
        (SCREEN_HEIGHT - 180) / 5,
        420,
        180,
    );
    /// Dialog button leaving the session
    pub const CONFIRM_YES: Rect = Rect::new(DIALOG.x + 50, DIALOG.y + 100, 150, 50);
    /// Dialog button staying in the session
    pub const CONFIRM_NO: Rect = Rect::new(DIALOG.x + DIALOG.width - 200, DIALOG.y + 100, 150, 50);
}

/// Fixed regions of the end screen
pub mod end {
    use super::Rect;

    /// Button returning to the menu
    pub const PLAY_AGAIN: Rect = Rect::new(300, 350, 200, 60);
}

/// Label of an operator button
fn operation_label(operation: Operation) -> String {
    operation.glyph().to_string()
}

fn idle_or_hovered(rect: Rect, pointer: Option<Point>) -> ButtonState {
    if pointer.is_some_and(|p| rect.contains(p)) {
        ButtonState::Hovered
    } else {
        ButtonState::Idle
    }
}

fn menu_buttons(
    selected: Option<Operation>,
    can_start: bool,
    pointer: Option<Point>,
) -> Vec<Button> {
    Operation::ALL
        .into_iter()
        .map(|operation| {
            let rect = menu::operation(operation);
            Button {
                control: Control::Operation(operation),
                rect,
                label: operation_label(operation),
                state: if selected == Some(operation) {
                    ButtonState::Selected
                } else {
                    idle_or_hovered(rect, pointer)
                },
            }
        })
        .chain(std::iter::once(Button {
            control: Control::Start,
            rect: menu::START,
            label: "Start".to_owned(),
            state: if can_start {
                idle_or_hovered(menu::START, pointer)
            } else {
                ButtonState::Disabled
            },
        }))
        .collect_vec()
}

fn game_buttons(view: &GameView, pointer: Option<Point>) -> Vec<Button> {
    if view.confirm_open {
        return vec![
            Button {
                control: Control::ConfirmYes,
                rect: game::CONFIRM_YES,
                label: "Yes".to_owned(),
                state: idle_or_hovered(game::CONFIRM_YES, pointer),
            },
            Button {
                control: Control::ConfirmNo,
                rect: game::CONFIRM_NO,
                label: "No".to_owned(),
                state: idle_or_hovered(game::CONFIRM_NO, pointer),
            },
        ];
    }

    AnswerSlot::ALL
        .into_iter()
        .map(|slot| {
            let rect = game::answer(slot);
            let candidate = view.candidates[slot];
            Button {
                control: Control::Answer(slot),
                rect,
                label: format!("{slot}: {}", candidate.value),
                state: match candidate.highlight {
                    Highlight::Correct => ButtonState::Correct,
                    Highlight::Incorrect => ButtonState::Incorrect,
                    Highlight::Neutral if view.feedback => ButtonState::Idle,
                    Highlight::Neutral => idle_or_hovered(rect, pointer),
                },
            }
        })
        .chain(std::iter::once(Button {
            control: Control::MainMenu,
            rect: game::MAIN_MENU,
            label: "Main Menu".to_owned(),
            state: idle_or_hovered(game::MAIN_MENU, pointer),
        }))
        .collect_vec()
}

/// Buttons on screen for `view`
///
/// While the exit confirmation is open only its two buttons are listed,
/// so nothing behind the dialog can be hit.
///
/// # Arguments
///
/// * `view` - The render description of the current frame
/// * `pointer` - Pointer position, used for hover states
pub fn buttons(view: &View, pointer: Option<Point>) -> Vec<Button> {
    match view {
        View::Menu {
            selected,
            can_start,
        } => menu_buttons(*selected, *can_start, pointer),
        View::Game(game_view) => game_buttons(game_view, pointer),
        View::End { .. } => vec![Button {
            control: Control::PlayAgain,
            rect: end::PLAY_AGAIN,
            label: "Play Again".to_owned(),
            state: idle_or_hovered(end::PLAY_AGAIN, pointer),
        }],
    }
}

/// The control under `point`, skipping disabled buttons
pub fn hit_test(buttons: &[Button], point: Point) -> Option<Control> {
    buttons
        .iter()
        .filter(|button| button.state != ButtonState::Disabled)
        .find(|button| button.rect.contains(point))
        .map(|button| button.control)
}
