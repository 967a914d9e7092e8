//! A small harness: bowling-score specs run through the contexts driver.
//!
//! ```text
//! cargo run --example bowling -- -v --no-random
//! cargo run --example bowling -- --failures-only
//! ```

use contexts::{fail, spec};

#[derive(Debug, Default)]
struct Game {
    rolls: Vec<u32>,
}

impl Game {
    fn roll(&mut self, pins: u32) -> Result<(), String> {
        if pins > 10 {
            return Err(format!("cannot knock down {pins} pins"));
        }
        self.rolls.push(pins);
        Ok(())
    }

    fn score(&self) -> u32 {
        let mut score = 0;
        let mut frame_start = 0;
        for _ in 0..10 {
            let Some(&first) = self.rolls.get(frame_start) else {
                break;
            };
            let next = |offset: usize| self.rolls.get(frame_start + offset).copied().unwrap_or(0);
            if first == 10 {
                score += 10 + next(1) + next(2);
                frame_start += 1;
            } else if first + next(1) == 10 {
                score += 10 + next(2);
                frame_start += 2;
            } else {
                score += first + next(1);
                frame_start += 2;
            }
        }
        score
    }
}

#[derive(Default)]
struct WhenRollingAGutterGame {
    game: Game,
}

#[spec]
impl WhenRollingAGutterGame {
    fn because_every_ball_misses(&mut self) -> Result<(), String> {
        for _ in 0..20 {
            self.game.roll(0)?;
        }
        Ok(())
    }

    fn it_should_score_zero(&self) {
        assert_eq!(self.game.score(), 0);
    }
}

#[derive(Default)]
struct WhenRollingAPerfectGame {
    game: Game,
}

#[spec]
impl WhenRollingAPerfectGame {
    fn because_every_ball_is_a_strike(&mut self) -> Result<(), String> {
        for _ in 0..12 {
            self.game.roll(10)?;
        }
        Ok(())
    }

    fn it_should_score_three_hundred(&self) {
        assert_eq!(self.game.score(), 300);
    }

    fn it_should_take_twelve_rolls(&self) {
        if self.game.rolls.len() != 12 {
            fail!("expected 12 rolls, found {}", self.game.rolls.len());
        }
    }
}

#[derive(Default)]
struct WhenAFrameIsOpen {
    game: Game,
}

#[spec]
impl WhenAFrameIsOpen {
    fn examples() -> Vec<(u32, u32)> {
        vec![(0, 0), (3, 4), (9, 0), (1, 8)]
    }

    fn because_two_balls_are_rolled(&mut self, frame: &(u32, u32)) -> Result<(), String> {
        self.game.roll(frame.0)?;
        self.game.roll(frame.1)
    }

    fn it_should_score_the_pins_knocked_down(&self, frame: &(u32, u32)) {
        assert_eq!(self.game.score(), frame.0 + frame.1);
    }
}

#[derive(Default)]
struct WhenTooManyPinsFall {
    game: Game,
    outcome: Option<Result<(), String>>,
}

#[spec]
impl WhenTooManyPinsFall {
    fn because_eleven_pins_are_claimed(&mut self) {
        self.outcome = Some(self.game.roll(11));
    }

    fn it_should_refuse_the_roll(&self) {
        assert!(matches!(self.outcome, Some(Err(_))));
    }

    fn it_should_not_record_anything(&self) {
        assert!(self.game.rolls.is_empty());
    }
}

fn main() {
    contexts::cli::main(vec![contexts::suite![
        WhenRollingAGutterGame,
        WhenRollingAPerfectGame,
        WhenAFrameIsOpen,
        WhenTooManyPinsFall,
    ]]);
}
