use image::{Rgb, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{EnumIter, VariantArray};

use crate::env::{Environment, ScoreFeedback};

pub const WIDTH: u32 = 160;
pub const HEIGHT: u32 = 120;

const PADDLE_HEIGHT: f32 = 24.0;
const PADDLE_WIDTH: f32 = 4.0;
const PADDLE_MARGIN: f32 = 8.0;
const PADDLE_SPEED: f32 = 4.0;
const OPPONENT_SPEED: f32 = 2.5;
const BALL_SIZE: f32 = 4.0;
const BALL_SPEED: f32 = 3.0;

const FOREGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Inputs for the [`Pong`] environment, moving the player's paddle or holding it still
#[derive(EnumIter, VariantArray, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PongAction {
    Down,
    Up,
    Nothing,
}

impl PongAction {
    fn direction(self) -> f32 {
        match self {
            Self::Down => 1.0,
            Self::Up => -1.0,
            Self::Nothing => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

impl Ball {
    fn center(&self) -> f32 {
        self.y + BALL_SIZE / 2.0
    }

    fn overlaps(&self, paddle: f32) -> bool {
        self.y + BALL_SIZE >= paddle && self.y <= paddle + PADDLE_HEIGHT
    }

    /// Send the ball back horizontally, angled by where it struck the paddle
    fn deflect(&mut self, paddle: f32) {
        let offset = (self.center() - (paddle + PADDLE_HEIGHT / 2.0)) / (PADDLE_HEIGHT / 2.0);
        self.vx = -self.vx;
        self.vy = offset.clamp(-1.0, 1.0) * BALL_SPEED;
    }
}

/// A headless two-paddle Pong
///
/// The player controls the left paddle, the right one is scripted to chase the ball at a speed
/// slower than the ball's. Positions are the top-left corners of the objects, in pixels.
#[derive(Debug, Clone)]
pub struct Pong {
    player: f32,
    opponent: f32,
    ball: Ball,
    score: (u32, u32),
    feedback: ScoreFeedback,
    rng: StdRng,
}

impl Pong {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let middle = (HEIGHT as f32 - PADDLE_HEIGHT) / 2.0;
        let mut pong = Self {
            player: middle,
            opponent: middle,
            ball: Ball {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
            },
            score: (0, 0),
            feedback: ScoreFeedback::new(),
            rng,
        };
        pong.serve(true);
        pong
    }

    /// `(player, opponent)` points scored so far
    pub fn score(&self) -> (u32, u32) {
        self.score
    }

    /// Advance the game one tick with the player's paddle moving in `direction`
    fn advance(&mut self, direction: f32) {
        let bottom = HEIGHT as f32 - PADDLE_HEIGHT;
        self.player = (self.player + direction.clamp(-1.0, 1.0) * PADDLE_SPEED).clamp(0.0, bottom);

        let chase = self.ball.center() - (self.opponent + PADDLE_HEIGHT / 2.0);
        self.opponent =
            (self.opponent + chase.clamp(-OPPONENT_SPEED, OPPONENT_SPEED)).clamp(0.0, bottom);

        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        let floor = HEIGHT as f32 - BALL_SIZE;
        if ball.y < 0.0 {
            ball.y = -ball.y;
            ball.vy = -ball.vy;
        } else if ball.y > floor {
            ball.y = 2.0 * floor - ball.y;
            ball.vy = -ball.vy;
        }

        let player_face = PADDLE_MARGIN + PADDLE_WIDTH;
        let opponent_face = WIDTH as f32 - PADDLE_MARGIN - PADDLE_WIDTH;
        if ball.vx < 0.0
            && ball.x <= player_face
            && ball.x + BALL_SIZE >= PADDLE_MARGIN
            && ball.overlaps(self.player)
        {
            ball.x = player_face;
            ball.deflect(self.player);
        } else if ball.vx > 0.0
            && ball.x + BALL_SIZE >= opponent_face
            && ball.x <= opponent_face + PADDLE_WIDTH
            && ball.overlaps(self.opponent)
        {
            ball.x = opponent_face - BALL_SIZE;
            ball.deflect(self.opponent);
        }

        if ball.x + BALL_SIZE < 0.0 {
            self.score.1 += 1;
            self.serve(true);
        } else if ball.x > WIDTH as f32 {
            self.score.0 += 1;
            self.serve(false);
        }
    }

    /// Put the ball in the middle, heading toward the player if `toward_player`
    fn serve(&mut self, toward_player: bool) {
        self.ball = Ball {
            x: (WIDTH as f32 - BALL_SIZE) / 2.0,
            y: (HEIGHT as f32 - BALL_SIZE) / 2.0,
            vx: if toward_player { -BALL_SPEED } else { BALL_SPEED },
            vy: self.rng.gen_range(-1.5..1.5),
        };
    }

    /// Draw the paddles and ball, white on black
    pub fn render(&self) -> RgbImage {
        let mut frame = RgbImage::new(WIDTH, HEIGHT);
        let opponent_x = WIDTH as f32 - PADDLE_MARGIN - PADDLE_WIDTH;
        fill(&mut frame, PADDLE_MARGIN, self.player, PADDLE_WIDTH, PADDLE_HEIGHT);
        fill(&mut frame, opponent_x, self.opponent, PADDLE_WIDTH, PADDLE_HEIGHT);
        fill(&mut frame, self.ball.x, self.ball.y, BALL_SIZE, BALL_SIZE);
        frame
    }
}

/// Paint a rectangle, clipped to the frame
fn fill(frame: &mut RgbImage, x: f32, y: f32, w: f32, h: f32) {
    let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
    let (x0, x1) = (clip(x, frame.width()), clip(x + w, frame.width()));
    let (y0, y1) = (clip(y, frame.height()), clip(y + h, frame.height()));
    for py in y0..y1 {
        for px in x0..x1 {
            frame.put_pixel(px, py, FOREGROUND);
        }
    }
}

impl Environment for Pong {
    type Action = PongAction;

    fn frame(&mut self) -> RgbImage {
        self.render()
    }

    fn feedback(&mut self) -> (f32, bool) {
        let (player, opponent) = self.score;
        self.feedback.observe(player as f32, opponent as f32)
    }

    fn inject(&mut self, actions: &[PongAction]) {
        let direction = actions.iter().map(|a| a.direction()).sum::<f32>();
        self.advance(direction);
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn lit(frame: &RgbImage, x: u32, y: u32) -> bool {
        frame.get_pixel(x, y) == &FOREGROUND
    }

    #[test]
    fn action_set() {
        assert_eq!(
            PongAction::VARIANTS,
            [PongAction::Down, PongAction::Up, PongAction::Nothing]
        );
        assert_eq!(PongAction::iter().map(PongAction::direction).sum::<f32>(), 0.0);
    }

    #[test]
    fn renders_paddles_and_ball() {
        let pong = Pong::new(Some(0));
        let frame = pong.render();
        assert_eq!(frame.dimensions(), (WIDTH, HEIGHT));

        let middle = HEIGHT / 2;
        assert!(lit(&frame, PADDLE_MARGIN as u32 + 1, middle), "player paddle");
        assert!(lit(&frame, WIDTH - PADDLE_MARGIN as u32 - 1, middle), "opponent paddle");
        assert!(lit(&frame, WIDTH / 2, middle), "ball");
        assert!(!lit(&frame, 0, 0), "background");
    }

    #[test]
    fn paddle_moves_and_stays_on_screen() {
        let mut pong = Pong::new(Some(0));
        let start = pong.player;

        pong.inject(&[PongAction::Up]);
        assert_eq!(pong.player, start - PADDLE_SPEED);
        pong.inject(&[PongAction::Nothing]);
        assert_eq!(pong.player, start - PADDLE_SPEED);

        for _ in 0..100 {
            pong.inject(&[PongAction::Down]);
        }
        assert_eq!(pong.player, HEIGHT as f32 - PADDLE_HEIGHT, "clamped at the bottom");

        pong.inject(&[PongAction::Up, PongAction::Down]);
        assert_eq!(pong.player, HEIGHT as f32 - PADDLE_HEIGHT, "opposite keys cancel out");
    }

    #[test]
    fn missed_ball_scores_for_opponent() {
        let mut pong = Pong::new(Some(1));
        pong.player = 0.0;
        pong.ball = Ball {
            x: 2.0,
            y: HEIGHT as f32 - 10.0,
            vx: -BALL_SPEED,
            vy: 0.0,
        };

        let mut ticks = 0;
        while pong.score() == (0, 0) {
            pong.inject(&[PongAction::Nothing]);
            ticks += 1;
            assert!(ticks < 10, "ball leaves the field");
        }
        assert_eq!(pong.score(), (0, 1));
        assert_eq!(pong.feedback(), (-1.0, true));
        assert_eq!(pong.feedback(), (0.0, false));
        assert!(pong.ball.vx < 0.0, "serves toward the player who conceded");
    }

    #[test]
    fn paddle_returns_ball() {
        let mut pong = Pong::new(Some(2));
        pong.ball = Ball {
            x: PADDLE_MARGIN + PADDLE_WIDTH + 1.0,
            y: pong.player + PADDLE_HEIGHT / 2.0 - BALL_SIZE / 2.0,
            vx: -BALL_SPEED,
            vy: 0.0,
        };

        pong.inject(&[PongAction::Nothing]);
        assert!(pong.ball.vx > 0.0, "deflected");
        assert_eq!(pong.ball.vy, 0.0, "a center hit goes straight");
        assert_eq!(pong.score(), (0, 0));
    }

    #[test]
    fn opponent_chases_ball() {
        let mut pong = Pong::new(Some(3));
        pong.opponent = 0.0;
        pong.ball.y = HEIGHT as f32 - BALL_SIZE - 1.0;
        pong.ball.vy = 0.0;

        pong.inject(&[PongAction::Nothing]);
        assert_eq!(pong.opponent, OPPONENT_SPEED, "limited speed toward the ball");
    }
}
