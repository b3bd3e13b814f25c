/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The world is laid out in pixels (1280×720 by default); the play field
/// scales it down to whatever the terminal offers, so one cell covers a
/// block of world pixels.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::character::{CharPhase, Character, Pose};
use crate::domain::scroll::{EntityKind, ScrollingEntity};
use crate::domain::sprite::Rect;
use crate::sim::world::{RoundPhase, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Background for everything outside the play field.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
    const SKY: Color = Color::Rgb { r: 116, g: 172, b: 228 };
    const GRASS_A: Color = Color::Rgb { r: 84, g: 170, b: 70 };
    const GRASS_B: Color = Color::Rgb { r: 70, g: 150, b: 58 };
    const DIRT: Color = Color::Rgb { r: 120, g: 84, b: 52 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Change only the glyph and foreground, keeping whatever is behind.
    fn overlay(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let cell = &mut self.cells[y as usize * self.width + x as usize];
            cell.ch = ch;
            cell.fg = fg;
        }
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Viewport: world pixels → terminal cells ──

/// Rows reserved above and below the play field.
const HUD_ROWS: usize = 2;
const HELP_ROWS: usize = 1;

#[derive(Clone, Copy, Debug)]
struct Viewport {
    col0: i32,
    row0: i32,
    cols: usize,
    rows: usize,
    /// World pixels per cell, horizontally and vertically.
    sx: f32,
    sy: f32,
}

impl Viewport {
    fn fit(term_w: usize, term_h: usize, world_w: f32, world_h: f32) -> Self {
        let cols = term_w.max(1);
        let rows = term_h.saturating_sub(HUD_ROWS + HELP_ROWS).max(1);
        Viewport {
            col0: 0,
            row0: HUD_ROWS as i32,
            cols,
            rows,
            sx: world_w / cols as f32,
            sy: world_h / rows as f32,
        }
    }

    fn col(&self, x: f32) -> i32 {
        self.col0 + (x / self.sx).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        self.row0 + (y / self.sy).floor() as i32
    }

    /// Cells covered by a rectangle, clipped to the play field. Every
    /// non-empty rectangle covers at least one cell.
    fn span(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let c0 = self.col(r.left).max(self.col0);
        let c1 = self.col(r.right() - 0.01).max(c0).min(self.col0 + self.cols as i32 - 1);
        let r0 = self.row(r.top).max(self.row0);
        let r1 = self.row(r.bottom() - 0.01).max(r0).min(self.row0 + self.rows as i32 - 1);
        (c0, r0, c1, r1)
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_round: Option<RoundPhase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_round: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // A new round (or its end) repaints from scratch.
        if self.last_round != Some(world.round) {
            self.back.cells.fill(Cell::INVALID);
            self.last_round = Some(world.round);
        }

        self.compose(world);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal's own.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &World) {
        self.front.clear();
        let view = Viewport::fit(self.front.width, self.front.height, w.screen.width, w.screen.height);

        self.compose_backdrop(w, &view);
        for e in &w.entities {
            self.compose_entity(e, &view);
        }
        for id in w.in_slot_order() {
            self.compose_character(&w.characters[id], id, &view);
        }
        self.compose_badges(w);
        if let Some(label) = &w.label {
            let text = format!(" {} ", label.text);
            let x = view.col(label.x) - text.chars().count() as i32 / 2;
            self.front.put_str(x, view.row(label.y), &text, Color::Black, Color::White);
        }
        self.compose_help(w);
    }

    fn compose_backdrop(&mut self, w: &World, view: &Viewport) {
        let ground_row = view.row(w.floor);
        for row in view.row0..view.row0 + view.rows as i32 {
            for col in 0..view.cols as i32 {
                let bg = if row < ground_row { Cell::SKY } else { Cell::DIRT };
                self.front.set(col, row, Cell::new(' ', Color::White, bg));
            }
        }

        // Grass: alternate shades per tile so the scroll is visible.
        for (i, tile) in w.ground.tiles.iter().enumerate() {
            let Some(b) = tile.bounds() else { continue };
            let (c0, _, c1, _) = view.span(&b);
            let bg = if i % 2 == 0 { Cell::GRASS_A } else { Cell::GRASS_B };
            for col in c0..=c1 {
                self.front.set(col, ground_row, Cell::new('▀', Cell::GRASS_A, bg));
            }
        }
    }

    fn compose_entity(&mut self, e: &ScrollingEntity, view: &Viewport) {
        let Some(b) = e.bounds() else { return };
        let (c0, r0, c1, r1) = view.span(&b);
        let (ch, fg) = match (e.kind, e.sprite.image.as_str()) {
            (EntityKind::Obstacle, "wall") => ('█', Color::Rgb { r: 150, g: 150, b: 160 }),
            (EntityKind::Obstacle, "crate") => ('▒', Color::Rgb { r: 176, g: 120, b: 60 }),
            (EntityKind::Obstacle, "sign") => ('╤', Color::Rgb { r: 200, g: 160, b: 90 }),
            (EntityKind::Obstacle, _) => ('╫', Color::Rgb { r: 220, g: 220, b: 220 }),
            (EntityKind::Collectible, "gem") => ('◆', Color::Rgb { r: 90, g: 220, b: 240 }),
            (EntityKind::Collectible, _) => ('●', Color::Rgb { r: 250, g: 210, b: 40 }),
            (EntityKind::Flag, _) => ('│', Color::White),
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.overlay(col, row, ch, fg);
            }
        }
        if e.kind == EntityKind::Flag {
            self.front.overlay(c0, r0, '▶', Color::Red);
        }
    }

    fn compose_character(&mut self, c: &Character, id: usize, view: &Viewport) {
        let Some(b) = c.sprite.bounds() else { return };
        let (c0, r0, c1, r1) = view.span(&b);
        let fg = skin_color(&c.skin, id);

        let body = if c.phase == CharPhase::Spinning && c.sprite.angle != 0.0 {
            spin_glyph(c.sprite.angle)
        } else {
            '█'
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.overlay(col, row, body, fg);
            }
        }
        if r1 > r0 && body == '█' {
            for col in c0..=c1 {
                self.front.overlay(col, r1, pose_glyph(c.pose), fg);
            }
        }
        // Player number on the head.
        let mid = (c0 + c1) / 2;
        self.front.set(mid, r0, Cell::new(char::from(b'1' + (id % 9) as u8), Color::Black, fg));
    }

    /// Score badges across the top, in slot order.
    fn compose_badges(&mut self, w: &World) {
        let mut x = 1;
        for id in w.in_slot_order() {
            let c = &w.characters[id];
            let text = format!(" {} {}: {} ", id + 1, c.skin, c.score);
            let fg = skin_color(&c.skin, id);
            let bg = if c.was_hit { Color::DarkRed } else { Cell::BASE_BG };
            self.front.put_str(x, 0, &text, fg, bg);
            x += text.chars().count() as i32 + 1;
        }
    }

    fn compose_help(&mut self, w: &World) {
        let row = self.front.height as i32 - 1;
        let text = match w.round {
            RoundPhase::Running => {
                let left = (w.round_cfg.duration_secs - w.time).max(0.0);
                format!(" {left:>3.0}s   1-4 / A B X Y: jump (twice to spin)   Esc: quit ")
            }
            RoundPhase::Finished => " R / Start: new round   Esc / Select: quit ".to_string(),
        };
        self.front.put_str(0, row, &text, Color::Grey, Cell::BASE_BG);
    }
}

/// Known skins get their own color; anything else picks from a palette.
fn skin_color(skin: &str, id: usize) -> Color {
    const PALETTE: [Color; 4] = [Color::Blue, Color::Green, Color::Magenta, Color::Yellow];
    let s = skin.to_lowercase();
    if s.contains("blue") {
        Color::Blue
    } else if s.contains("green") {
        Color::Green
    } else if s.contains("pink") {
        Color::Magenta
    } else if s.contains("yellow") {
        Color::Yellow
    } else {
        PALETTE[id % PALETTE.len()]
    }
}

fn pose_glyph(pose: Pose) -> char {
    match pose {
        Pose::Walk1 => '╱',
        Pose::Walk2 => '╲',
        Pose::Jump => '║',
        Pose::Duck => '▄',
        Pose::Hurt => '×',
    }
}

/// A line glyph approximating the sprite's rotation.
fn spin_glyph(angle: f32) -> char {
    let eighth = (angle.rem_euclid(std::f32::consts::PI) / (std::f32::consts::PI / 4.0)).round() as i32 % 4;
    match eighth {
        0 => '│',
        1 => '╲',
        2 => '─',
        _ => '╱',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn composed(world: &World, w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.compose(world);
        r
    }

    #[test]
    fn viewport_maps_world_into_play_field() {
        let v = Viewport::fit(128, 27, 1280.0, 720.0);
        assert_eq!(v.rows, 24);
        assert_eq!(v.col(0.0), 0);
        assert_eq!(v.col(1279.0), 127);
        assert_eq!(v.row(0.0), HUD_ROWS as i32);
        assert_eq!(v.row(719.0), HUD_ROWS as i32 + 23);
        // A sliver still covers one cell.
        let (c0, r0, c1, r1) = v.span(&Rect::new(15.0, 40.0, 1.0, 1.0));
        assert_eq!((c0, c1, r0, r1), (1, 1, 3, 3));
    }

    #[test]
    fn badges_follow_slot_order() {
        let mut world = World::with_seed(&GameConfig::default(), 1);
        for (id, slot) in [(0, 1), (1, 0), (2, 2), (3, 3)] {
            world.characters[id].slot = slot;
        }
        let r = composed(&world, 160, 30);
        let top = r.front.row_text(0);
        let green = top.find("aliengreen").unwrap();
        let blue = top.find("alienblue").unwrap();
        assert!(green < blue);
    }

    #[test]
    fn characters_and_label_are_drawn() {
        let mut world = World::with_seed(&GameConfig::default(), 1);
        world.set_label("It's a tie!".to_string());
        let r = composed(&world, 128, 27);
        let all: String = (0..27).map(|y| r.front.row_text(y)).collect();
        for n in ['1', '2', '3', '4'] {
            assert!(all.contains(n));
        }
        assert!(all.contains("It's a tie!"));
    }

    #[test]
    fn spin_glyph_cycles() {
        use std::f32::consts::PI;
        assert_eq!(spin_glyph(0.0), '│');
        assert_eq!(spin_glyph(-PI / 2.0), '─');
        assert_eq!(spin_glyph(-PI), '│');
    }
}
