/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The meadow is painted into a `PixelCanvas` and shown with half-block
/// cells: every terminal cell carries two stacked pixels (fg = top,
/// bg = bottom), which keeps pixels roughly square.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::chat::{ChatFocus, ChatState, Message};
use crate::domain::entity::{Rgb, PALETTE};
use crate::domain::profile::NAME_LIMIT;
use crate::sim::app::{AppState, Phase};
use super::canvas::PixelCanvas;
use super::paint;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap on VTE terminals matches the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
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

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, x0: usize, x1: usize, y: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout helpers ──

const HUD_ROW: usize = 0;
const CANVAS_ROW: usize = 1;
/// HUD above the meadow, message and help rows below.
const RESERVED_ROWS: usize = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 60, b: 40 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const PANEL_BG: Color = Color::Rgb { r: 30, g: 32, b: 48 };
const CURSOR_BG: Color = Color::Rgb { r: 55, g: 60, b: 90 };
const MINE_BG: Color = Color::Rgb { r: 40, g: 90, b: 170 };
const THEIRS_BG: Color = Color::Rgb { r: 60, g: 60, b: 70 };
const ONLINE: Color = Color::Rgb { r: 80, g: 220, b: 120 };

/// Largest 4:3 pixel canvas that fits `cols × rows` terminal cells, where
/// each cell holds two pixels stacked vertically. Height is kept even.
pub fn fit_canvas(cols: usize, rows: usize) -> (usize, usize) {
    let max_h = rows * 2;
    let (w, h) = if cols * 3 <= max_h * 4 {
        (cols, cols * 3 / 4)
    } else {
        (max_h * 4 / 3, max_h)
    };
    (w, h & !1)
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;
    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let wlen = chars.len();
        if wlen == 0 {
            continue;
        }
        if line_len > 0 && line_len + 1 + wlen > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(chars);
        line_len += wlen;
    }
    if line_len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Keep the last `width` chars of a field that is being typed into.
fn tail(s: &str, width: usize) -> String {
    let n = s.chars().count();
    s.chars().skip(n.saturating_sub(width)).collect()
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    canvas: PixelCanvas,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            canvas: PixelCanvas::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the terminal
    /// reports key releases (keyboard enhancement is active).
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        log::debug!("keyboard enhancement: {}", self.enhanced_keys);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced_keys = false;
        }
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

    pub fn render(&mut self, app: &AppState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(app.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(app.phase);
        }

        self.compose(app);
        if let Err(e) = self.flush_diff() {
            // Unknown what reached the screen; repaint everything next time.
            self.back.cells.fill(Cell::INVALID);
            return Err(e);
        }

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, app: &AppState) {
        self.front.clear();
        match app.phase {
            Phase::Customize => self.compose_customize(app),
            Phase::Playing => self.compose_meadow(app),
            Phase::Messenger => self.compose_messenger(&app.chat),
        }
        self.compose_message(app);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
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

    // ── Compose: meadow ──

    fn compose_meadow(&mut self, app: &AppState) {
        let buf_w = self.front.width;
        let session = match &app.session {
            Some(s) => s,
            None => return,
        };
        let scene = session.scene();

        // ── HUD row ──
        let hud = format!(
            " {}  ({:.0}, {:.0})  ponies {}  moving {}  tick {} {}",
            scene.player.name, scene.player.x, scene.player.y,
            scene.npcs.len() + 1, scene.moving_count(), scene.tick,
            if app.pad_connected { " [pad] " } else { "" },
        );
        self.front.fill_row(0, buf_w, HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Meadow ──
        let rows = self.front.height.saturating_sub(RESERVED_ROWS);
        let (pw, ph) = fit_canvas(buf_w, rows);
        if pw < 8 || ph < 6 {
            self.front.put_str(1, CANVAS_ROW, "Terminal too small", ACCENT, Color::Reset);
        } else {
            if self.canvas.width != pw || self.canvas.height != ph {
                self.canvas = PixelCanvas::new(pw, ph);
            }
            paint::paint_scene(&mut self.canvas, scene);
            self.blit_canvas((buf_w - pw) / 2, CANVAS_ROW + (rows - ph / 2) / 2);
        }

        // ── Help bar ──
        let help_row = self.front.height.saturating_sub(1);
        let help = " WASD/←↑→↓: Move  Esc/F1: Settings  Ctrl+C: Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    /// Copy the pixel canvas to cells at (col0, row0), then print labels.
    fn blit_canvas(&mut self, col0: usize, row0: usize) {
        let canvas = &self.canvas;
        for cy in 0..canvas.height / 2 {
            for cx in 0..canvas.width {
                let top = canvas.get(cx, cy * 2).unwrap_or(paint::GRASS);
                let bottom = canvas.get(cx, cy * 2 + 1).unwrap_or(paint::GRASS);
                self.front.set(col0 + cx, row0 + cy, Cell::new('▀', rgb(top), rgb(bottom)));
            }
        }
        for label in &canvas.labels {
            let len = label.text.chars().count();
            let x = (col0 + label.px).saturating_sub(len / 2);
            let y = row0 + label.py / 2;
            if y < row0 || y >= row0 + canvas.height / 2 {
                continue;
            }
            for (i, ch) in label.text.chars().enumerate() {
                let under = self.front.get(x + i, y);
                self.front.set(x + i, y, Cell::new(ch, rgb(label.color), under.bg));
            }
        }
    }

    // ── Compose: customization screen ──

    fn compose_customize(&mut self, app: &AppState) {
        let p = &app.profile;
        self.front.put_str(4, 2, "P O N Y   M E A D O W", ACCENT, Color::Reset);
        self.front.put_str(4, 3, "─────────────────────", Color::DarkGrey, Color::Reset);

        self.front.put_str(4, 5, "Name", Color::White, Color::Reset);
        let field = format!(" {:<width$}", format!("{}_", p.name), width = NAME_LIMIT + 1);
        self.front.put_str(10, 5, &field, Color::White, PANEL_BG);
        let count = format!("({}/{})", p.name.chars().count(), NAME_LIMIT);
        self.front.put_str(12 + NAME_LIMIT + 2, 5, &count, Color::DarkGrey, Color::Reset);

        self.front.put_str(4, 7, "Color", Color::White, Color::Reset);
        for (i, c) in PALETTE.iter().enumerate() {
            let x = 10 + i * 3;
            self.front.put_str(x, 7, "██", rgb(*c), Color::Reset);
            if i == p.color_index {
                self.front.put_str(x, 8, "▲▲", Color::White, Color::Reset);
            }
        }

        self.front.put_str(4, 10, "Preview", Color::White, Color::Reset);
        self.front.put_str(12, 10, " ▄█▀ ", rgb(p.color()), Color::Reset);
        self.front.put_str(18, 10, p.display_name(), Color::White, Color::Reset);

        let help = [
            "Type       Edit name",
            "←/→        Change color",
            "Enter      Start",
            "Tab        Chats",
            "Esc        Quit",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_str(4, 13 + i, line, Color::DarkGrey, Color::Reset);
        }
    }

    // ── Compose: messenger ──

    fn compose_messenger(&mut self, chat: &ChatState) {
        let w = self.front.width;
        let h = self.front.height;
        if w < 30 || h < 8 {
            self.front.put_str(0, 0, "Terminal too small", ACCENT, Color::Reset);
            return;
        }
        let left_w = (w / 3).clamp(20, 36);

        // ── Contact list ──
        for y in 0..h.saturating_sub(1) {
            self.front.fill_row(0, left_w, y, PANEL_BG);
            self.front.set(left_w, y, Cell::new('│', Color::DarkGrey, Color::Reset));
        }
        self.front.put_str(1, 0, "Chats", ACCENT, PANEL_BG);
        let search_bg = if chat.focus == ChatFocus::Search { CURSOR_BG } else { PANEL_BG };
        self.front.fill_row(1, left_w - 1, 1, search_bg);
        let query = if chat.query.is_empty() && chat.focus != ChatFocus::Search {
            "Search".to_string()
        } else {
            format!("{}_", tail(&chat.query, left_w.saturating_sub(6)))
        };
        self.front.put_str(2, 1, &format!("⌕ {query}"), Color::Grey, search_bg);

        let list_rows = h.saturating_sub(4);
        for (i, c) in chat.visible_contacts().iter().enumerate().take(list_rows / 2) {
            let y = 3 + i * 2;
            let under_cursor = chat.focus == ChatFocus::Contacts && i == chat.cursor;
            let bg = if chat.selected == Some(c.id) || under_cursor { CURSOR_BG } else { PANEL_BG };
            self.front.fill_row(0, left_w, y, bg);
            self.front.fill_row(0, left_w, y + 1, bg);
            // initial as avatar, green while online
            let avatar = if c.online { ONLINE } else { Color::DarkGrey };
            self.front.set(1, y, Cell::new(c.initial(), Color::Black, avatar));
            let name = tail(&c.name, left_w.saturating_sub(4));
            self.front.put_str(3, y, &name, Color::White, bg);
            self.front.put_str(3, y + 1, &c.status_line(), Color::DarkGrey, bg);
        }

        // ── Conversation ──
        let x0 = left_w + 1;
        let pane_w = w - x0;
        match chat.selected_contact() {
            None => {
                let text = "Pick a chat to start messaging";
                let x = x0 + pane_w.saturating_sub(text.chars().count()) / 2;
                self.front.put_str(x, h / 2, text, Color::DarkGrey, Color::Reset);
            }
            Some(contact) => {
                self.front.put_str(x0 + 1, 0, &contact.name, Color::White, Color::Reset);
                let status_x = x0 + 3 + contact.name.chars().count();
                let status_fg = if contact.online { ONLINE } else { Color::DarkGrey };
                self.front.put_str(status_x, 0, &contact.status_line(), status_fg, Color::Reset);
                let rule: String = "─".repeat(pane_w);
                self.front.put_str(x0, 1, &rule, Color::DarkGrey, Color::Reset);

                let input_row = h - 2;
                self.compose_bubbles(&chat.messages, x0, pane_w, 2, input_row.saturating_sub(1));

                let input_bg = if chat.focus == ChatFocus::Draft { CURSOR_BG } else { PANEL_BG };
                self.front.fill_row(x0, w, input_row, input_bg);
                let draft = if chat.draft.is_empty() && chat.focus != ChatFocus::Draft {
                    "Message...".to_string()
                } else {
                    format!("{}_", tail(&chat.draft, pane_w.saturating_sub(4)))
                };
                self.front.put_str(x0 + 1, input_row, &format!("> {draft}"), Color::White, input_bg);
            }
        }

        let help = " Tab: Focus  ↑↓: Browse  Enter: Open/Send  Esc: Back";
        self.front.put_str(0, h - 1, help, Color::DarkGrey, Color::Reset);
    }

    /// Messages bottom-aligned in rows [top, bottom); older ones scroll off.
    fn compose_bubbles(&mut self, messages: &[Message], x0: usize, pane_w: usize, top: usize, bottom: usize) {
        let bubble_w = (pane_w * 7 / 10).max(10);
        // (text, mine, is_timestamp)
        let mut lines: Vec<(String, bool, bool)> = Vec::new();
        for m in messages {
            for l in wrap(&m.text, bubble_w.saturating_sub(2)) {
                lines.push((l, m.is_mine, false));
            }
            lines.push((m.timestamp.clone(), m.is_mine, true));
        }

        let rows = bottom.saturating_sub(top);
        let skip = lines.len().saturating_sub(rows);
        let start_row = bottom - (lines.len() - skip);
        for (i, (text, mine, stamp)) in lines.iter().skip(skip).enumerate() {
            let y = start_row + i;
            let len = text.chars().count() + 2;
            let x = if *mine { x0 + pane_w.saturating_sub(len + 1) } else { x0 + 1 };
            if *stamp {
                self.front.put_str(x + 1, y, text, Color::DarkGrey, Color::Reset);
            } else {
                let bg = if *mine { MINE_BG } else { THEIRS_BG };
                self.front.put_str(x, y, &format!(" {text} "), Color::White, bg);
            }
        }
    }

    // ── Status message (all screens) ──

    fn compose_message(&mut self, app: &AppState) {
        if app.message.is_empty() {
            return;
        }
        let row = self.front.height.saturating_sub(2);
        self.front.fill_row(0, self.front.width, row, MSG_BG);
        self.front.put_str(0, row, &format!(" ◈ {} ", app.message), Color::Black, MSG_BG);
    }
}
